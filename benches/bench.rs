// Criterion benchmarks for Campus Match

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use campus_match::core::{validate_candidates, validate_seeker, PairingOrchestrator, ScoringEngine};
use campus_match::models::{CandidateRecord, MatchingCohorts, PreferenceRecord, SeekerRecord};
use campus_match::services::InMemoryStore;

const DEPARTMENTS: [&str; 5] = ["Physics", "Law", "Economics", "Art", "Medicine"];
const MBTI: [&str; 4] = ["ENFP", "INFJ", "ISTJ", "ESTP"];
const TRAITS: [&str; 5] = ["kind", "funny", "ambitious", "calm", "curious"];

fn create_candidate(id: usize, cohort: &str) -> CandidateRecord {
    CandidateRecord {
        candidate_id: format!("{}-{}", cohort, id),
        display_name: Some(format!("User {}", id)),
        cohort: Some(cohort.to_string()),
        age: Some(19 + (id % 8) as i32),
        department_label: Some(DEPARTMENTS[id % DEPARTMENTS.len()].to_string()),
        mbti_code: Some(MBTI[id % MBTI.len()].to_string()),
        height_cm: Some(158.0 + (id % 30) as f64),
        personality_traits: Some(vec![
            TRAITS[id % TRAITS.len()].to_string(),
            TRAITS[(id + 2) % TRAITS.len()].to_string(),
        ]),
        dating_style_traits: Some(vec![if id % 2 == 0 { "active" } else { "homebody" }.to_string()]),
        smoking: Some(id % 5 == 0),
        drinking: Some(id % 2 == 0),
        tattoo: Some(id % 7 == 0),
    }
}

fn create_seeker(id: usize) -> SeekerRecord {
    SeekerRecord {
        profile: create_candidate(id, "seeker"),
        preferences: Some(PreferenceRecord {
            preferred_age_type: Some(["SAME", "OLDER", "YOUNGER", "ANY"][id % 4].to_string()),
            preferred_height_min: Some(165.0),
            preferred_height_max: Some(182.0),
            preferred_mbti_list: Some(vec!["ENFP".to_string(), "INFJ".to_string()]),
            disliked_mbti_list: Some(vec!["ISTJ".to_string()]),
            preferred_personality_traits: Some(vec!["kind".to_string(), "funny".to_string(), "curious".to_string()]),
            preferred_dating_style_traits: Some(vec!["active".to_string()]),
            preferred_smoking: Some(false),
            preferred_drinking: Some(id % 3 == 0),
            preferred_tattoo: Some(false),
        }),
    }
}

fn bench_scoring(c: &mut Criterion) {
    let engine = ScoringEngine::default();
    let seeker = validate_seeker(&create_seeker(1), "seeker").unwrap();
    let candidates = validate_candidates(&(0..100).map(|i| create_candidate(i, "pool")).collect::<Vec<_>>(), "pool").valid;

    c.bench_function("score_100_candidates", |b| {
        b.iter(|| {
            let total: u32 = candidates
                .iter()
                .map(|candidate| engine.score(black_box(&seeker), black_box(candidate)).total)
                .sum();
            black_box(total)
        });
    });
}

fn bench_matching_run(c: &mut Criterion) {
    let orchestrator = PairingOrchestrator::with_default_weights();
    let cohorts = MatchingCohorts::new("seeker", "pool");
    let runtime = tokio::runtime::Runtime::new().unwrap();

    let mut group = c.benchmark_group("matching_run");

    for size in [10, 50, 100, 500].iter() {
        let seekers: Vec<SeekerRecord> = (0..*size).map(create_seeker).collect();
        let candidates: Vec<CandidateRecord> = (0..*size).map(|i| create_candidate(i, "pool")).collect();

        group.bench_with_input(BenchmarkId::new("run", size), size, |b, _| {
            b.iter(|| {
                let store = InMemoryStore::new();
                runtime.block_on(orchestrator.run(
                    black_box(&seekers),
                    black_box(&candidates),
                    &cohorts,
                    &store,
                ))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scoring, bench_matching_run);

criterion_main!(benches);
