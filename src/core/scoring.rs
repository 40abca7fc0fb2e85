use crate::models::{
    AgePreference, Candidate, Compatibility, CriterionScores, LifestyleFlags, PreferenceProfile,
    ScoreBreakdown, ScoringWeights, Seeker, MAX_SCORE,
};
use std::collections::BTreeSet;

/// Pure compatibility scorer for one seeker against one candidate
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringEngine {
    weights: ScoringWeights,
}

impl ScoringEngine {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(&self, seeker: &Seeker, candidate: &Candidate) -> Compatibility {
        calculate_compatibility(seeker, candidate, &self.weights)
    }
}

/// Calculate a compatibility score (0-100) for a candidate as seen by a seeker
///
/// Candidates from the seeker's own department are excluded outright with a
/// zero score. Otherwise the score is the sum of:
///   age          (up to 35)  relation to the seeker's age preference
///   height       (20)        inside the preferred range, inclusive
///   mbti         (20 / 10)   liked, or at least not disliked
///   personality  (up to 15)  share of preferred traits present
///   dating style (up to 10)  share of preferred styles present
///   lifestyle    (5 each)    smoking / drinking / tattoo agreement
/// capped at `max_total`, and never above `MAX_SCORE` whatever the weights.
pub fn calculate_compatibility(
    seeker: &Seeker,
    candidate: &Candidate,
    weights: &ScoringWeights,
) -> Compatibility {
    if seeker.candidate.department_label == candidate.department_label {
        return Compatibility {
            total: 0,
            breakdown: ScoreBreakdown::SameDepartment,
        };
    }

    let prefs = &seeker.preferences;

    let scores = CriterionScores {
        age: calculate_age_score(seeker.candidate.age, candidate.age, prefs.age_type, weights),
        height: calculate_height_score(candidate.height_cm, prefs, weights),
        mbti: calculate_mbti_score(&candidate.mbti_code, prefs, weights),
        personality: calculate_overlap_score(
            &candidate.personality_traits,
            &prefs.personality_traits,
            weights.personality,
        ),
        dating_style: calculate_overlap_score(
            &candidate.dating_style_traits,
            &prefs.dating_style_traits,
            weights.dating_style,
        ),
        lifestyle: calculate_lifestyle_score(&candidate.lifestyle, &prefs.lifestyle, weights),
    };

    Compatibility {
        total: scores.raw_total().min(weights.max_total.min(MAX_SCORE)),
        breakdown: ScoreBreakdown::Criteria(scores),
    }
}

/// Age score for the seeker's preferred age relation
#[inline]
fn calculate_age_score(seeker_age: u32, candidate_age: u32, preference: AgePreference, w: &ScoringWeights) -> u32 {
    let diff = seeker_age.abs_diff(candidate_age);

    match preference {
        AgePreference::Same if diff == 0 => w.age_exact,
        AgePreference::Same => decay(w.age_same_base, w.age_same_step, diff),
        AgePreference::Older if candidate_age > seeker_age => {
            decay(w.age_directional_base, w.age_directional_step, diff)
        }
        AgePreference::Younger if candidate_age < seeker_age => {
            decay(w.age_directional_base, w.age_directional_step, diff)
        }
        AgePreference::Older | AgePreference::Younger => 0,
        AgePreference::Any => decay(w.age_any_base, w.age_any_step, diff),
    }
}

/// `max(0, base - step * diff)`
#[inline]
fn decay(base: u32, step: u32, diff: u32) -> u32 {
    base.saturating_sub(step.saturating_mul(diff))
}

#[inline]
fn calculate_height_score(height_cm: f64, prefs: &PreferenceProfile, w: &ScoringWeights) -> u32 {
    if height_cm >= prefs.height_min_cm && height_cm <= prefs.height_max_cm {
        w.height
    } else {
        0
    }
}

#[inline]
fn calculate_mbti_score(mbti: &str, prefs: &PreferenceProfile, w: &ScoringWeights) -> u32 {
    if prefs.liked_mbti.contains(mbti) {
        w.mbti_liked
    } else if !prefs.disliked_mbti.contains(mbti) {
        w.mbti_neutral
    } else {
        0
    }
}

/// Share of the preferred set the candidate has, scaled to `max_points`
/// and rounded half-up
#[inline]
fn calculate_overlap_score(offered: &BTreeSet<String>, preferred: &BTreeSet<String>, max_points: u32) -> u32 {
    let wanted = preferred.len() as u64;
    if wanted == 0 {
        return 0;
    }

    let shared = offered.intersection(preferred).count() as u64;

    // floor(shared * max / wanted + 1/2) in integers
    let points = (2 * shared * max_points as u64 + wanted) / (2 * wanted);
    u32::try_from(points).unwrap_or(max_points)
}

#[inline]
fn calculate_lifestyle_score(offered: &LifestyleFlags, preferred: &LifestyleFlags, w: &ScoringWeights) -> u32 {
    ([
        offered.smoking == preferred.smoking,
        offered.drinking == preferred.drinking,
        offered.tattoo == preferred.tattoo,
    ]
    .iter()
    .filter(|agrees| **agrees)
    .count() as u32)
        .saturating_mul(w.lifestyle_per_flag)
}
