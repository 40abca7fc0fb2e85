use crate::models::{
    AgePreference, Candidate, CandidateRecord, LifestyleFlags, PreferenceProfile, PreferenceRecord, Seeker, SeekerRecord,
};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

/// Why a record was kept out of a matching run
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExclusionReason {
    #[error("missing or empty field `{0}`")]
    MissingField(&'static str),

    #[error("invalid value for `{0}`")]
    InvalidField(&'static str),

    #[error("belongs to cohort {found:?}, expected {expected:?}")]
    WrongCohort { expected: String, found: String },

    #[error("no preference profile")]
    MissingPreferences,

    #[error("duplicate candidate id")]
    DuplicateId,
}

/// Records that survived validation, in input order
#[derive(Debug, Clone)]
pub struct Validated<T> {
    pub valid: Vec<T>,
    pub excluded: usize,
}

/// Validate a pool-side profile
///
/// Every attribute is required; the cohort tag must match the cohort the
/// record was loaded for.
pub fn validate_candidate(record: &CandidateRecord, cohort: &str) -> Result<Candidate, ExclusionReason> {
    let id = record.candidate_id.trim();
    if id.is_empty() {
        return Err(ExclusionReason::MissingField("candidateId"));
    }

    let found_cohort = required_text(&record.cohort, "cohort")?;
    if found_cohort != cohort {
        return Err(ExclusionReason::WrongCohort {
            expected: cohort.to_string(),
            found: found_cohort,
        });
    }

    let age = match record.age {
        None => return Err(ExclusionReason::MissingField("age")),
        Some(age) if age <= 0 => return Err(ExclusionReason::InvalidField("age")),
        Some(age) => age as u32,
    };

    let height_cm = match record.height_cm {
        None => return Err(ExclusionReason::MissingField("heightCm")),
        Some(h) if !h.is_finite() || h <= 0.0 => return Err(ExclusionReason::InvalidField("heightCm")),
        Some(h) => h,
    };

    Ok(Candidate {
        id: id.to_string(),
        display_name: required_text(&record.display_name, "displayName")?,
        cohort: found_cohort,
        age,
        department_label: required_text(&record.department_label, "departmentLabel")?,
        mbti_code: required_text(&record.mbti_code, "mbtiCode")?,
        height_cm,
        personality_traits: required_set(&record.personality_traits, "personalityTraits")?,
        dating_style_traits: required_set(&record.dating_style_traits, "datingStyleTraits")?,
        lifestyle: LifestyleFlags {
            smoking: required_flag(record.smoking, "smoking")?,
            drinking: required_flag(record.drinking, "drinking")?,
            tattoo: required_flag(record.tattoo, "tattoo")?,
        },
    })
}

/// Validate a seeker's preference profile
///
/// The disliked MBTI list is the only optional attribute: an absent list
/// means nothing is disliked.
pub fn validate_preferences(record: &PreferenceRecord) -> Result<PreferenceProfile, ExclusionReason> {
    let age_type = record
        .preferred_age_type
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or(ExclusionReason::MissingField("preferredAgeType"))?
        .parse::<AgePreference>()
        .map_err(|_| ExclusionReason::InvalidField("preferredAgeType"))?;

    let height_min_cm = record
        .preferred_height_min
        .ok_or(ExclusionReason::MissingField("preferredHeightMin"))?;
    let height_max_cm = record
        .preferred_height_max
        .ok_or(ExclusionReason::MissingField("preferredHeightMax"))?;
    if !height_min_cm.is_finite() || !height_max_cm.is_finite() || height_min_cm > height_max_cm {
        return Err(ExclusionReason::InvalidField("preferredHeightRange"));
    }

    let disliked_mbti = record
        .disliked_mbti_list
        .as_deref()
        .map(normalize_set)
        .unwrap_or_default();

    Ok(PreferenceProfile {
        age_type,
        height_min_cm,
        height_max_cm,
        liked_mbti: required_set(&record.preferred_mbti_list, "preferredMbtiList")?,
        disliked_mbti,
        personality_traits: required_set(&record.preferred_personality_traits, "preferredPersonalityTraits")?,
        dating_style_traits: required_set(&record.preferred_dating_style_traits, "preferredDatingStyleTraits")?,
        lifestyle: LifestyleFlags {
            smoking: required_flag(record.preferred_smoking, "preferredSmoking")?,
            drinking: required_flag(record.preferred_drinking, "preferredDrinking")?,
            tattoo: required_flag(record.preferred_tattoo, "preferredTattoo")?,
        },
    })
}

/// Validate a seeker-cohort record: the profile and its preferences
pub fn validate_seeker(record: &SeekerRecord, cohort: &str) -> Result<Seeker, ExclusionReason> {
    let candidate = validate_candidate(&record.profile, cohort)?;
    let preferences = record
        .preferences
        .as_ref()
        .ok_or(ExclusionReason::MissingPreferences)
        .and_then(validate_preferences)?;

    Ok(Seeker { candidate, preferences })
}

/// Validate the pool cohort, keeping input order and the first occurrence of each id
pub fn validate_candidates(records: &[CandidateRecord], cohort: &str) -> Validated<Candidate> {
    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(records.len());
    let mut excluded = 0;

    for record in records {
        let outcome = validate_candidate(record, cohort).and_then(|candidate| {
            if seen.insert(candidate.id.clone()) {
                Ok(candidate)
            } else {
                Err(ExclusionReason::DuplicateId)
            }
        });

        match outcome {
            Ok(candidate) => valid.push(candidate),
            Err(reason) => {
                tracing::debug!("Excluding candidate {:?}: {}", record.candidate_id, reason);
                excluded += 1;
            }
        }
    }

    Validated { valid, excluded }
}

/// Validate the seeker cohort, keeping input order and the first occurrence of each id
pub fn validate_seekers(records: &[SeekerRecord], cohort: &str) -> Validated<Seeker> {
    let mut seen = HashSet::new();
    let mut valid = Vec::with_capacity(records.len());
    let mut excluded = 0;

    for record in records {
        let outcome = validate_seeker(record, cohort).and_then(|seeker| {
            if seen.insert(seeker.candidate.id.clone()) {
                Ok(seeker)
            } else {
                Err(ExclusionReason::DuplicateId)
            }
        });

        match outcome {
            Ok(seeker) => valid.push(seeker),
            Err(reason) => {
                tracing::debug!("Excluding seeker {:?}: {}", record.profile.candidate_id, reason);
                excluded += 1;
            }
        }
    }

    Validated { valid, excluded }
}

#[inline]
fn required_text(value: &Option<String>, field: &'static str) -> Result<String, ExclusionReason> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(ExclusionReason::MissingField(field))
}

#[inline]
fn required_flag(value: Option<bool>, field: &'static str) -> Result<bool, ExclusionReason> {
    value.ok_or(ExclusionReason::MissingField(field))
}

fn required_set(value: &Option<Vec<String>>, field: &'static str) -> Result<BTreeSet<String>, ExclusionReason> {
    let set = value.as_deref().map(normalize_set).unwrap_or_default();
    if set.is_empty() {
        Err(ExclusionReason::MissingField(field))
    } else {
        Ok(set)
    }
}

fn normalize_set(items: &[String]) -> BTreeSet<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
