use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Lifestyle flags carried by every profile and every preference profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifestyleFlags {
    pub smoking: bool,
    pub drinking: bool,
    pub tattoo: bool,
}

/// Age relation a seeker is looking for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AgePreference {
    Same,
    Older,
    Younger,
    Any,
}

impl FromStr for AgePreference {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SAME" => Ok(AgePreference::Same),
            "OLDER" => Ok(AgePreference::Older),
            "YOUNGER" => Ok(AgePreference::Younger),
            "ANY" => Ok(AgePreference::Any),
            other => Err(format!("unknown age preference '{}'", other)),
        }
    }
}

impl fmt::Display for AgePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AgePreference::Same => "SAME",
            AgePreference::Older => "OLDER",
            AgePreference::Younger => "YOUNGER",
            AgePreference::Any => "ANY",
        };
        f.write_str(label)
    }
}

/// Candidate profile as stored; any attribute may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "candidateId")]
    pub candidate_id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub cohort: Option<String>,
    #[serde(default)]
    pub age: Option<i32>,
    #[serde(rename = "departmentLabel", default)]
    pub department_label: Option<String>,
    #[serde(rename = "mbtiCode", default)]
    pub mbti_code: Option<String>,
    #[serde(rename = "heightCm", default)]
    pub height_cm: Option<f64>,
    #[serde(rename = "personalityTraits", default)]
    pub personality_traits: Option<Vec<String>>,
    #[serde(rename = "datingStyleTraits", default)]
    pub dating_style_traits: Option<Vec<String>>,
    #[serde(default)]
    pub smoking: Option<bool>,
    #[serde(default)]
    pub drinking: Option<bool>,
    #[serde(default)]
    pub tattoo: Option<bool>,
}

/// Preference profile as stored; only the seeker cohort has one
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(rename = "preferredAgeType", default)]
    pub preferred_age_type: Option<String>,
    #[serde(rename = "preferredHeightMin", default)]
    pub preferred_height_min: Option<f64>,
    #[serde(rename = "preferredHeightMax", default)]
    pub preferred_height_max: Option<f64>,
    #[serde(rename = "preferredMbtiList", default)]
    pub preferred_mbti_list: Option<Vec<String>>,
    #[serde(rename = "dislikedMbtiList", default)]
    pub disliked_mbti_list: Option<Vec<String>>,
    #[serde(rename = "preferredPersonalityTraits", default)]
    pub preferred_personality_traits: Option<Vec<String>>,
    #[serde(rename = "preferredDatingStyleTraits", default)]
    pub preferred_dating_style_traits: Option<Vec<String>>,
    #[serde(rename = "preferredSmoking", default)]
    pub preferred_smoking: Option<bool>,
    #[serde(rename = "preferredDrinking", default)]
    pub preferred_drinking: Option<bool>,
    #[serde(rename = "preferredTattoo", default)]
    pub preferred_tattoo: Option<bool>,
}

/// A seeker-cohort row: the profile plus its preference profile, if any
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SeekerRecord {
    #[serde(flatten)]
    pub profile: CandidateRecord,
    #[serde(default)]
    pub preferences: Option<PreferenceRecord>,
}

/// A profile that passed validation and may enter a matching run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: String,
    pub display_name: String,
    pub cohort: String,
    pub age: u32,
    pub department_label: String,
    pub mbti_code: String,
    pub height_cm: f64,
    pub personality_traits: BTreeSet<String>,
    pub dating_style_traits: BTreeSet<String>,
    pub lifestyle: LifestyleFlags,
}

/// Validated seeker preferences
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreferenceProfile {
    pub age_type: AgePreference,
    pub height_min_cm: f64,
    pub height_max_cm: f64,
    pub liked_mbti: BTreeSet<String>,
    pub disliked_mbti: BTreeSet<String>,
    pub personality_traits: BTreeSet<String>,
    pub dating_style_traits: BTreeSet<String>,
    pub lifestyle: LifestyleFlags,
}

/// A validated candidate together with the preferences that drive scoring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Seeker {
    pub candidate: Candidate,
    pub preferences: PreferenceProfile,
}

impl Seeker {
    pub fn id(&self) -> &str {
        &self.candidate.id
    }
}

/// The two cohorts taking part in a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingCohorts {
    #[serde(rename = "seekerCohort")]
    pub seeker: String,
    #[serde(rename = "poolCohort")]
    pub pool: String,
}

impl MatchingCohorts {
    pub fn new(seeker: impl Into<String>, pool: impl Into<String>) -> Self {
        Self {
            seeker: seeker.into(),
            pool: pool.into(),
        }
    }
}

/// Committed pairing, written once and never updated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: uuid::Uuid,
    #[serde(rename = "seekerCandidateId")]
    pub seeker_candidate_id: String,
    #[serde(rename = "otherCandidateId")]
    pub other_candidate_id: String,
    pub score: u32,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// Points awarded per criterion before the total is capped
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CriterionScores {
    pub age: u32,
    pub height: u32,
    pub mbti: u32,
    pub personality: u32,
    #[serde(rename = "datingStyle")]
    pub dating_style: u32,
    pub lifestyle: u32,
}

impl CriterionScores {
    pub fn raw_total(&self) -> u32 {
        [self.height, self.mbti, self.personality, self.dating_style, self.lifestyle]
            .iter()
            .fold(self.age, |total, points| total.saturating_add(*points))
    }
}

/// How a score was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ScoreBreakdown {
    /// Both profiles belong to the same department; nothing else is evaluated
    SameDepartment,
    Criteria(CriterionScores),
}

impl ScoreBreakdown {
    pub fn criteria(&self) -> Option<&CriterionScores> {
        match self {
            ScoreBreakdown::SameDepartment => None,
            ScoreBreakdown::Criteria(scores) => Some(scores),
        }
    }
}

/// Score of one candidate against one seeker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compatibility {
    pub total: u32,
    pub breakdown: ScoreBreakdown,
}

/// Upper bound of any compatibility score, matching the `match_results.score` check
pub const MAX_SCORE: u32 = 100;

/// Scoring rubric constants
///
/// Defaults reproduce the production rubric:
/// age 35, height 20, mbti 20 (10 when merely not disliked),
/// personality 15, dating style 10, lifestyle 5 per flag, capped at 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// SAME preference, identical age
    pub age_exact: u32,
    /// SAME preference, base before the per-year penalty
    pub age_same_base: u32,
    pub age_same_step: u32,
    /// OLDER / YOUNGER preference, base before the per-year penalty
    pub age_directional_base: u32,
    pub age_directional_step: u32,
    /// ANY preference, base before the per-year penalty
    pub age_any_base: u32,
    pub age_any_step: u32,
    pub height: u32,
    pub mbti_liked: u32,
    pub mbti_neutral: u32,
    pub personality: u32,
    pub dating_style: u32,
    pub lifestyle_per_flag: u32,
    pub max_total: u32,
}

impl ScoringWeights {
    /// Reject a rubric whose cap would let scores leave `0..=MAX_SCORE`
    pub fn check(&self) -> Result<(), String> {
        if self.max_total > MAX_SCORE {
            return Err(format!(
                "scoring.weights.max_total is {}, must not exceed {}",
                self.max_total, MAX_SCORE
            ));
        }
        Ok(())
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            age_exact: 35,
            age_same_base: 25,
            age_same_step: 5,
            age_directional_base: 35,
            age_directional_step: 3,
            age_any_base: 25,
            age_any_step: 2,
            height: 20,
            mbti_liked: 20,
            mbti_neutral: 10,
            personality: 15,
            dating_style: 10,
            lifestyle_per_flag: 5,
            max_total: 100,
        }
    }
}
