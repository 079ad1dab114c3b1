//! Feedback and analysis records handed back to callers.
//!
//! Both record types are always fully populated. When the model call or the
//! decode fails, the whole record is built from a placeholder constructor
//! whose sentinel says which stage failed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a model-provided value is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Unavailable {
    /// The completion call produced no text
    CallFailed,
    /// Text came back but was not a JSON object
    ParsingError,
    /// Valid JSON that lacked this field (or held an unusable value)
    GenAiError,
}

impl Unavailable {
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::CallFailed => "N/A (GenAI call failed)",
            Self::ParsingError => "N/A (GenAI parsing error)",
            Self::GenAiError => "N/A (GenAI error)",
        }
    }

    fn from_sentinel(s: &str) -> Option<Self> {
        [Self::CallFailed, Self::ParsingError, Self::GenAiError]
            .into_iter()
            .find(|u| u.sentinel() == s)
    }
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sentinel())
    }
}

/// Answer score: 1–10, or an explicit sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ScoreRepr", into = "ScoreRepr")]
pub enum Score {
    Value(u8),
    Unavailable(Unavailable),
}

pub const MIN_SCORE: u8 = 1;
pub const MAX_SCORE: u8 = 10;

impl Score {
    /// Build a score, rejecting values outside 1–10.
    pub fn new(value: i64) -> Option<Self> {
        (i64::from(MIN_SCORE)..=i64::from(MAX_SCORE))
            .contains(&value)
            .then(|| Self::Value(value as u8))
    }

    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Value(v) => Some(*v),
            Self::Unavailable(_) => None,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v}/10"),
            Self::Unavailable(u) => u.fmt(f),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum ScoreRepr {
    Number(i64),
    Text(String),
}

impl From<Score> for ScoreRepr {
    fn from(score: Score) -> Self {
        match score {
            Score::Value(v) => Self::Number(i64::from(v)),
            Score::Unavailable(u) => Self::Text(u.sentinel().to_string()),
        }
    }
}

impl TryFrom<ScoreRepr> for Score {
    type Error = String;

    fn try_from(repr: ScoreRepr) -> Result<Self, Self::Error> {
        match repr {
            ScoreRepr::Number(n) => Score::new(n).ok_or_else(|| format!("score {n} out of range")),
            ScoreRepr::Text(s) => Unavailable::from_sentinel(&s)
                .map(Score::Unavailable)
                .ok_or_else(|| format!("unrecognized score '{s}'")),
        }
    }
}

/// Evaluation of a single answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub score: Score,
    pub strengths: String,
    pub areas_for_improvement: String,
    pub sample_answer: String,
}

impl FeedbackRecord {
    /// Placeholder used when the completion call produced no text.
    pub fn call_failed() -> Self {
        Self::placeholder(Unavailable::CallFailed, "Failed to get feedback from GenAI.")
    }

    /// Placeholder used when the model text was not a JSON object.
    pub fn parsing_error() -> Self {
        Self::placeholder(Unavailable::ParsingError, "Could not parse GenAI feedback.")
    }

    fn placeholder(reason: Unavailable, text: &str) -> Self {
        Self {
            score: Score::Unavailable(reason),
            strengths: text.to_string(),
            areas_for_improvement: text.to_string(),
            sample_answer: text.to_string(),
        }
    }

    /// Whether this record came from a failed call or decode.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.score,
            Score::Unavailable(Unavailable::CallFailed | Unavailable::ParsingError)
        )
    }
}

/// Where an [`OverallAnalysis`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    Generated,
    CallFailed,
    ParsingError,
}

/// Session-level summary of a candidate's performance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallAnalysis {
    pub overall_analysis: String,
    pub key_strengths: Vec<String>,
    pub improvement_areas: Vec<String>,
    pub preparation_tips: Vec<String>,
    /// Mean of numeric scores, computed locally
    pub average_score: f64,
    pub status: AnalysisStatus,
}

pub const ANALYSIS_CALL_FAILED: &str = "Failed to generate overall analysis.";
pub const ANALYSIS_PARSE_ERROR: &str = "Error parsing analysis output.";

impl OverallAnalysis {
    pub fn call_failed(average_score: f64) -> Self {
        let marker = vec![Unavailable::CallFailed.sentinel().to_string()];
        Self {
            overall_analysis: ANALYSIS_CALL_FAILED.to_string(),
            key_strengths: marker.clone(),
            improvement_areas: marker.clone(),
            preparation_tips: marker,
            average_score,
            status: AnalysisStatus::CallFailed,
        }
    }

    /// Keeps the raw model text so the reader still sees what came back.
    pub fn parsing_error(raw: &str, average_score: f64) -> Self {
        let marker = vec![ANALYSIS_PARSE_ERROR.to_string()];
        Self {
            overall_analysis: raw.to_string(),
            key_strengths: marker.clone(),
            improvement_areas: marker.clone(),
            preparation_tips: marker,
            average_score,
            status: AnalysisStatus::ParsingError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_serializes_as_number_or_sentinel() {
        assert_eq!(serde_json::to_string(&Score::Value(8)).unwrap(), "8");
        assert_eq!(
            serde_json::to_string(&Score::Unavailable(Unavailable::CallFailed)).unwrap(),
            "\"N/A (GenAI call failed)\""
        );
        let back: Score = serde_json::from_str("\"N/A (GenAI parsing error)\"").unwrap();
        assert_eq!(back, Score::Unavailable(Unavailable::ParsingError));
        assert!(serde_json::from_str::<Score>("11").is_err());
    }

    #[test]
    fn score_range_is_enforced() {
        assert_eq!(Score::new(1), Some(Score::Value(1)));
        assert_eq!(Score::new(10), Some(Score::Value(10)));
        assert_eq!(Score::new(0), None);
        assert_eq!(Score::new(11), None);
    }

    #[test]
    fn placeholders_are_fully_populated_and_distinguishable() {
        let failed = FeedbackRecord::call_failed();
        let unparsed = FeedbackRecord::parsing_error();

        assert_eq!(failed.score.to_string(), "N/A (GenAI call failed)");
        assert_eq!(unparsed.score.to_string(), "N/A (GenAI parsing error)");
        assert!(failed.strengths.contains("Failed to get feedback"));
        assert!(unparsed.sample_answer.contains("Could not parse"));
        assert!(failed.is_placeholder() && unparsed.is_placeholder());
        assert_ne!(failed, unparsed);
    }

    #[test]
    fn analysis_parse_error_keeps_raw_text() {
        let a = OverallAnalysis::parsing_error("Not a JSON", 0.0);
        assert_eq!(a.overall_analysis, "Not a JSON");
        assert!(a.key_strengths.contains(&ANALYSIS_PARSE_ERROR.to_string()));
        assert_eq!(a.status, AnalysisStatus::ParsingError);
    }
}
