//! Interview inputs supplied by the candidate.

use super::FeedbackRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Requested difficulty of generated questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Self::Easy),
            "medium" => Ok(Self::Medium),
            "hard" => Ok(Self::Hard),
            _ => Err(UnknownVariant {
                kind: "difficulty",
                value: s.to_string(),
            }),
        }
    }
}

/// Returned when a string names no known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// What the candidate is preparing for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobProfile {
    pub job_role: String,
    #[serde(default)]
    pub job_description: String,
    #[serde(default)]
    pub difficulty: Difficulty,
}

impl JobProfile {
    pub fn new(
        job_role: impl Into<String>,
        job_description: impl Into<String>,
        difficulty: Difficulty,
    ) -> Self {
        Self {
            job_role: job_role.into(),
            job_description: job_description.into(),
            difficulty,
        }
    }

    /// Description text for prompts, never empty.
    pub fn description_or_default(&self) -> &str {
        let d = self.job_description.trim();
        if d.is_empty() { "Not provided" } else { d }
    }

    /// Role text for prompts, never empty.
    pub fn role_or_default(&self) -> &str {
        let r = self.job_role.trim();
        if r.is_empty() { "Not specified" } else { r }
    }
}

/// One answered question and its evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub question: String,
    pub response: String,
    pub feedback: FeedbackRecord,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert_eq!(" easy ".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert!("brutal".parse::<Difficulty>().is_err());
    }

    #[test]
    fn blank_profile_fields_get_prompt_defaults() {
        let profile = JobProfile::new("  ", "", Difficulty::Medium);
        assert_eq!(profile.role_or_default(), "Not specified");
        assert_eq!(profile.description_or_default(), "Not provided");
    }
}
