//! Dataset sample and run statistics.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::UnknownVariant;

/// Intended caliber of a synthetic candidate answer.
///
/// Assigned before generation; it selects the answer and gold-answer
/// templates, so a sample's label always matches how it was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Excellent,
    Adequate,
    Insufficient,
}

impl Quality {
    pub const ALL: [Quality; 3] = [Self::Excellent, Self::Adequate, Self::Insufficient];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => "excellent",
            Self::Adequate => "adequate",
            Self::Insufficient => "insufficient",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quality {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(Self::Excellent),
            "adequate" => Ok(Self::Adequate),
            "insufficient" => Ok(Self::Insufficient),
            _ => Err(UnknownVariant {
                kind: "quality tier",
                value: s.to_string(),
            }),
        }
    }
}

/// One labelled row of the synthetic dataset.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QASample {
    pub question: String,
    pub answer: String,
    pub quality: Quality,
    pub gold_answer: String,
}

/// A unit of work for the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleJob {
    pub topic: String,
    pub quality: Quality,
}

/// Statistics for a dataset generation run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetStats {
    /// Jobs submitted
    pub total_requested: usize,

    /// Samples completed
    pub total_completed: usize,

    /// Samples abandoned (duplicates or failed stages)
    pub total_failed: usize,

    /// Completed samples per quality tier
    pub per_quality: BTreeMap<Quality, usize>,

    /// Abandoned jobs in the order they finished; panicked tasks are
    /// counted in `total_failed` only
    pub failed_jobs: Vec<SampleJob>,

    /// Checkpoint rewrites performed
    pub checkpoints_written: usize,

    /// Prompt tokens consumed
    pub prompt_tokens: u64,

    /// Completion tokens consumed
    pub completion_tokens: u64,

    /// Total runtime in seconds
    pub runtime_secs: f64,

    /// Samples per hour throughput
    pub throughput_per_hour: f64,

    /// Completion rate (0.0 - 1.0)
    pub completion_rate: f64,
}

impl DatasetStats {
    pub fn record_completed(&mut self, quality: Quality) {
        self.total_completed += 1;
        *self.per_quality.entry(quality).or_default() += 1;
    }

    pub fn record_failed(&mut self, job: SampleJob) {
        self.total_failed += 1;
        self.failed_jobs.push(job);
    }

    /// Abandoned jobs counted per (tier, topic).
    pub fn failures_by_tier_and_topic(&self) -> BTreeMap<(Quality, &str), usize> {
        let mut counts = BTreeMap::new();
        for job in &self.failed_jobs {
            *counts.entry((job.quality, job.topic.as_str())).or_default() += 1;
        }
        counts
    }

    /// Calculate derived stats.
    pub fn finalize(&mut self) {
        if self.total_requested > 0 {
            self.completion_rate = self.total_completed as f64 / self.total_requested as f64;
        }
        if self.runtime_secs > 0.0 {
            self.throughput_per_hour = self.total_completed as f64 / self.runtime_secs * 3600.0;
        }
    }
}
