//! Error types for interview-assist.
//!
//! Taxonomy:
//! - Expected failures: bad input, unreadable files, malformed CSV
//! - Infrastructure failures: network, exhausted retries
//! - Internal invariant violations (bugs)
//!
//! Malformed model output is deliberately absent: the parser degrades it to
//! placeholder records instead of failing.

use crate::client::FailureReason;
use thiserror::Error;

/// Top-level error type for interview-assist.
#[derive(Debug, Error)]
pub enum AssistError {
    // ═══════════════════════════════════════════════════════════════════
    // Expected failures
    // ═══════════════════════════════════════════════════════════════════
    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("CSV error: {context}")]
    Csv {
        context: String,
        #[source]
        source: csv::Error,
    },

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Infrastructure failures
    // ═══════════════════════════════════════════════════════════════════
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Completion failed during {stage}: {reason}")]
    Completion {
        stage: &'static str,
        reason: FailureReason,
    },

    #[error("No unique question after {attempts} attempts")]
    DuplicateQuestion { attempts: u32 },

    // ═══════════════════════════════════════════════════════════════════
    // Invariant violations
    // ═══════════════════════════════════════════════════════════════════
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AssistError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a CSV error with context.
    pub fn csv(context: impl Into<String>, source: csv::Error) -> Self {
        Self::Csv {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias for interview-assist.
pub type Result<T> = std::result::Result<T, AssistError>;
