//! Outcome types for a single logical completion.

use crate::models::{AssistError, Result};
use std::fmt;

/// Why a completion attempt (or the whole call) produced no text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Request exceeded the per-request timeout
    Timeout,
    /// Endpoint answered with a non-success status
    HttpError(u16),
    /// Connection-level failure (DNS, reset, TLS, ...)
    Transport(String),
    /// 2xx response without usable `choices[0].message.content`
    EmptyChoices,
    /// Retry budget spent on transient failures
    Exhausted {
        attempts: u32,
        last: Box<FailureReason>,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::HttpError(code) => write!(f, "HTTP {code}"),
            Self::Transport(msg) => write!(f, "transport error: {msg}"),
            Self::EmptyChoices => write!(f, "response had no choices"),
            Self::Exhausted { attempts, last } => {
                write!(f, "gave up after {attempts} attempts (last: {last})")
            }
        }
    }
}

/// Result of one logical completion: text, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionResult {
    Ok(String),
    Failed(FailureReason),
}

impl CompletionResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Ok(text) => Some(text),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&FailureReason> {
        match self {
            Self::Ok(_) => None,
            Self::Failed(reason) => Some(reason),
        }
    }

    /// Malformed bodies until exhaustion: "no text" rather than an error.
    pub fn is_soft_failure(&self) -> bool {
        matches!(self, Self::Failed(FailureReason::EmptyChoices))
    }

    /// Convert to a crate result, naming the pipeline stage on failure.
    pub fn into_result(self, stage: &'static str) -> Result<String> {
        match self {
            Self::Ok(text) => Ok(text),
            Self::Failed(reason) => Err(AssistError::Completion { stage, reason }),
        }
    }
}
