//! Finite-attempt retry machine with exponential backoff and jitter.
//!
//! States: `Attempting(n)` → `Success` | `Exhausted`. Each attempt's
//! outcome is fed to [`RetryPolicy::advance`], which decides the next state
//! and the sleep (if any) before it.

use super::FailureReason;
use crate::models::RetryConfig;
use rand::Rng;
use std::fmt;
use std::time::Duration;

/// Source of the additive backoff jitter, in seconds within [0, 1).
pub trait Jitter: Send + Sync + fmt::Debug {
    fn sample(&self) -> f64;
}

/// Uniform jitter from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomJitter;

impl Jitter for RandomJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen_range(0.0..1.0)
    }
}

/// Constant jitter for deterministic schedules.
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl Jitter for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Classified result of one HTTP attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    /// Any failed attempt: non-2xx status, timeout, transport error, malformed body
    Transient(FailureReason),
}

/// Retry machine state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryState {
    /// About to issue attempt `n` (0-based)
    Attempting(u32),
    Success(String),
    Exhausted(FailureReason),
}

/// Next state plus the sleep to take before entering it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: RetryState,
    pub delay: Option<Duration>,
}

/// Attempt budget and backoff shape.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: config.base_delay(),
            max_delay: config.max_delay(),
        }
    }

    /// `min(base * 2^attempt + jitter, cap)`.
    pub fn backoff(&self, attempt: u32, jitter_secs: f64) -> Duration {
        let exp = self.base_delay.as_secs_f64() * 2f64.powi(attempt.min(62) as i32);
        let capped = (exp + jitter_secs).min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    /// Sleeps taken between attempts if every attempt fails transiently.
    pub fn schedule(&self, jitter: &dyn Jitter) -> Vec<Duration> {
        (0..self.max_attempts.saturating_sub(1))
            .map(|n| self.backoff(n, jitter.sample()))
            .collect()
    }

    /// Advance the machine after attempt `attempt` produced `outcome`.
    pub fn advance(&self, attempt: u32, outcome: AttemptOutcome, jitter: &dyn Jitter) -> Transition {
        match outcome {
            AttemptOutcome::Success(text) => Transition {
                state: RetryState::Success(text),
                delay: None,
            },
            AttemptOutcome::Transient(reason) => {
                let attempts_made = attempt + 1;
                if attempts_made >= self.max_attempts {
                    return Transition {
                        state: RetryState::Exhausted(self.exhausted(attempts_made, reason)),
                        delay: None,
                    };
                }
                Transition {
                    state: RetryState::Attempting(attempts_made),
                    delay: Some(self.backoff(attempt, jitter.sample())),
                }
            }
        }
    }

    // Malformed bodies end as "no text"; everything else as a hard failure.
    fn exhausted(&self, attempts: u32, last: FailureReason) -> FailureReason {
        match last {
            FailureReason::EmptyChoices => FailureReason::EmptyChoices,
            other => FailureReason::Exhausted {
                attempts,
                last: Box::new(other),
            },
        }
    }
}
