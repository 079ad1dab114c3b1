//! Structured response parsing.
//!
//! Raw model text → question lists, [`FeedbackRecord`](crate::models::FeedbackRecord)
//! or [`OverallAnalysis`](crate::models::OverallAnalysis). Malformed text
//! never surfaces as an error.

mod feedback;
mod questions;

pub use feedback::*;
pub use questions::*;
