//! Prompt synthesis.
//!
//! Pure builders from structured inputs to message sequences. No I/O and
//! no failure modes.

mod dataset;
mod interview;

pub use dataset::*;
pub use interview::*;
