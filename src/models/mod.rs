//! Core data models for interview-assist.

mod config;
mod error;
mod feedback;
mod interview;
mod sample;

pub use config::*;
pub use error::*;
pub use feedback::*;
pub use interview::*;
pub use sample::*;
