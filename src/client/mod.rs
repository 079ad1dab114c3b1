//! Completion client with bounded retries.

mod llm_client;
mod outcome;
mod retry;

pub use llm_client::*;
pub use outcome::*;
pub use retry::*;
