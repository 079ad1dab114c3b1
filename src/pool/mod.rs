//! Sample generation workers and their shared dedup state.

mod dedup;
mod worker;

pub use dedup::*;
pub use worker::*;
