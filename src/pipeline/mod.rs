//! Batch pipelines.

mod dataset;

pub use dataset::*;
