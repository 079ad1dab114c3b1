//! Dataset persistence.
//!
//! Provides:
//! - `write_samples` / `read_samples`: full-overwrite CSV files
//! - `load_questions`: questions of an existing dataset, for dedup preload
//! - `CheckpointManager`: periodic snapshots during a batch run

mod csv_store;

pub use csv_store::*;
