//! interview-assist - LLM-backed interview practice and Q&A dataset generation.
//!
//! ## Architecture
//!
//! Leaf to root:
//! - **prompt**: pure builders of chat message sequences
//! - **client**: one logical completion with bounded retries and backoff
//! - **parser**: model text → questions, feedback, overall analysis
//! - **interview**: question generation, evaluation, terminal session
//! - **pool** / **pipeline** / **checkpoint**: quality-tiered dataset
//!   generation with a bounded worker pool and CSV checkpoints
//!
//! ## Failure model
//!
//! - Transient upstream failures are retried inside the client
//! - Calls that still fail come back as `CompletionResult::Failed`
//! - Interview callers substitute fallback questions or placeholder feedback
//! - The dataset pipeline abandons the sample and keeps going

pub mod checkpoint;
pub mod client;
pub mod interview;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod pool;
pub mod prompt;

// Re-exports for convenience
pub use checkpoint::CheckpointManager;
pub use client::{CompletionRequest, CompletionResult, FailureReason, LLMClient, RetryPolicy};
pub use interview::{InterviewService, InterviewSession, InterviewTranscript};
pub use models::{
    AssistError, Config, Difficulty, FeedbackRecord, JobProfile, OverallAnalysis, QASample,
    Quality, Result, Score,
};
pub use pipeline::{DatasetOutcome, DatasetPipeline};
pub use pool::{AskedQuestionSet, SampleWorker};
