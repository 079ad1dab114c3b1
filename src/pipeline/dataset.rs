//! Quality-tiered dataset generation pipeline.
//!
//! Pipeline flow:
//! Jobs (topic × quality) → bounded workers → collector → checkpoints → CSV

use crate::checkpoint::{load_questions, write_samples, CheckpointManager};
use crate::client::LLMClient;
use crate::models::{AssistError, DatasetConfig, DatasetStats, QASample, Quality, Result, SampleJob};
use crate::pool::{AskedQuestionSet, SampleWorker};
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Samples produced by a run plus its statistics.
#[derive(Debug, Clone)]
pub struct DatasetOutcome {
    pub samples: Vec<QASample>,
    pub stats: DatasetStats,
}

/// Batch generator for the labelled Q&A dataset.
pub struct DatasetPipeline {
    worker: SampleWorker,
    config: Arc<DatasetConfig>,
    client: Arc<LLMClient>,
    show_progress: bool,
}

impl DatasetPipeline {
    pub fn new(config: DatasetConfig, client: Arc<LLMClient>) -> Self {
        let config = Arc::new(config);
        let worker = SampleWorker::new(
            Arc::clone(&client),
            Arc::clone(&config),
            Arc::new(AskedQuestionSet::new()),
        );
        Self {
            worker,
            config,
            client,
            show_progress: true,
        }
    }

    /// Toggle the terminal progress bar.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn asked(&self) -> &Arc<AskedQuestionSet> {
        self.worker.asked()
    }

    /// One job per requested sample, tiers in order, each with a random topic.
    pub fn plan_jobs<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<SampleJob> {
        let mut jobs = Vec::with_capacity(self.config.samples_per_quality * Quality::ALL.len());
        for quality in Quality::ALL {
            for _ in 0..self.config.samples_per_quality {
                let topic = self
                    .config
                    .topics
                    .choose(rng)
                    .cloned()
                    .unwrap_or_else(|| "Software Engineering".to_string());
                jobs.push(SampleJob { topic, quality });
            }
        }
        jobs
    }

    /// Seed the dedup set from an existing output file.
    ///
    /// Unreadable files are logged and skipped.
    pub fn preload_existing(&self) -> usize {
        match load_questions(&self.config.output) {
            Ok(questions) => {
                for q in &questions {
                    self.asked().insert(q);
                }
                if !questions.is_empty() {
                    info!(
                        count = self.asked().len(),
                        path = %self.config.output.display(),
                        "Existing questions will be avoided"
                    );
                }
                questions.len()
            }
            Err(e) => {
                warn!(error = %e, "Could not load existing dataset, continuing without it");
                0
            }
        }
    }

    /// Generate the whole dataset.
    ///
    /// All jobs are submitted up front; at most `workers` run at once and
    /// results are collected in completion order. Per-sample failures are
    /// counted, never fatal. Only the final output write can fail the run.
    pub async fn run(&self) -> Result<DatasetOutcome> {
        let start = Instant::now();
        self.preload_existing();

        let jobs = self.plan_jobs(&mut rand::thread_rng());
        let total = jobs.len();

        info!(
            total,
            per_quality = self.config.samples_per_quality,
            workers = self.config.workers,
            model = %self.config.model,
            "Starting dataset generation"
        );

        let pb = self.progress_bar(total);
        let semaphore = Arc::new(Semaphore::new(self.config.workers.max(1)));
        let mut tasks = JoinSet::new();

        for job in jobs {
            let worker = self.worker.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => worker.generate_sample(&job).await,
                    Err(_) => Err(AssistError::Internal("Semaphore closed".to_string())),
                };
                (job, result)
            });
        }

        // Single collector: sole owner of the results and the checkpoint file.
        let mut samples: Vec<QASample> = Vec::new();
        let mut stats = DatasetStats {
            total_requested: total,
            ..Default::default()
        };
        let mut checkpoint = CheckpointManager::new(&self.config.checkpoint, self.config.checkpoint_interval);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((job, Ok(sample))) => {
                    stats.record_completed(job.quality);
                    samples.push(sample);
                    if let Err(e) = checkpoint.maybe_save(&samples) {
                        error!(error = %e, completed = samples.len(), "Checkpoint write failed");
                    }
                }
                Ok((job, Err(e))) => {
                    warn!(topic = %job.topic, quality = %job.quality, error = %e, "Sample abandoned");
                    stats.record_failed(job);
                }
                Err(e) => {
                    stats.total_failed += 1;
                    warn!(error = %e, "Sample task panicked");
                }
            }
            pb.inc(1);
            pb.set_message(format!("ok: {}, failed: {}", stats.total_completed, stats.total_failed));
        }

        pb.finish_with_message(format!(
            "Done! {} samples, {} failed",
            stats.total_completed, stats.total_failed
        ));

        info!(path = %self.config.output.display(), samples = samples.len(), "Writing dataset");
        write_samples(&self.config.output, &samples)?;

        let (prompt_tokens, completion_tokens) = self.client.total_tokens();
        stats.prompt_tokens = prompt_tokens;
        stats.completion_tokens = completion_tokens;
        stats.checkpoints_written = checkpoint.writes();
        stats.runtime_secs = start.elapsed().as_secs_f64();
        stats.finalize();

        info!(
            completed = stats.total_completed,
            failed = stats.total_failed,
            completion_rate = format!("{:.1}%", stats.completion_rate * 100.0),
            throughput = format!("{:.0}/hr", stats.throughput_per_hour),
            "Dataset generation complete"
        );

        Ok(DatasetOutcome { samples, stats })
    }

    fn progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }
        let pb = ProgressBar::new(total as u64);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        {
            pb.set_style(style.progress_chars("##-"));
        }
        pb
    }
}
