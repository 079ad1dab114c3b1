//! interview-assist CLI - interview practice and Q&A dataset generation.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_assist::{
    Config, DatasetPipeline, Difficulty, InterviewService, InterviewSession, JobProfile,
    LLMClient,
};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "interview-assist")]
#[command(version)]
#[command(about = "LLM-backed interview practice and quality-tiered Q&A dataset generation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults are used when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate interview questions for a role
    Questions {
        /// Job role, e.g. "Software Engineer"
        #[arg(short, long)]
        role: String,

        /// Job description or summary
        #[arg(short, long, default_value = "")]
        description: String,

        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Number of questions (defaults to interview.num_questions)
        #[arg(short = 'n', long)]
        count: Option<usize>,
    },

    /// Evaluate a single answer
    Evaluate {
        /// Interview question
        #[arg(short, long)]
        question: String,

        /// Candidate answer; "-" reads it from stdin
        #[arg(short, long)]
        answer: String,

        /// Job role
        #[arg(short, long, default_value = "")]
        role: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run an interactive interview in the terminal
    Interview {
        /// Job role; when omitted the session asks for the configuration
        #[arg(short, long)]
        role: Option<String>,

        /// Job description or summary
        #[arg(short, long, default_value = "")]
        description: String,

        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,

        /// Number of questions
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Write the session transcript as JSON
        #[arg(short, long)]
        transcript: Option<PathBuf>,
    },

    /// Generate the quality-tiered Q&A dataset
    Dataset {
        /// Samples per quality tier
        #[arg(short = 'n', long)]
        samples_per_quality: Option<usize>,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Checkpoint CSV path
        #[arg(long)]
        checkpoint: Option<PathBuf>,

        /// Concurrent workers
        #[arg(short, long)]
        workers: Option<usize>,

        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn print_example_config() {
    let example = r#"# interview-assist configuration file

[provider]
# API key (can also use the env var named below; ${VAR} is expanded)
# api_key = "${MISTRAL_API_KEY}"
api_key_env = "MISTRAL_API_KEY"
base_url = "https://api.mistral.ai/v1"
timeout_secs = 30

[retry]
max_attempts = 5
base_delay_secs = 2.0
max_delay_secs = 60.0

[interview]
model = "mistral-tiny"
max_tokens = 1024
temperature = 0.7
num_questions = 5

[dataset]
model = "mistral-large-latest"
temperature = 0.7
samples_per_quality = 200
workers = 3
checkpoint_interval = 25
max_question_attempts = 3
output = "interview_qa_dataset.csv"
checkpoint = "dataset_checkpoint.csv"
# topics = ["Data Structures", "Algorithms", ...]

[dataset.max_tokens]
question = 200
answer = 800
gold_answer = 1000
"#;
    println!("{example}");
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load config from {p:?}"),
        None => "Invalid default configuration".to_string(),
    })
}

/// Resolve the key before any network use; a missing key is fatal.
fn build_client(config: &Config) -> Result<Arc<LLMClient>> {
    let api_key = config
        .resolve_api_key()
        .context("Failed to resolve API key")?;
    Ok(Arc::new(LLMClient::from_config(config, api_key)?))
}

fn read_answer(answer: String) -> Result<String> {
    if answer != "-" {
        return Ok(answer);
    }
    let mut buf = String::new();
    io::stdin()
        .read_to_string(&mut buf)
        .context("Failed to read answer from stdin")?;
    Ok(buf.trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Example => {
            print_example_config();
        }

        Commands::Validate => {
            let config = load_config(config_path)?;
            config
                .resolve_api_key()
                .context("Failed to resolve API key")?;

            info!("Configuration is valid");
            info!("  Endpoint: {}", config.provider.base_url);
            info!(
                "  Retries: {} attempts, {:.1}s base, {:.1}s cap",
                config.retry.max_attempts, config.retry.base_delay_secs, config.retry.max_delay_secs
            );
            info!("  Interview model: {}", config.interview.model);
            info!(
                "  Dataset: {} per tier with {} workers on {}",
                config.dataset.samples_per_quality, config.dataset.workers, config.dataset.model
            );
        }

        Commands::Questions {
            role,
            description,
            difficulty,
            count,
        } => {
            let config = load_config(config_path)?;
            let client = build_client(&config)?;
            let n = count.unwrap_or(config.interview.num_questions);
            let service = InterviewService::new(client, config.interview);

            let profile = JobProfile::new(role, description, difficulty);
            let questions = service.generate_questions(&profile, n).await?;
            for (i, q) in questions.iter().enumerate() {
                println!("{}. {q}", i + 1);
            }
        }

        Commands::Evaluate {
            question,
            answer,
            role,
            json,
        } => {
            let config = load_config(config_path)?;
            let client = build_client(&config)?;
            let service = InterviewService::new(client, config.interview);

            let answer = read_answer(answer)?;
            let profile = JobProfile::new(role, "", Difficulty::default());
            let feedback = service.evaluate_response(&profile, &question, &answer).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&feedback)?);
            } else {
                println!("Score: {}", feedback.score);
                println!("Strengths: {}", feedback.strengths);
                println!("Areas for Improvement: {}", feedback.areas_for_improvement);
                println!("Sample Answer Hint: {}", feedback.sample_answer);
            }
        }

        Commands::Interview {
            role,
            description,
            difficulty,
            count,
            transcript,
        } => {
            let config = load_config(config_path)?;
            let client = build_client(&config)?;
            let default_count = config.interview.num_questions;
            let service = InterviewService::new(client, config.interview);

            println!("Welcome to the AI Interview Simulator (Terminal Edition)!");
            let mut session = InterviewSession::new(&service, io::stdin().lock(), io::stdout().lock());
            let (profile, n) = match role {
                Some(role) => (
                    JobProfile::new(role, description, difficulty),
                    count.unwrap_or(default_count),
                ),
                None => session.configure(count.unwrap_or(default_count))?,
            };

            let record = session.run(profile, n).await?;
            drop(session);

            if let Some(path) = transcript {
                record.save(&path)?;
                println!("Transcript: {path:?}");
            }
            let (prompt_tokens, completion_tokens) = service.client().total_tokens();
            info!(prompt_tokens, completion_tokens, "Token usage");
            println!("Thank you for using the AI Interview Simulator!");
        }

        Commands::Dataset {
            samples_per_quality,
            output,
            checkpoint,
            workers,
            quiet,
        } => {
            let mut config = load_config(config_path)?;

            // CLI overrides
            if let Some(n) = samples_per_quality {
                config.dataset.samples_per_quality = n;
            }
            if let Some(path) = output {
                config.dataset.output = path;
            }
            if let Some(path) = checkpoint {
                config.dataset.checkpoint = path;
            }
            if let Some(w) = workers {
                config.dataset.workers = w;
            }
            config.validate().context("Invalid dataset options")?;

            let client = build_client(&config)?;
            let output = config.dataset.output.clone();
            let pipeline = DatasetPipeline::new(config.dataset, client).with_progress(!quiet);
            let outcome = pipeline.run().await?;
            let stats = outcome.stats;

            println!("\n=== Dataset Generation Complete ===");
            println!("Requested:   {}", stats.total_requested);
            println!("Completed:   {}", stats.total_completed);
            println!("Failed:      {}", stats.total_failed);
            for ((quality, topic), count) in stats.failures_by_tier_and_topic() {
                println!("  failed {:<12} {topic}: {count}", quality.as_str());
            }
            for (quality, count) in &stats.per_quality {
                println!("  {:<12} {count}", quality.as_str());
            }
            println!("Completion:  {:.1}%", stats.completion_rate * 100.0);
            println!("Checkpoints: {}", stats.checkpoints_written);
            println!(
                "Tokens:      {} prompt / {} completion",
                stats.prompt_tokens, stats.completion_tokens
            );
            println!("Throughput:  {:.0}/hr", stats.throughput_per_hour);
            println!("Runtime:     {:.1}s", stats.runtime_secs);
            println!("Output:      {output:?}");
        }
    }

    Ok(())
}
