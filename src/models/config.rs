//! Configuration models for interview-assist.
//!
//! Every tunable lives here and is passed explicitly into the components
//! that need it. Nothing is read from process-wide state except the API
//! key, and only when [`Config::resolve_api_key`] is called.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

/// Top-level configuration for interview-assist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Completion endpoint settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Retry/backoff policy for every completion call
    #[serde(default)]
    pub retry: RetryConfig,

    /// Interactive interview settings
    #[serde(default)]
    pub interview: InterviewSettings,

    /// Batch dataset generation settings
    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Hosted completion endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// API key (overrides the environment variable; may contain ${VAR})
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_key_env() -> String {
    "MISTRAL_API_KEY".to_string()
}

fn default_base_url() -> String {
    "https://api.mistral.ai/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Retry budget and backoff shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts per logical request (not retries after the first)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay in seconds, doubled per attempt
    #[serde(default = "default_base_delay")]
    pub base_delay_secs: f64,

    /// Upper bound on a single backoff sleep, in seconds
    #[serde(default = "default_max_delay")]
    pub max_delay_secs: f64,
}

fn default_max_attempts() -> u32 {
    5
}

fn default_base_delay() -> f64 {
    2.0
}

fn default_max_delay() -> f64 {
    60.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_secs: default_base_delay(),
            max_delay_secs: default_max_delay(),
        }
    }
}

/// Settings for the interactive interview flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewSettings {
    /// Model used for questions, feedback and analysis
    #[serde(default = "default_interview_model")]
    pub model: String,

    /// Output token cap per call
    #[serde(default = "default_interview_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Questions per session when the user does not say otherwise
    #[serde(default = "default_num_questions")]
    pub num_questions: usize,
}

fn default_interview_model() -> String {
    "mistral-tiny".to_string()
}

fn default_interview_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_num_questions() -> usize {
    5
}

impl Default for InterviewSettings {
    fn default() -> Self {
        Self {
            model: default_interview_model(),
            max_tokens: default_interview_max_tokens(),
            temperature: default_temperature(),
            num_questions: default_num_questions(),
        }
    }
}

/// Settings for the quality-tiered dataset generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Model used for every dataset call
    #[serde(default = "default_dataset_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Samples requested per quality tier
    #[serde(default = "default_samples_per_quality")]
    pub samples_per_quality: usize,

    /// Concurrent workers (kept small to respect upstream rate limits)
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Completed samples between checkpoint rewrites
    #[serde(default = "default_checkpoint_interval")]
    pub checkpoint_interval: usize,

    /// Attempts to obtain a non-duplicate question for one sample
    #[serde(default = "default_max_question_attempts")]
    pub max_question_attempts: u32,

    /// Token caps for the three stages of a sample
    #[serde(default)]
    pub max_tokens: StageTokens,

    /// Final dataset file
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Periodic checkpoint file
    #[serde(default = "default_checkpoint")]
    pub checkpoint: PathBuf,

    /// Topics questions are drawn from
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,
}

/// Output token caps per generation stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StageTokens {
    pub question: u32,
    pub answer: u32,
    pub gold_answer: u32,
}

impl Default for StageTokens {
    fn default() -> Self {
        Self {
            question: 200,
            answer: 800,
            gold_answer: 1000,
        }
    }
}

fn default_dataset_model() -> String {
    "mistral-large-latest".to_string()
}

fn default_samples_per_quality() -> usize {
    200
}

fn default_workers() -> usize {
    3
}

fn default_checkpoint_interval() -> usize {
    25
}

fn default_max_question_attempts() -> u32 {
    3
}

fn default_output() -> PathBuf {
    PathBuf::from("interview_qa_dataset.csv")
}

fn default_checkpoint() -> PathBuf {
    PathBuf::from("dataset_checkpoint.csv")
}

fn default_topics() -> Vec<String> {
    [
        "Data Structures",
        "Algorithms",
        "Object-Oriented Programming",
        "System Design",
        "Databases",
        "Operating Systems",
        "Networking",
        "Web Development",
        "Front-end Frameworks",
        "Back-end Development",
        "Cloud Computing",
        "DevOps",
        "Microservices",
        "Security",
        "Testing",
        "CI/CD",
        "Version Control",
        "Agile Methodologies",
        "API Design",
        "Concurrency",
        "Parallel Programming",
        "Memory Management",
        "Design Patterns",
        "Problem Solving",
        "Debugging",
        "Performance Optimization",
        "Mobile Development",
        "Machine Learning Basics",
        "Ethics in Software Engineering",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            model: default_dataset_model(),
            temperature: default_temperature(),
            samples_per_quality: default_samples_per_quality(),
            workers: default_workers(),
            checkpoint_interval: default_checkpoint_interval(),
            max_question_attempts: default_max_question_attempts(),
            max_tokens: StageTokens::default(),
            output: default_output(),
            checkpoint: default_checkpoint(),
            topics: default_topics(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_secs_f64(self.base_delay_secs)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_secs_f64(self.max_delay_secs)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::invalid("retry.max_attempts", "must be at least 1"));
        }
        for (field, secs) in [
            ("retry.base_delay_secs", self.retry.base_delay_secs),
            ("retry.max_delay_secs", self.retry.max_delay_secs),
        ] {
            if !secs.is_finite() || !(0.0..=MAX_RETRY_DELAY_SECS).contains(&secs) {
                return Err(ConfigError::invalid(
                    field,
                    &format!("must be between 0 and {MAX_RETRY_DELAY_SECS} seconds"),
                ));
            }
        }
        if self.provider.timeout_secs == 0 {
            return Err(ConfigError::invalid("provider.timeout_secs", "must be at least 1"));
        }
        if self.interview.num_questions == 0 {
            return Err(ConfigError::invalid("interview.num_questions", "must be at least 1"));
        }
        if self.dataset.workers == 0 {
            return Err(ConfigError::invalid("dataset.workers", "must be at least 1"));
        }
        if self.dataset.checkpoint_interval == 0 {
            return Err(ConfigError::invalid(
                "dataset.checkpoint_interval",
                "must be at least 1",
            ));
        }
        if self.dataset.max_question_attempts == 0 {
            return Err(ConfigError::invalid(
                "dataset.max_question_attempts",
                "must be at least 1",
            ));
        }
        if self.dataset.topics.is_empty() {
            return Err(ConfigError::invalid("dataset.topics", "must not be empty"));
        }
        Ok(())
    }

    /// Resolve the bearer token from config or the process environment.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the bearer token using `lookup` for environment access.
    pub fn resolve_api_key_with<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = &self.provider.api_key {
            let expanded = expand_env_vars_with(key, &lookup);
            // An unresolved placeholder means the inline key is not usable.
            if !expanded.trim().is_empty() && !ENV_VAR_RE.is_match(&expanded) {
                return Ok(expanded);
            }
        }

        lookup(&self.provider.api_key_env)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                env_var: self.provider.api_key_env.clone(),
            })
    }
}

/// Upper bound for configured retry delays, in seconds.
const MAX_RETRY_DELAY_SECS: f64 = 3600.0;

static ENV_VAR_RE: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"\$\{([^}]+)\}").unwrap_or_else(|e| panic!("invalid env regex: {e}"))
});

/// Expand `${VAR_NAME}` placeholders via `lookup`; unset variables are left in place.
fn expand_env_vars_with<F>(s: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VAR_RE
        .replace_all(s, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Missing API key: set the {env_var} env var or provider.api_key in config")]
    MissingApiKey { env_var: String },

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: String, reason: String },
}

impl ConfigError {
    fn invalid(field: &str, reason: &str) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}
