//! Completion client for OpenAI-compatible chat endpoints.
//!
//! Every call goes through a bounded retry machine ([`RetryPolicy`]). The
//! caller never sees a transport error: [`LLMClient::complete`] always
//! resolves to a [`CompletionResult`].

use super::{AttemptOutcome, CompletionResult, FailureReason, Jitter, RandomJitter, RetryPolicy, RetryState};
use crate::models::{AssistError, Config, Result};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

/// Message in a chat completion request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

}

/// Chat completion request payload, serialized as-is on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub temperature: f64,
}

impl CompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: 0.7,
        }
    }

    /// Single user turn.
    pub fn user(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(model, vec![Message::user(prompt)])
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

/// Retry-governed client for one completion endpoint.
///
/// Shareable across tasks behind an `Arc`; counters are atomic.
#[derive(Debug)]
pub struct LLMClient {
    client: reqwest::Client,
    /// Bearer token
    api_key: String,
    /// Base URL for the API (no trailing slash)
    base_url: String,
    /// Attempt budget and backoff shape
    policy: RetryPolicy,
    /// Backoff jitter source
    jitter: Arc<dyn Jitter>,
    // Accounting
    total_prompt_tokens: AtomicU64,
    total_completion_tokens: AtomicU64,
    total_attempts: AtomicU64,
}

impl LLMClient {
    /// Create a client with an explicit per-request timeout and retry policy.
    pub fn new(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AssistError::Network)?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            policy,
            jitter: Arc::new(RandomJitter),
            total_prompt_tokens: AtomicU64::new(0),
            total_completion_tokens: AtomicU64::new(0),
            total_attempts: AtomicU64::new(0),
        })
    }

    /// Build from loaded configuration and a resolved key.
    pub fn from_config(config: &Config, api_key: impl Into<String>) -> Result<Self> {
        Self::new(
            api_key,
            config.provider.base_url.clone(),
            Duration::from_secs(config.provider.timeout_secs),
            RetryPolicy::from_config(&config.retry),
        )
    }

    /// Replace the jitter source.
    pub fn with_jitter(mut self, jitter: Arc<dyn Jitter>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Run one logical completion through the retry machine.
    ///
    /// Never panics and never returns an error: failures come back as
    /// [`CompletionResult::Failed`]. There is no sleep after the final
    /// attempt.
    pub async fn complete(&self, request: &CompletionRequest) -> CompletionResult {
        let url = format!("{}/chat/completions", self.base_url);
        let mut state = RetryState::Attempting(0);

        loop {
            match state {
                RetryState::Attempting(attempt) => {
                    let outcome = self.attempt(&url, request).await;
                    let failure = match &outcome {
                        AttemptOutcome::Transient(reason) => Some(reason.clone()),
                        AttemptOutcome::Success(_) => None,
                    };

                    let transition = self.policy.advance(attempt, outcome, self.jitter.as_ref());

                    if let Some(delay) = transition.delay {
                        warn!(
                            model = %request.model,
                            attempt = attempt + 1,
                            max_attempts = self.policy.max_attempts,
                            reason = %failure.as_ref().map(ToString::to_string).unwrap_or_default(),
                            backoff_ms = delay.as_millis() as u64,
                            "Completion attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                    state = transition.state;
                }
                RetryState::Success(text) => {
                    debug!(model = %request.model, chars = text.len(), "Completion succeeded");
                    return CompletionResult::Ok(text);
                }
                RetryState::Exhausted(reason) => {
                    warn!(model = %request.model, reason = %reason, "Completion failed");
                    return CompletionResult::Failed(reason);
                }
            }
        }
    }

    /// Convenience: system + user turn.
    pub async fn complete_with_system(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
        max_tokens: Option<u32>,
        temperature: f64,
    ) -> CompletionResult {
        let mut request = CompletionRequest::new(
            model,
            vec![Message::system(system_prompt), Message::user(user_prompt)],
        )
        .temperature(temperature);
        request.max_tokens = max_tokens;
        self.complete(&request).await
    }

    async fn attempt(&self, url: &str, request: &CompletionRequest) -> AttemptOutcome {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);

        let response = self
            .client
            .post(url)
            .headers(self.headers())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await;

        let response = match response {
            Ok(r) => r,
            Err(e) if e.is_timeout() => return AttemptOutcome::Transient(FailureReason::Timeout),
            Err(e) => return AttemptOutcome::Transient(FailureReason::Transport(e.to_string())),
        };

        // Every non-2xx status is retried, 4xx included.
        let status = response.status();
        if !status.is_success() {
            if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
                let body = response.text().await.unwrap_or_default();
                debug!(status = status.as_u16(), body = %body, "Client error response");
            }
            return AttemptOutcome::Transient(FailureReason::HttpError(status.as_u16()));
        }

        let body: ChatCompletionResponse = match response.json().await {
            Ok(b) => b,
            Err(e) if e.is_timeout() => return AttemptOutcome::Transient(FailureReason::Timeout),
            Err(e) => {
                debug!(error = %e, "Malformed completion body");
                return AttemptOutcome::Transient(FailureReason::EmptyChoices);
            }
        };

        if let Some(usage) = &body.usage {
            self.total_prompt_tokens
                .fetch_add(usage.prompt_tokens, Ordering::Relaxed);
            self.total_completion_tokens
                .fetch_add(usage.completion_tokens, Ordering::Relaxed);
        }

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        match content {
            Some(text) => AttemptOutcome::Success(text),
            None => AttemptOutcome::Transient(FailureReason::EmptyChoices),
        }
    }

    /// Prompt and completion tokens reported by the endpoint so far.
    pub fn total_tokens(&self) -> (u64, u64) {
        (
            self.total_prompt_tokens.load(Ordering::Relaxed),
            self.total_completion_tokens.load(Ordering::Relaxed),
        )
    }

    /// HTTP attempts issued so far, retries included.
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts.load(Ordering::Relaxed)
    }

}
