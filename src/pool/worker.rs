//! Single-sample generation.
//!
//! One sample walks `Question → Answer → GoldAnswer → Complete`. The
//! question stage is retried on duplicates up to the configured limit; any
//! failed call abandons the sample.

use super::AskedQuestionSet;
use crate::client::{CompletionRequest, LLMClient, Message};
use crate::models::{AssistError, DatasetConfig, QASample, Quality, Result, SampleJob};
use crate::prompt::{build_answer_prompt, build_gold_answer_prompt, build_topic_question_prompt};
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a sample is in its pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleStage {
    /// Asking for a question; `attempt` is 1-based
    GeneratingQuestion { attempt: u32 },
    GeneratingAnswer { question: String },
    GeneratingGoldAnswer { question: String, answer: String },
    Complete(QASample),
}

/// Produces [`QASample`]s for jobs. Cheap to clone into tasks.
#[derive(Clone)]
pub struct SampleWorker {
    /// Completion client (shared)
    client: Arc<LLMClient>,
    /// Model, temperature and per-stage token caps
    config: Arc<DatasetConfig>,
    /// Questions already used (shared)
    asked: Arc<AskedQuestionSet>,
}

impl SampleWorker {
    pub fn new(client: Arc<LLMClient>, config: Arc<DatasetConfig>, asked: Arc<AskedQuestionSet>) -> Self {
        Self {
            client,
            config,
            asked,
        }
    }

    pub fn asked(&self) -> &Arc<AskedQuestionSet> {
        &self.asked
    }

    fn request(&self, messages: Vec<Message>, max_tokens: u32) -> CompletionRequest {
        CompletionRequest::new(self.config.model.clone(), messages)
            .max_tokens(max_tokens)
            .temperature(self.config.temperature)
    }

    /// Run one job to completion.
    ///
    /// Errors: [`AssistError::DuplicateQuestion`] when every question
    /// attempt was a repeat, [`AssistError::Completion`] when a stage got
    /// no text.
    pub async fn generate_sample(&self, job: &SampleJob) -> Result<QASample> {
        let mut stage = SampleStage::GeneratingQuestion { attempt: 1 };

        loop {
            stage = match stage {
                SampleStage::GeneratingQuestion { attempt } => {
                    self.next_question_stage(job, attempt).await?
                }
                SampleStage::GeneratingAnswer { question } => {
                    let answer = self.answer(&question, job.quality).await?;
                    SampleStage::GeneratingGoldAnswer { question, answer }
                }
                SampleStage::GeneratingGoldAnswer { question, answer } => {
                    let gold_answer = self.gold_answer(&question, &answer, job.quality).await?;
                    SampleStage::Complete(QASample {
                        question,
                        answer,
                        quality: job.quality,
                        gold_answer,
                    })
                }
                SampleStage::Complete(sample) => {
                    debug!(topic = %job.topic, quality = %job.quality, "Sample complete");
                    return Ok(sample);
                }
            };
        }
    }

    async fn next_question_stage(&self, job: &SampleJob, attempt: u32) -> Result<SampleStage> {
        let request = self.request(
            build_topic_question_prompt(&job.topic),
            self.config.max_tokens.question,
        );
        let question = self.client.complete(&request).await.into_result("question")?;

        if self.asked.contains(&question) {
            let max = self.config.max_question_attempts;
            warn!(topic = %job.topic, attempt, max, "Duplicate question, regenerating");
            if attempt >= max {
                return Err(AssistError::DuplicateQuestion { attempts: attempt });
            }
            return Ok(SampleStage::GeneratingQuestion {
                attempt: attempt + 1,
            });
        }

        self.asked.insert(&question);
        Ok(SampleStage::GeneratingAnswer { question })
    }

    async fn answer(&self, question: &str, quality: Quality) -> Result<String> {
        let request = self.request(
            build_answer_prompt(question, quality),
            self.config.max_tokens.answer,
        );
        self.client.complete(&request).await.into_result("answer")
    }

    async fn gold_answer(&self, question: &str, answer: &str, quality: Quality) -> Result<String> {
        let request = self.request(
            build_gold_answer_prompt(question, answer, quality),
            self.config.max_tokens.gold_answer,
        );
        self.client.complete(&request).await.into_result("gold_answer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FailureReason, FixedJitter, RetryPolicy};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_partial_json, body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        }))
    }

    fn worker(server: &MockServer, asked: AskedQuestionSet) -> SampleWorker {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        };
        let client = LLMClient::new("sk-test", server.uri(), Duration::from_secs(5), policy)
            .unwrap()
            .with_jitter(Arc::new(FixedJitter(0.0)));
        SampleWorker::new(
            Arc::new(client),
            Arc::new(DatasetConfig::default()),
            Arc::new(asked),
        )
    }

    fn job(quality: Quality) -> SampleJob {
        SampleJob {
            topic: "Databases".to_string(),
            quality,
        }
    }

    #[tokio::test]
    async fn stages_run_in_order_with_stage_token_caps() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("challenging interview question"))
            .and(body_partial_json(json!({ "max_tokens": 200, "model": "mistral-large-latest" })))
            .respond_with(chat("What is an index?"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("Generate a adequate answer"))
            .and(body_partial_json(json!({ "max_tokens": 800 })))
            .respond_with(chat("I think it makes lookups faster."))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("I think it makes lookups faster."))
            .and(body_partial_json(json!({ "max_tokens": 1000 })))
            .respond_with(chat("An index is an auxiliary structure..."))
            .expect(1)
            .mount(&server)
            .await;

        let w = worker(&server, AskedQuestionSet::new());
        let sample = w.generate_sample(&job(Quality::Adequate)).await.unwrap();

        assert_eq!(sample.question, "What is an index?");
        assert_eq!(sample.answer, "I think it makes lookups faster.");
        assert_eq!(sample.gold_answer, "An index is an auxiliary structure...");
        assert_eq!(sample.quality, Quality::Adequate);
        assert!(w.asked().contains("what is an index?"));
    }

    #[tokio::test]
    async fn three_duplicates_abandon_the_sample() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("challenging interview question"))
            .respond_with(chat("What is Big-O?"))
            .expect(3)
            .mount(&server)
            .await;

        let asked: AskedQuestionSet = ["what is big-o? "].into_iter().collect();
        let err = worker(&server, asked)
            .generate_sample(&job(Quality::Excellent))
            .await
            .unwrap_err();

        assert!(matches!(err, AssistError::DuplicateQuestion { attempts: 3 }));
    }

    #[tokio::test]
    async fn failed_stage_abandons_the_sample() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("challenging interview question"))
            .respond_with(chat("What is MVCC?"))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = worker(&server, AskedQuestionSet::new())
            .generate_sample(&job(Quality::Insufficient))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AssistError::Completion {
                stage: "answer",
                reason: FailureReason::Exhausted { attempts: 1, ref last }
            } if **last == FailureReason::HttpError(403)
        ));
    }
}
