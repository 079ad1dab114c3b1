//! Interview operations backed by the completion client.

use super::fallback_questions;
use crate::client::{CompletionRequest, LLMClient, Message};
use crate::models::{
    AssistError, Exchange, FeedbackRecord, InterviewSettings, JobProfile, OverallAnalysis, Result,
};
use crate::parser::{average_score, parse_feedback, parse_overall_analysis, parse_questions};
use crate::prompt::{build_feedback_prompt, build_overall_analysis_prompt, build_question_prompt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Question generation, answer evaluation and session analysis.
pub struct InterviewService {
    /// Completion client (shared)
    client: Arc<LLMClient>,
    /// Model and sampling settings
    settings: InterviewSettings,
}

impl InterviewService {
    pub fn new(client: Arc<LLMClient>, settings: InterviewSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> &InterviewSettings {
        &self.settings
    }

    pub fn client(&self) -> &Arc<LLMClient> {
        &self.client
    }

    fn request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest::new(self.settings.model.clone(), messages)
            .max_tokens(self.settings.max_tokens)
            .temperature(self.settings.temperature)
    }

    /// Generate up to `n` questions, falling back to a canned list of exactly
    /// `n` when the call fails or nothing parses.
    pub async fn generate_questions(&self, profile: &JobProfile, n: usize) -> Result<Vec<String>> {
        if n == 0 {
            return Err(AssistError::InvalidInput(
                "number of questions must be at least 1".to_string(),
            ));
        }

        info!(role = %profile.role_or_default(), difficulty = %profile.difficulty, n, "Generating questions");

        let result = self.client.complete(&self.request(build_question_prompt(profile, n))).await;
        let mut questions = parse_questions(result.text());

        match (result.failure(), questions.is_empty()) {
            (Some(reason), _) => {
                warn!(reason = %reason, "Question generation failed, using fallback list");
                questions = fallback_questions(profile, n);
            }
            (None, true) => {
                warn!("Model returned text but no questions could be parsed, using fallback list");
                questions = fallback_questions(profile, n);
            }
            (None, false) => questions.truncate(n),
        }

        debug!(count = questions.len(), "Questions ready");
        Ok(questions)
    }

    /// Score one answer. Always returns a fully populated record.
    pub async fn evaluate_response(
        &self,
        profile: &JobProfile,
        question: &str,
        response: &str,
    ) -> FeedbackRecord {
        let messages = build_feedback_prompt(question, response, profile.role_or_default());
        let result = self.client.complete(&self.request(messages)).await;
        let feedback = parse_feedback(&result);

        if feedback.is_placeholder() {
            warn!(score = %feedback.score, "Evaluation degraded to placeholder feedback");
        }
        feedback
    }

    /// Summarize a finished session. The average is computed locally.
    pub async fn generate_overall_performance(
        &self,
        profile: &JobProfile,
        transcript: &[Exchange],
    ) -> OverallAnalysis {
        let feedback: Vec<FeedbackRecord> = transcript.iter().map(|e| e.feedback.clone()).collect();
        let average = average_score(&feedback);

        let messages = build_overall_analysis_prompt(profile, transcript);
        let result = self.client.complete(&self.request(messages)).await;
        parse_overall_analysis(&result, average)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FixedJitter, RetryPolicy};
    use crate::models::{AnalysisStatus, Difficulty, Score};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        }))
    }

    fn service(server: &MockServer) -> InterviewService {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        };
        let client = LLMClient::new("sk-test", server.uri(), Duration::from_secs(5), policy)
            .unwrap()
            .with_jitter(Arc::new(FixedJitter(0.0)));
        InterviewService::new(Arc::new(client), InterviewSettings::default())
    }

    fn profile() -> JobProfile {
        JobProfile::new("Software Engineer", "Web apps", Difficulty::Medium)
    }

    #[tokio::test]
    async fn questions_are_parsed_and_truncated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat("1. One?\n2. Two?\n3. Three?\n4. Four?"))
            .mount(&server)
            .await;

        let qs = service(&server).generate_questions(&profile(), 3).await.unwrap();
        assert_eq!(qs, vec!["One?", "Two?", "Three?"]);
    }

    #[tokio::test]
    async fn failed_call_yields_exactly_n_fallback_questions() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let svc = service(&server);
        for n in [1, 5, 8] {
            let qs = svc.generate_questions(&profile(), n).await.unwrap();
            assert_eq!(qs.len(), n);
            assert_eq!(qs[0], "Tell me about a challenging project you worked on.");
        }
    }

    #[tokio::test]
    async fn zero_questions_is_rejected() {
        let server = MockServer::start().await;
        let err = service(&server).generate_questions(&profile(), 0).await.unwrap_err();
        assert!(matches!(err, AssistError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn evaluation_parses_model_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_string_contains("Candidate's Response: 'I used a mutex.'"))
            .respond_with(chat(
                r#"{"score": 8, "strengths": "Direct", "areas_for_improvement": "Trade-offs", "sample_answer": "..."}"#,
            ))
            .mount(&server)
            .await;

        let fb = service(&server)
            .evaluate_response(&profile(), "How do you guard shared state?", "I used a mutex.")
            .await;
        assert_eq!(fb.score, Score::Value(8));
        assert_eq!(fb.strengths, "Direct");
    }

    #[tokio::test]
    async fn evaluation_degrades_on_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let fb = service(&server).evaluate_response(&profile(), "Q", "R").await;
        assert_eq!(fb, FeedbackRecord::call_failed());
    }

    #[tokio::test]
    async fn overall_performance_averages_numeric_scores_only() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(chat(
                r#"{"overall_analysis": "Solid.", "key_strengths": ["Clarity"], "improvement_areas": [], "preparation_tips": ["Mock more"]}"#,
            ))
            .mount(&server)
            .await;

        let exchange = |score| Exchange {
            question: "Q".into(),
            response: "R".into(),
            feedback: FeedbackRecord {
                score,
                strengths: "s".into(),
                areas_for_improvement: "a".into(),
                sample_answer: "x".into(),
            },
        };
        let transcript = vec![
            exchange(Score::Value(8)),
            exchange(Score::Value(7)),
            Exchange {
                feedback: FeedbackRecord::call_failed(),
                ..exchange(Score::Value(1))
            },
        ];

        let analysis = service(&server)
            .generate_overall_performance(&profile(), &transcript)
            .await;
        assert_eq!(analysis.average_score, 7.5);
        assert_eq!(analysis.overall_analysis, "Solid.");
        assert_eq!(analysis.status, AnalysisStatus::Generated);
    }
}
