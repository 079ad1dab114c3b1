//! Terminal interview session and its persisted transcript.

use super::InterviewService;
use crate::models::{
    AssistError, Difficulty, Exchange, JobProfile, OverallAnalysis, Result,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::info;
use uuid::Uuid;

/// Everything that happened in one practice session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewTranscript {
    /// Session identifier
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub profile: JobProfile,
    /// Answered questions in the order asked
    pub exchanges: Vec<Exchange>,
    pub analysis: Option<OverallAnalysis>,
}

impl InterviewTranscript {
    pub fn new(profile: JobProfile) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            profile,
            exchanges: Vec::new(),
            analysis: None,
        }
    }

    /// Write as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AssistError::Internal(format!("transcript serialization: {e}")))?;
        std::fs::write(path, json)
            .map_err(|e| AssistError::io(format!("writing transcript {}", path.display()), e))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AssistError::io(format!("reading transcript {}", path.display()), e))?;
        serde_json::from_str(&content).map_err(|e| {
            AssistError::InvalidInput(format!("transcript {} is not valid: {e}", path.display()))
        })
    }
}

/// Line-oriented interview driver over any reader/writer pair.
pub struct InterviewSession<'a, R, W> {
    service: &'a InterviewService,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> InterviewSession<'a, R, W> {
    pub fn new(service: &'a InterviewService, input: R, output: W) -> Self {
        Self {
            service,
            input,
            output,
        }
    }

    fn say(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())
            .map_err(|e| AssistError::io("writing to terminal", e))
    }

    /// Prompt and read one line; `None` on end of input.
    fn ask(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")
            .and_then(|_| self.output.flush())
            .map_err(|e| AssistError::io("writing to terminal", e))?;

        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .map_err(|e| AssistError::io("reading from terminal", e))?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Ask for role, description, difficulty and question count.
    ///
    /// Blank or unparseable answers fall back to defaults.
    pub fn configure(&mut self, default_questions: usize) -> Result<(JobProfile, usize)> {
        self.say("\n--- Interview Configuration ---")?;
        let role = self
            .ask("Enter the job role you are preparing for (e.g., Software Engineer): ")?
            .unwrap_or_default();
        let description = self
            .ask("Paste the job description (or a summary): ")?
            .unwrap_or_default();

        let difficulty = match self.ask("Enter desired difficulty (easy, medium, hard): ")? {
            Some(s) if !s.trim().is_empty() => match s.parse::<Difficulty>() {
                Ok(d) => d,
                Err(e) => {
                    self.say(format!("{e}; using medium."))?;
                    Difficulty::default()
                }
            },
            _ => Difficulty::default(),
        };

        let prompt = format!("How many questions would you like to answer? (default is {default_questions}): ");
        let count = match self.ask(&prompt)?.as_deref().map(str::trim) {
            None | Some("") => default_questions,
            Some(s) => match s.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    self.say(format!("'{s}' is not a positive number; using {default_questions}."))?;
                    default_questions
                }
            },
        };

        Ok((JobProfile::new(role.trim(), description.trim(), difficulty), count))
    }

    /// Ask every question, print feedback, then the overall analysis.
    ///
    /// End of input stops the questioning early; the analysis still runs
    /// over what was answered.
    pub async fn run(&mut self, profile: JobProfile, n: usize) -> Result<InterviewTranscript> {
        let service = self.service;
        let mut transcript = InterviewTranscript::new(profile);
        let profile = transcript.profile.clone();

        let questions = service.generate_questions(&profile, n).await?;
        self.say(format!("\n--- Starting Interview ({} questions) ---", questions.len()))?;

        let total = questions.len();
        for (i, question) in questions.into_iter().enumerate() {
            self.say(format!("\nQuestion {}/{total}: {question}", i + 1))?;
            let Some(response) = self.ask("Your answer: ")? else {
                self.say("\nInput closed; ending the interview early.")?;
                break;
            };

            let feedback = service.evaluate_response(&profile, &question, &response).await;
            self.say("\n--- Feedback ---")?;
            self.say(format!("Score: {}", feedback.score))?;
            self.say(format!("Strengths: {}", feedback.strengths))?;
            self.say(format!("Areas for Improvement: {}", feedback.areas_for_improvement))?;
            self.say(format!("Sample Answer Hint: {}", feedback.sample_answer))?;

            transcript.exchanges.push(Exchange {
                question,
                response,
                feedback,
            });

            if i + 1 < total && self.ask("\nPress Enter to continue to the next question...")?.is_none() {
                break;
            }
        }

        let analysis = service
            .generate_overall_performance(&profile, &transcript.exchanges)
            .await;
        self.print_analysis(&analysis)?;
        transcript.analysis = Some(analysis);
        transcript.finished_at = Some(Utc::now());

        info!(id = %transcript.id, answered = transcript.exchanges.len(), "Interview finished");
        self.say("\n--- Interview Finished ---")?;
        Ok(transcript)
    }

    fn print_analysis(&mut self, analysis: &OverallAnalysis) -> Result<()> {
        self.say("\n--- Overall Performance ---")?;
        self.say(format!("Average Score: {:.1}/10", analysis.average_score))?;
        self.say(&analysis.overall_analysis)?;
        for (title, items) in [
            ("Key Strengths", &analysis.key_strengths),
            ("Improvement Areas", &analysis.improvement_areas),
            ("Preparation Tips", &analysis.preparation_tips),
        ] {
            self.say(format!("\n{title}:"))?;
            for item in items {
                self.say(format!("  - {item}"))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{FixedJitter, LLMClient, RetryPolicy};
    use crate::models::{AnalysisStatus, InterviewSettings, Score};
    use serde_json::json;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn chat(content: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "content": content } }]
        }))
    }

    fn service(server: &MockServer) -> InterviewService {
        let policy = RetryPolicy {
            max_attempts: 1,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        };
        let client = LLMClient::new("sk-test", server.uri(), Duration::from_secs(5), policy)
            .unwrap()
            .with_jitter(Arc::new(FixedJitter(0.0)));
        InterviewService::new(Arc::new(client), InterviewSettings::default())
    }

    async fn mount_interview(server: &MockServer) {
        Mock::given(method("POST"))
            .and(body_string_contains("Generate 2 interview questions"))
            .respond_with(chat("1. What is ownership?\n2. What is borrowing?"))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("Interview Question:"))
            .respond_with(chat(
                r#"{"score": 6, "strengths": "Ok", "areas_for_improvement": "Examples", "sample_answer": "Move semantics..."}"#,
            ))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("overall analysis"))
            .respond_with(chat(
                r#"{"overall_analysis": "Keep going.", "key_strengths": ["Basics"], "improvement_areas": ["Depth"], "preparation_tips": ["Read the book"]}"#,
            ))
            .mount(server)
            .await;
    }

    #[test]
    fn configure_reads_answers_and_defaults() {
        let server_less = InterviewService::new(
            Arc::new(
                LLMClient::new("k", "http://localhost:1", Duration::from_secs(1), RetryPolicy::default())
                    .unwrap(),
            ),
            InterviewSettings::default(),
        );
        let input = Cursor::new("Rust Developer\nSystems work\nHARD\n\n");
        let mut out = Vec::new();
        let mut session = InterviewSession::new(&server_less, input, &mut out);

        let (profile, n) = session.configure(5).unwrap();
        assert_eq!(profile.job_role, "Rust Developer");
        assert_eq!(profile.job_description, "Systems work");
        assert_eq!(profile.difficulty, Difficulty::Hard);
        assert_eq!(n, 5);
    }

    #[test]
    fn configure_recovers_from_bad_values() {
        let svc = InterviewService::new(
            Arc::new(
                LLMClient::new("k", "http://localhost:1", Duration::from_secs(1), RetryPolicy::default())
                    .unwrap(),
            ),
            InterviewSettings::default(),
        );
        let input = Cursor::new("QA\n\nbrutal\n0\n");
        let mut out = Vec::new();
        let (profile, n) = InterviewSession::new(&svc, input, &mut out).configure(3).unwrap();

        assert_eq!(profile.difficulty, Difficulty::Medium);
        assert_eq!(n, 3);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("unknown difficulty 'brutal'"));
        assert!(printed.contains("'0' is not a positive number"));
    }

    #[tokio::test]
    async fn full_session_collects_transcript() {
        let server = MockServer::start().await;
        mount_interview(&server).await;
        let svc = service(&server);

        let input = Cursor::new("It is about who frees memory.\n\nReferences without moves.\n");
        let mut out = Vec::new();
        let profile = JobProfile::new("Rust Developer", "", Difficulty::Easy);
        let transcript = InterviewSession::new(&svc, input, &mut out)
            .run(profile, 2)
            .await
            .unwrap();

        assert_eq!(transcript.exchanges.len(), 2);
        assert_eq!(transcript.exchanges[0].question, "What is ownership?");
        assert_eq!(transcript.exchanges[1].response, "References without moves.");
        assert_eq!(transcript.exchanges[0].feedback.score, Score::Value(6));
        let analysis = transcript.analysis.as_ref().unwrap();
        assert_eq!(analysis.status, AnalysisStatus::Generated);
        assert_eq!(analysis.average_score, 6.0);
        assert!(transcript.finished_at.is_some());

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Question 1/2: What is ownership?"));
        assert!(printed.contains("Score: 6/10"));
        assert!(printed.contains("  - Read the book"));
    }

    #[tokio::test]
    async fn closed_input_ends_early_but_still_analyzes() {
        let server = MockServer::start().await;
        mount_interview(&server).await;
        let svc = service(&server);

        let mut out = Vec::new();
        let transcript = InterviewSession::new(&svc, Cursor::new(""), &mut out)
            .run(JobProfile::new("Rust Developer", "", Difficulty::Easy), 2)
            .await
            .unwrap();

        assert!(transcript.exchanges.is_empty());
        assert_eq!(transcript.analysis.unwrap().average_score, 0.0);
    }

    #[test]
    fn transcript_survives_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("session.json");
        let mut transcript = InterviewTranscript::new(JobProfile::new("SRE", "On-call", Difficulty::Hard));
        transcript.analysis = Some(OverallAnalysis::call_failed(0.0));

        transcript.save(&path).unwrap();
        let loaded = InterviewTranscript::load(&path).unwrap();
        assert_eq!(loaded.id, transcript.id);
        assert_eq!(loaded.profile, transcript.profile);
        assert_eq!(loaded.analysis.unwrap().status, AnalysisStatus::CallFailed);
    }
}
