//! Prompts for the interactive interview: questions, feedback, analysis.

use crate::client::Message;
use crate::models::{Exchange, JobProfile};
use std::fmt::Write;

const FEEDBACK_SYSTEM: &str = "You are an expert interviewer providing feedback on a candidate's answer. \
Evaluate the response based on clarity, relevance, completeness, and conciseness. \
Provide specific strengths and areas for improvement. \
Suggest a concise sample answer that would be considered strong for the given role. \
Return your feedback strictly in JSON format with keys: \
'score' (integer 1-10), 'strengths' (string), 'areas_for_improvement' (string), 'sample_answer' (string).";

const ANALYSIS_SYSTEM: &str = "You are an expert career coach reviewing a complete mock interview. \
Assess the candidate's overall performance across all answers, identify recurring strengths and weaknesses, \
and give concrete advice for preparing for the real interview. \
Return your analysis strictly in JSON format with keys: \
'overall_analysis' (string), 'key_strengths' (list of strings), \
'improvement_areas' (list of strings), 'preparation_tips' (list of strings).";

/// Single user message asking for `n` newline-separated questions.
pub fn build_question_prompt(profile: &JobProfile, n: usize) -> Vec<Message> {
    let content = format!(
        "You are an expert interviewer. Generate {n} interview questions \
         for a candidate applying for the role of '{role}'. \
         The desired difficulty level is '{difficulty}'. \
         The job description is: '{description}'. \
         Focus on questions relevant to this role and difficulty. \
         Ensure each question is distinct and on a new line, without any introductory \
         or concluding text, just the questions.",
        role = profile.role_or_default(),
        difficulty = profile.difficulty,
        description = profile.description_or_default(),
    );
    vec![Message::user(content)]
}

/// System + user pair asking for a strict-JSON evaluation of one answer.
pub fn build_feedback_prompt(question: &str, response: &str, job_role: &str) -> Vec<Message> {
    let role = match job_role.trim() {
        "" => "Not specified",
        r => r,
    };
    let user = format!(
        "Interview Question: '{question}'\n\
         Candidate's Role: {role}\n\
         Candidate's Response: '{response}'\n\n\
         Please provide your evaluation in the specified JSON format."
    );
    vec![Message::system(FEEDBACK_SYSTEM), Message::user(user)]
}

/// System + user pair asking for a strict-JSON session summary.
pub fn build_overall_analysis_prompt(profile: &JobProfile, transcript: &[Exchange]) -> Vec<Message> {
    let mut user = format!(
        "Candidate's Role: {}\nDifficulty: {}\nJob Description: {}\n\n",
        profile.role_or_default(),
        profile.difficulty,
        profile.description_or_default(),
    );

    if transcript.is_empty() {
        user.push_str("The candidate did not answer any questions.\n");
    }
    for (i, exchange) in transcript.iter().enumerate() {
        let fb = &exchange.feedback;
        // Writing to a String cannot fail.
        let _ = write!(
            user,
            "Question {n}: {q}\nResponse: {r}\nScore: {s}\nStrengths: {st}\nAreas for Improvement: {a}\n\n",
            n = i + 1,
            q = exchange.question,
            r = exchange.response,
            s = fb.score,
            st = fb.strengths,
            a = fb.areas_for_improvement,
        );
    }
    user.push_str("Please provide your overall analysis in the specified JSON format.");

    vec![Message::system(ANALYSIS_SYSTEM), Message::user(user)]
}
