//! Feedback and overall-analysis parsing.
//!
//! Model text is decoded as strict JSON. Nothing here returns an error:
//! a failed call, undecodable text, or a missing key each degrade to the
//! matching placeholder, and decode failures are logged.

use crate::client::CompletionResult;
use crate::models::{
    AnalysisStatus, FeedbackRecord, OverallAnalysis, Score, Unavailable, ANALYSIS_PARSE_ERROR,
};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::LazyLock;
use tracing::warn;

// "8", "8/10", "8 / 10", "8 out of 10"
static SCORE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2})(?:\s*(?:/|out of)\s*10)?$")
        .unwrap_or_else(|e| panic!("invalid score regex: {e}"))
});

/// Turn an evaluation completion into a fully populated record.
pub fn parse_feedback(result: &CompletionResult) -> FeedbackRecord {
    parse_feedback_text(result.text())
}

/// Text-level form of [`parse_feedback`]; `None` means the call failed.
pub fn parse_feedback_text(text: Option<&str>) -> FeedbackRecord {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return FeedbackRecord::call_failed();
    };
    let Some(object) = decode_object(text, "feedback") else {
        return FeedbackRecord::parsing_error();
    };

    FeedbackRecord {
        score: object.get("score").map_or(
            Score::Unavailable(Unavailable::GenAiError),
            score_from_value,
        ),
        strengths: text_field(&object, "strengths"),
        areas_for_improvement: text_field(&object, "areas_for_improvement"),
        sample_answer: text_field(&object, "sample_answer"),
    }
}

/// Turn an analysis completion into a fully populated summary.
///
/// `average_score` is computed by the caller from local scores; the model
/// never supplies it.
pub fn parse_overall_analysis(result: &CompletionResult, average_score: f64) -> OverallAnalysis {
    let Some(text) = result.text().filter(|t| !t.trim().is_empty()) else {
        return OverallAnalysis::call_failed(average_score);
    };
    let Some(object) = decode_object(text, "overall analysis") else {
        return OverallAnalysis::parsing_error(text, average_score);
    };

    OverallAnalysis {
        overall_analysis: text_field(&object, "overall_analysis"),
        key_strengths: list_field(&object, "key_strengths"),
        improvement_areas: list_field(&object, "improvement_areas"),
        preparation_tips: list_field(&object, "preparation_tips"),
        average_score,
        status: AnalysisStatus::Generated,
    }
}

/// Mean of the numeric scores; sentinels are skipped, not counted as zero.
pub fn average_score(records: &[FeedbackRecord]) -> f64 {
    let scores: Vec<f64> = records
        .iter()
        .filter_map(|r| r.score.value())
        .map(f64::from)
        .collect();
    if scores.is_empty() {
        return 0.0;
    }
    scores.iter().sum::<f64>() / scores.len() as f64
}

fn decode_object(text: &str, what: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(Value::Object(map)) => Some(map),
        Ok(other) => {
            warn!(kind = what, json_type = json_type(&other), "Model returned JSON that is not an object");
            None
        }
        Err(e) => {
            warn!(kind = what, error = %e, received = %snippet(text), "Could not decode model JSON");
            None
        }
    }
}

fn score_from_value(value: &Value) -> Score {
    let n = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => SCORE_TEXT_RE
            .captures(s.trim())
            .and_then(|caps| caps[1].parse::<i64>().ok()),
        _ => None,
    };
    n.and_then(Score::new)
        .unwrap_or(Score::Unavailable(Unavailable::GenAiError))
}

fn text_field(object: &Map<String, Value>, key: &str) -> String {
    match object.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => Unavailable::GenAiError.sentinel().to_string(),
        Some(other) => other.to_string(),
    }
}

fn list_field(object: &Map<String, Value>, key: &str) -> Vec<String> {
    match object.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Null) | None => vec![Unavailable::GenAiError.sentinel().to_string()],
        Some(other) => vec![other.to_string()],
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn snippet(text: &str) -> String {
    const MAX: usize = 200;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::FailureReason;
    use crate::models::ANALYSIS_CALL_FAILED;
    use serde_json::json;

    fn ok(text: &str) -> CompletionResult {
        CompletionResult::Ok(text.to_string())
    }

    fn failed() -> CompletionResult {
        CompletionResult::Failed(FailureReason::Exhausted {
            attempts: 5,
            last: Box::new(FailureReason::HttpError(503)),
        })
    }

    #[test]
    fn complete_feedback_round_trips() {
        let record = FeedbackRecord {
            score: Score::Value(8),
            strengths: "Clear structure".into(),
            areas_for_improvement: "Mention trade-offs".into(),
            sample_answer: "CAP says...".into(),
        };
        let text = serde_json::to_string(&record).unwrap();
        assert_eq!(parse_feedback(&ok(&text)), record);
    }

    #[test]
    fn decoded_fields_are_taken_verbatim() {
        let text = json!({
            "score": 6,
            "strengths": "  spaced  ",
            "areas_for_improvement": "More depth",
            "sample_answer": "Line one\nLine two"
        })
        .to_string();
        let record = parse_feedback(&ok(&text));
        assert_eq!(record.score, Score::Value(6));
        assert_eq!(record.strengths, "  spaced  ");
        assert_eq!(record.sample_answer, "Line one\nLine two");
    }

    #[test]
    fn invalid_json_gives_parsing_placeholders() {
        for text in ["Invalid JSON output", "```json\n{}\n```", "[1, 2]", "\"just a string\""] {
            let record = parse_feedback(&ok(text));
            assert_eq!(record, FeedbackRecord::parsing_error(), "input: {text}");
            assert_eq!(record.score.to_string(), "N/A (GenAI parsing error)");
        }
    }

    #[test]
    fn failed_call_gives_call_placeholders() {
        let record = parse_feedback(&failed());
        assert_eq!(record, FeedbackRecord::call_failed());
        assert!(record.strengths.contains("Failed to get feedback"));
        assert_eq!(parse_feedback_text(Some("   ")), FeedbackRecord::call_failed());
    }

    #[test]
    fn missing_keys_get_genai_error_sentinel() {
        let record = parse_feedback(&ok(r#"{"score": 9, "strengths": "Concise"}"#));
        assert_eq!(record.score, Score::Value(9));
        assert_eq!(record.strengths, "Concise");
        assert_eq!(record.areas_for_improvement, "N/A (GenAI error)");
        assert_eq!(record.sample_answer, "N/A (GenAI error)");
    }

    #[test]
    fn unusable_scores_become_genai_error() {
        for score in [json!(0), json!(11), json!(7.5), json!("great"), json!(null), json!([8])] {
            let text = json!({ "score": score }).to_string();
            assert_eq!(
                parse_feedback(&ok(&text)).score,
                Score::Unavailable(Unavailable::GenAiError),
                "score: {score}"
            );
        }
        assert_eq!(parse_feedback(&ok(r#"{"score": "7"}"#)).score, Score::Value(7));
        assert_eq!(parse_feedback(&ok(r#"{"score": 7.0}"#)).score, Score::Value(7));
    }

    #[test]
    fn out_of_ten_score_strings_are_numeric() {
        for (raw, expected) in [("8/10", 8), (" 6 / 10 ", 6), ("9 out of 10", 9), ("10/10", 10)] {
            let text = json!({ "score": raw }).to_string();
            assert_eq!(parse_feedback(&ok(&text)).score, Score::Value(expected), "score: {raw}");
        }
        for raw in ["12/10", "8/100", "about 8", "7.5"] {
            let text = json!({ "score": raw }).to_string();
            assert_eq!(
                parse_feedback(&ok(&text)).score,
                Score::Unavailable(Unavailable::GenAiError),
                "score: {raw}"
            );
        }
    }

    #[test]
    fn feedback_parsing_is_idempotent() {
        for text in [r#"{"score": 4}"#, "nope", ""] {
            assert_eq!(parse_feedback_text(Some(text)), parse_feedback_text(Some(text)));
        }
    }

    #[test]
    fn average_skips_sentinels() {
        let mut a = FeedbackRecord::call_failed();
        a.score = Score::Value(8);
        let mut b = FeedbackRecord::call_failed();
        b.score = Score::Value(7);
        let c = FeedbackRecord::call_failed();
        assert_eq!(average_score(&[a, b, c]), 7.5);
    }

    #[test]
    fn average_of_nothing_numeric_is_zero() {
        assert_eq!(average_score(&[]), 0.0);
        assert_eq!(average_score(&[FeedbackRecord::parsing_error()]), 0.0);
    }

    #[test]
    fn analysis_success_uses_local_average() {
        let text = json!({
            "overall_analysis": "Good performance.",
            "key_strengths": ["Clarity"],
            "improvement_areas": ["Depth"],
            "preparation_tips": ["Practice more."],
            "average_score": 2.0
        })
        .to_string();
        let analysis = parse_overall_analysis(&ok(&text), 7.0);
        assert_eq!(analysis.overall_analysis, "Good performance.");
        assert_eq!(analysis.key_strengths, vec!["Clarity"]);
        assert_eq!(analysis.preparation_tips, vec!["Practice more."]);
        assert_eq!(analysis.average_score, 7.0);
        assert_eq!(analysis.status, AnalysisStatus::Generated);
    }

    #[test]
    fn analysis_call_failure_and_parse_failure() {
        let failed = parse_overall_analysis(&failed(), 0.0);
        assert_eq!(failed.overall_analysis, ANALYSIS_CALL_FAILED);
        assert_eq!(failed.average_score, 0.0);

        let unparsed = parse_overall_analysis(&ok("Not a JSON"), 0.0);
        assert_eq!(unparsed.overall_analysis, "Not a JSON");
        assert!(unparsed.key_strengths.contains(&ANALYSIS_PARSE_ERROR.to_string()));
        assert_eq!(unparsed.status, AnalysisStatus::ParsingError);
    }

    #[test]
    fn analysis_missing_and_odd_shaped_fields() {
        let text = json!({
            "overall_analysis": "Default",
            "key_strengths": [],
            "improvement_areas": "Only one",
        })
        .to_string();
        let analysis = parse_overall_analysis(&ok(&text), 0.0);
        assert_eq!(analysis.overall_analysis, "Default");
        assert!(analysis.key_strengths.is_empty());
        assert_eq!(analysis.improvement_areas, vec!["Only one"]);
        assert_eq!(analysis.preparation_tips, vec!["N/A (GenAI error)"]);
    }

    #[test]
    fn long_text_snippet_is_truncated_on_char_boundary() {
        let text = "é".repeat(300);
        let s = snippet(&text);
        assert!(s.ends_with("..."));
        assert_eq!(s.chars().count(), 203);
    }
}
