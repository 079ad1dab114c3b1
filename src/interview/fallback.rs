//! Canned questions used when generation yields nothing.

use crate::models::JobProfile;

/// Exactly `n` fallback questions for `profile`.
///
/// Software-engineer roles get a technical list, everyone else a generic
/// one. Lists shorter than `n` are cycled.
pub fn fallback_questions(profile: &JobProfile, n: usize) -> Vec<String> {
    let role = profile.role_or_default();
    let base: Vec<String> = if role.eq_ignore_ascii_case("software engineer") {
        vec![
            "Tell me about a challenging project you worked on.".to_string(),
            "How do you handle disagreements within your team?".to_string(),
            "Explain a complex technical concept to a non-technical person.".to_string(),
            "Describe your experience with the main technologies listed in the job description."
                .to_string(),
            format!("What are your strengths and weaknesses as a {role}?"),
        ]
    } else {
        vec![
            format!("What interests you about the {role} role?"),
            "Describe a time you had to learn something new quickly.".to_string(),
            "How do you prioritize your tasks when working on multiple projects?".to_string(),
            "Where do you see yourself in 5 years?".to_string(),
            "Why should we hire you for this position?".to_string(),
        ]
    };

    base.into_iter().cycle().take(n).collect()
}
