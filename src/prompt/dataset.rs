//! Prompts for the synthetic dataset: topic questions, tiered answers and
//! gold answers.
//!
//! The answer and gold-answer templates are selected by an exhaustive
//! `match` on [`Quality`], so a sample's label always names the template
//! that produced it.

use crate::client::Message;
use crate::models::Quality;

/// One challenging technical question about `topic`.
pub fn build_topic_question_prompt(topic: &str) -> Vec<Message> {
    vec![Message::user(format!(
        "Generate a challenging interview question for a Software Development Engineer about {topic}.\n\
         The question should be technical and specific, testing deep knowledge.\n\
         Return only the question text without any explanations or introductions."
    ))]
}

/// Rubric text for the intended answer caliber.
pub fn quality_description(quality: Quality) -> &'static str {
    match quality {
        Quality::Excellent => {
            "comprehensive, accurate, well-structured, detailed, demonstrating deep understanding \
             with relevant examples and best practices"
        }
        Quality::Adequate => {
            "mostly correct but lacking depth, missing some important details or examples, \
             somewhat disorganized, shows basic understanding but not mastery"
        }
        Quality::Insufficient => {
            "incomplete, contains some inaccuracies or misconceptions, poorly structured, \
             superficial understanding, missing critical components"
        }
    }
}

/// How the simulated candidate should sound.
pub fn speech_pattern(quality: Quality) -> &'static str {
    match quality {
        Quality::Excellent => {
            "Include some natural speech patterns, occasional pauses (like 'um' or brief thinking), \
             realistic examples from work experience, and confident tone. The candidate might start \
             with phrases like 'That's a great question' or 'In my experience'. Include 1-2 specific \
             examples from hypothetical past work."
        }
        Quality::Adequate => {
            "Include some hesitation, self-corrections, and a mix of detailed and vague explanations. \
             The candidate might use phrases like 'I think', 'If I recall correctly', or 'Generally \
             speaking'. They might also make minor verbal detours before returning to the main point."
        }
        Quality::Insufficient => {
            "Include circular explanations and occasional contradictions. The candidate might try to \
             talk around concepts they don't fully understand, use vague terms, and might say 'to be \
             honest, I'm not entirely certain' or similar phrases indicating knowledge gaps."
        }
    }
}

/// A spoken-style candidate answer of the given caliber.
pub fn build_answer_prompt(question: &str, quality: Quality) -> Vec<Message> {
    vec![Message::user(format!(
        "For the following software engineering interview question:\n\n\
         \"{question}\"\n\n\
         Generate a {quality} answer as if given by a real human candidate in a live interview. \
         The answer should be {description}.\n\n\
         {speech}\n\n\
         Make the response sound conversational and spontaneous as if spoken rather than written. \
         Don't make it TOO polished.\n\n\
         Return only the answer without any introductions or explanations about its quality.",
        description = quality_description(quality),
        speech = speech_pattern(quality),
    ))]
}

/// Reference answer derived from the candidate answer.
///
/// Excellent answers are polished lightly, adequate ones enriched, and
/// insufficient ones rewritten. Both inputs are embedded verbatim.
pub fn build_gold_answer_prompt(question: &str, answer: &str, quality: Quality) -> Vec<Message> {
    let instructions = match quality {
        Quality::Excellent => {
            "Provide a slightly refined gold standard version of this answer that maintains the same \
             structure and content, but with minimal improvements to clarity and precision. Keep the \
             answer similarly excellent but with subtle enhancements. Maintain a professional tone but \
             make it slightly more polished than the original."
        }
        Quality::Adequate => {
            "Transform this into a gold standard excellent answer. Enhance it by:\n\
             1. Adding more technical depth and detailed explanations\n\
             2. Incorporating relevant examples and best practices\n\
             3. Improving the structure and flow\n\
             4. Filling in missing information\n\
             5. Maintaining the core ideas from the original answer\n\n\
             Make it comprehensive and technically precise while still being clear and concise."
        }
        Quality::Insufficient => {
            "Create a gold standard answer that:\n\
             1. Corrects any misconceptions or inaccuracies in the original\n\
             2. Develops the same core topic areas but with proper technical depth\n\
             3. Provides clarity where the original was vague\n\
             4. Adds necessary details, examples, and best practices\n\
             5. Maintains the same general approach but with substantially improved quality\n\n\
             Transform the answer into a comprehensive, well-structured response that would be \
             considered excellent."
        }
    };

    vec![Message::user(format!(
        "For the following software engineering interview question:\n\n\
         \"{question}\"\n\n\
         Given this {quality} answer from a candidate:\n\n\
         \"{answer}\"\n\n\
         {instructions}\n\n\
         Return only the gold standard answer without any explanations."
    ))]
}
