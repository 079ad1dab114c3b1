//! Shared set of questions already asked.

use dashmap::DashSet;

/// Concurrent set of normalized questions.
///
/// Workers call [`contains`](Self::contains) when a question comes back
/// and [`insert`](Self::insert) once it is accepted. The two calls are not
/// atomic together, so two workers receiving the same question at the same
/// moment can both accept it. Dedup is best-effort: a rare duplicate row is
/// tolerated.
#[derive(Debug, Default)]
pub struct AskedQuestionSet {
    questions: DashSet<String>,
}

impl AskedQuestionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trimmed, lower-cased form used for comparison.
    pub fn normalize(question: &str) -> String {
        question.trim().to_lowercase()
    }

    pub fn contains(&self, question: &str) -> bool {
        self.questions.contains(&Self::normalize(question))
    }

    /// Returns `false` if the question was already present.
    pub fn insert(&self, question: &str) -> bool {
        self.questions.insert(Self::normalize(question))
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for AskedQuestionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let set = Self::new();
        for q in iter {
            set.insert(q.as_ref());
        }
        set
    }
}
