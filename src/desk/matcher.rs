//! Knowledge matching for automatic answers.
//!
//! Matching is bidirectional substring containment over trimmed, lowercased
//! questions. Short stored questions such as "hi" will match almost anything;
//! this loose behavior is kept on purpose.

use super::types::KnowledgeItem;

/// Normalize a question for matching.
#[must_use]
pub fn normalize(question: &str) -> String {
    question.trim().to_lowercase()
}

/// Check whether two normalized questions match in either direction.
#[must_use]
pub fn questions_match(stored: &str, incoming: &str) -> bool {
    incoming.contains(stored) || stored.contains(incoming)
}

/// Memorized question/answer pairs, most recently added first.
#[derive(Debug, Clone, Default)]
pub struct KnowledgeMatcher {
    items: Vec<KnowledgeItem>,
}

impl KnowledgeMatcher {
    /// Create an empty matcher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a matcher from items already ordered newest first.
    #[must_use]
    pub fn from_items(items: Vec<KnowledgeItem>) -> Self {
        Self { items }
    }

    /// Find the answer of the newest item matching `question`.
    #[must_use]
    pub fn lookup(&self, question: &str) -> Option<&str> {
        let incoming = normalize(question);
        self.items
            .iter()
            .find(|item| questions_match(&normalize(&item.question), &incoming))
            .map(|item| item.answer.as_str())
    }

    /// Memorize an item ahead of all older ones.
    pub fn insert(&mut self, item: KnowledgeItem) {
        tracing::debug!(question = %item.question, "Memorized answer");
        self.items.insert(0, item);
    }

    /// All items, newest first.
    #[must_use]
    pub fn items(&self) -> &[KnowledgeItem] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
