//! Help request and knowledge item types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a help request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// Waiting for a supervisor answer.
    #[default]
    Pending,
    /// Answered by a supervisor.
    Resolved,
    /// Timed out or manually given up on.
    Unresolved,
}

impl RequestStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [Self; 3] = [Self::Pending, Self::Resolved, Self::Unresolved];

    /// Wire name of the status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Unresolved => "unresolved",
        }
    }

    /// Whether no further transitions are allowed.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Parse a status filter, ignoring values that are not a known status.
    #[must_use]
    pub fn parse_filter(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| v.parse().ok())
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a known request status.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown request status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for RequestStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A caller's question and its journey through the desk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpRequest {
    /// Unique identifier, assigned at creation.
    pub id: String,
    /// Originator of the question.
    pub caller_id: String,
    /// The question text.
    pub question: String,
    /// Current lifecycle state.
    pub status: RequestStatus,
    /// When the request was created.
    pub created_at: DateTime<Utc>,
    /// When the request reached a terminal state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<DateTime<Utc>>,
    /// Supervisor answer, present only once resolved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
}

impl HelpRequest {
    /// Create a new pending request with a fresh id.
    #[must_use]
    pub fn new(caller_id: impl Into<String>, question: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            caller_id: caller_id.into(),
            question: question.into(),
            status: RequestStatus::Pending,
            created_at: now,
            resolved_at: None,
            answer: None,
        }
    }

    /// Check if the request is still waiting for an answer.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }
}

/// A memorized question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeItem {
    /// Unique identifier.
    pub id: String,
    /// The question that produced this answer.
    pub question: String,
    /// The supervisor's answer.
    pub answer: String,
    /// When the answer was memorized.
    pub created_at: DateTime<Utc>,
}

impl KnowledgeItem {
    /// Create a new knowledge item with a fresh id.
    #[must_use]
    pub fn new(question: impl Into<String>, answer: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            question: question.into(),
            answer: answer.into(),
            created_at: now,
        }
    }
}

/// Short-circuit reply when a question is answered from knowledge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandledAnswer {
    /// Always `true`.
    pub handled: bool,
    /// The memorized answer.
    pub answer: String,
}

impl HandledAnswer {
    #[must_use]
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            handled: true,
            answer: answer.into(),
        }
    }
}

/// Result of submitting a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreateOutcome {
    /// Answered from knowledge, no request was created.
    Handled(HandledAnswer),
    /// Escalated as a new pending request.
    Created(HelpRequest),
}

/// Full persisted state: both named collections, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeskSnapshot {
    #[serde(default)]
    pub requests: Vec<HelpRequest>,
    #[serde(default)]
    pub knowledge: Vec<KnowledgeItem>,
}
