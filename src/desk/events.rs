//! Lifecycle events broadcast to live subscribers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{HelpRequest, KnowledgeItem};

/// Default capacity for the event broadcast channel.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

pub const REQUEST_CREATED: &str = "request_created";
pub const REQUEST_RESOLVED: &str = "request_resolved";
pub const REQUEST_UNRESOLVED: &str = "request_unresolved";
pub const KNOWLEDGE_ADDED: &str = "knowledge_added";

/// A committed change to the desk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeskEvent {
    /// Type of event (e.g., `request_created`, `knowledge_added`).
    pub event_type: String,
    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,
    /// The affected entity.
    pub data: serde_json::Value,
}

impl DeskEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp: Utc::now(),
            data,
        }
    }

    /// Event carrying a help request.
    #[must_use]
    pub fn request(event_type: &str, request: &HelpRequest) -> Self {
        Self::new(event_type, serde_json::to_value(request).unwrap_or_default())
    }

    /// Event carrying a newly memorized answer.
    #[must_use]
    pub fn knowledge(item: &KnowledgeItem) -> Self {
        Self::new(KNOWLEDGE_ADDED, serde_json::to_value(item).unwrap_or_default())
    }
}
