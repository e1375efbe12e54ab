//! In-memory collection of help requests.

use chrono::{DateTime, Utc};

use super::error::DeskError;
use super::types::{HelpRequest, RequestStatus};

/// Require a non-empty field value. Whitespace counts as content.
pub(crate) fn require_text(field: &str, value: &str) -> Result<(), DeskError> {
    if value.is_empty() {
        return Err(DeskError::InvalidInput(format!("{field} required")));
    }
    Ok(())
}

/// Help requests, most recently created first. Requests are never removed.
#[derive(Debug, Clone, Default)]
pub struct RequestStore {
    requests: Vec<HelpRequest>,
}

impl RequestStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from requests already ordered newest first.
    #[must_use]
    pub fn from_requests(requests: Vec<HelpRequest>) -> Self {
        Self { requests }
    }

    /// Create and store a new pending request.
    ///
    /// # Errors
    ///
    /// Returns `DeskError::InvalidInput` if `caller_id` or `question` is empty.
    pub fn create(
        &mut self,
        caller_id: &str,
        question: &str,
        now: DateTime<Utc>,
    ) -> Result<HelpRequest, DeskError> {
        require_text("callerId", caller_id)?;
        require_text("question", question)?;

        let request = HelpRequest::new(caller_id, question, now);
        self.requests.insert(0, request.clone());
        Ok(request)
    }

    /// List requests newest first, optionally restricted to one status.
    #[must_use]
    pub fn list(&self, status: Option<RequestStatus>) -> Vec<HelpRequest> {
        self.requests
            .iter()
            .filter(|r| status.map_or(true, |s| r.status == s))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&HelpRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut HelpRequest> {
        self.requests.iter_mut().find(|r| r.id == id)
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut HelpRequest> {
        self.requests.iter_mut()
    }

    /// All requests, newest first.
    #[must_use]
    pub fn as_slice(&self) -> &[HelpRequest] {
        &self.requests
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}
