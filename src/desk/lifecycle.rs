//! Request lifecycle state machine.
//!
//! `Pending` is the only non-terminal state. Every transition checks and sets
//! the status in one step on exclusively borrowed state, so a request can
//! leave `Pending` at most once.

use chrono::{DateTime, TimeDelta, Utc};

use super::error::DeskError;
use super::matcher::KnowledgeMatcher;
use super::requests::{require_text, RequestStore};
use super::types::{DeskSnapshot, HelpRequest, KnowledgeItem, RequestStatus};

/// A successful answer: the resolved request and the memorized item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub request: HelpRequest,
    pub knowledge: KnowledgeItem,
}

/// Both collections owned by the desk.
#[derive(Debug, Clone, Default)]
pub struct DeskState {
    pub requests: RequestStore,
    pub knowledge: KnowledgeMatcher,
}

impl DeskState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild state from a persisted snapshot.
    #[must_use]
    pub fn from_snapshot(snapshot: DeskSnapshot) -> Self {
        Self {
            requests: RequestStore::from_requests(snapshot.requests),
            knowledge: KnowledgeMatcher::from_items(snapshot.knowledge),
        }
    }

    /// Copy both collections into a snapshot for persistence.
    #[must_use]
    pub fn snapshot(&self) -> DeskSnapshot {
        DeskSnapshot {
            requests: self.requests.as_slice().to_vec(),
            knowledge: self.knowledge.items().to_vec(),
        }
    }

    /// Resolve a pending request and memorize its answer.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `answer` is empty (checked first, nothing is looked up).
    /// - `NotFound` if no request has `id`.
    /// - `Conflict` if the request is not pending.
    pub fn answer(
        &mut self,
        id: &str,
        answer: &str,
        now: DateTime<Utc>,
    ) -> Result<Resolution, DeskError> {
        require_text("answer", answer)?;
        let request = pending_mut(&mut self.requests, id)?;

        request.status = RequestStatus::Resolved;
        request.answer = Some(answer.to_string());
        request.resolved_at = Some(now);
        let request = request.clone();

        let knowledge = KnowledgeItem::new(request.question.clone(), answer, now);
        self.knowledge.insert(knowledge.clone());

        tracing::debug!(id = %request.id, "Request resolved");
        Ok(Resolution { request, knowledge })
    }

    /// Give up on a pending request without memorizing anything.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no request has `id`.
    /// - `Conflict` if the request is not pending.
    pub fn mark_unresolved(&mut self, id: &str, now: DateTime<Utc>) -> Result<HelpRequest, DeskError> {
        let request = pending_mut(&mut self.requests, id)?;
        give_up(request, now);
        Ok(request.clone())
    }

    /// Mark every pending request older than `timeout` as unresolved.
    ///
    /// Returns the requests that changed. Terminal requests are never touched.
    pub fn expire_pending(&mut self, now: DateTime<Utc>, timeout: TimeDelta) -> Vec<HelpRequest> {
        self.requests
            .iter_mut()
            .filter(|r| r.is_pending() && now - r.created_at > timeout)
            .map(|r| {
                give_up(r, now);
                r.clone()
            })
            .collect()
    }
}

fn pending_mut<'a>(
    requests: &'a mut RequestStore,
    id: &str,
) -> Result<&'a mut HelpRequest, DeskError> {
    let request = requests
        .get_mut(id)
        .ok_or_else(|| DeskError::NotFound(id.to_string()))?;
    if request.status.is_terminal() {
        return Err(DeskError::Conflict {
            id: id.to_string(),
            status: request.status,
        });
    }
    Ok(request)
}

fn give_up(request: &mut HelpRequest, now: DateTime<Utc>) {
    request.status = RequestStatus::Unresolved;
    request.resolved_at = Some(now);
    tracing::debug!(id = %request.id, "Request unresolved");
}
