//! Desk error types.

use super::types::RequestStatus;
use crate::persist::PersistError;

/// Errors reported by help desk operations.
#[derive(thiserror::Error, Debug)]
pub enum DeskError {
    /// A required field is missing or empty.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No request exists with the given id.
    #[error("Request not found: {0}")]
    NotFound(String),

    /// The request is not pending.
    #[error("Request {id} already handled (status: {status})")]
    Conflict { id: String, status: RequestStatus },

    /// The state could not be persisted; nothing was changed.
    #[error("Storage error: {0}")]
    Storage(#[from] PersistError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_display() {
        let err = DeskError::Conflict {
            id: "abc".to_string(),
            status: RequestStatus::Resolved,
        };
        assert_eq!(err.to_string(), "Request abc already handled (status: resolved)");
    }

    #[test]
    fn test_not_found_display() {
        let err = DeskError::NotFound("missing".to_string());
        assert_eq!(err.to_string(), "Request not found: missing");
    }

    #[test]
    fn test_storage_from_persist_error() {
        let err: DeskError = PersistError::Unavailable.into();
        assert!(matches!(err, DeskError::Storage(_)));
        assert!(err.to_string().starts_with("Storage error"));
    }
}
