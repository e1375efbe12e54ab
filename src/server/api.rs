//! Request and response bodies for the HTTP API.

use serde::{Deserialize, Serialize};

use crate::desk::RequestStatus;

/// Body for POST /api/requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateRequestBody {
    pub caller_id: String,
    pub question: String,
}

/// Body for POST /api/requests/:id/answer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerBody {
    pub answer: String,
}

/// Query parameters for GET /api/requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    /// Status filter; unknown values mean no filtering.
    #[serde(default)]
    pub status: Option<String>,
}

impl ListQuery {
    /// The recognized status filter, if any.
    #[must_use]
    pub fn status_filter(&self) -> Option<RequestStatus> {
        RequestStatus::parse_filter(self.status.as_deref())
    }
}

/// Error body for all failed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Response for GET /health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_body_camel_case() {
        let body: CreateRequestBody =
            serde_json::from_str(r#"{"callerId":"+1555","question":"Hours?"}"#).unwrap();
        assert_eq!(body.caller_id, "+1555");
        assert_eq!(body.question, "Hours?");
    }

    #[test]
    fn test_create_body_missing_fields_default_empty() {
        let body: CreateRequestBody = serde_json::from_str("{}").unwrap();
        assert!(body.caller_id.is_empty());
        assert!(body.question.is_empty());
    }

    #[test]
    fn test_list_query_filter() {
        let query = ListQuery {
            status: Some("resolved".to_string()),
        };
        assert_eq!(query.status_filter(), Some(RequestStatus::Resolved));

        let query = ListQuery {
            status: Some("everything".to_string()),
        };
        assert_eq!(query.status_filter(), None);
        assert_eq!(ListQuery::default().status_filter(), None);
    }

    #[test]
    fn test_error_response_shape() {
        let json = serde_json::to_string(&ErrorResponse::new("not found")).unwrap();
        assert_eq!(json, r#"{"error":"not found"}"#);
    }
}
