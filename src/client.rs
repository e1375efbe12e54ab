//! HTTP client for the desk API and the caller-agent flow.

use std::time::Duration;

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::desk::{CreateOutcome, HelpRequest, KnowledgeItem, RequestStatus};
use crate::server::{AnswerBody, CreateRequestBody, ErrorResponse, HealthResponse};

/// Default server URL used by the CLI.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001";

/// What the agent tells a caller while a supervisor is consulted.
pub const CALLER_HOLD_MESSAGE: &str = "Let me check with my supervisor and get back to you.";

/// Errors from talking to the desk server.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// Server URL could not be parsed.
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Server URL cannot carry a path.
    #[error("Server URL cannot be a base: {0}")]
    NotABase(String),

    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status.
    #[error("Server returned {status}: {message}")]
    Api { status: StatusCode, message: String },

    /// Request stayed pending past the wait deadline.
    #[error("Request {0} still pending")]
    StillPending(String),
}

impl ClientError {
    /// HTTP status of an API error, if this is one.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result of a simulated call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum CallOutcome {
    /// The caller got an answer straight away.
    Answered { answer: String },
    /// A supervisor was asked; the caller is on hold.
    Escalated {
        #[serde(rename = "requestId")]
        request_id: String,
    },
}

/// Client for the desk HTTP API.
#[derive(Debug, Clone)]
pub struct DeskClient {
    http: reqwest::Client,
    base: Url,
}

impl DeskClient {
    /// Create a client for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a usable URL.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(ClientError::NotABase(base_url.to_string()));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build an endpoint URL from path segments, percent-encoding each one.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::NotABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check that the server is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the server cannot be reached.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let response = self.http.get(self.endpoint(&["health"])?).send().await?;
        let health: HealthResponse = decode(response).await?;
        Ok(health.ok)
    }

    /// Submit a caller's question.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status.
    pub async fn create_request(
        &self,
        caller_id: &str,
        question: &str,
    ) -> Result<CreateOutcome, ClientError> {
        let body = CreateRequestBody {
            caller_id: caller_id.to_string(),
            question: question.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint(&["api", "requests"])?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// List requests, optionally by status.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status.
    pub async fn list_requests(
        &self,
        status: Option<RequestStatus>,
    ) -> Result<Vec<HelpRequest>, ClientError> {
        let mut request = self.http.get(self.endpoint(&["api", "requests"])?);
        if let Some(status) = status {
            request = request.query(&[("status", status.as_str())]);
        }
        decode(request.send().await?).await
    }

    /// Fetch a single request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status (404 if unknown).
    pub async fn get_request(&self, id: &str) -> Result<HelpRequest, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "requests", id])?)
            .send()
            .await?;
        decode(response).await
    }

    /// Answer a pending request as supervisor.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status.
    pub async fn answer_request(&self, id: &str, answer: &str) -> Result<HelpRequest, ClientError> {
        let body = AnswerBody {
            answer: answer.to_string(),
        };
        let response = self
            .http
            .post(self.endpoint(&["api", "requests", id, "answer"])?)
            .json(&body)
            .send()
            .await?;
        decode(response).await
    }

    /// Give up on a pending request.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status.
    pub async fn mark_unresolved(&self, id: &str) -> Result<HelpRequest, ClientError> {
        let response = self
            .http
            .post(self.endpoint(&["api", "requests", id, "unresolved"])?)
            .send()
            .await?;
        decode(response).await
    }

    /// List memorized answers.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an error status.
    pub async fn list_knowledge(&self) -> Result<Vec<KnowledgeItem>, ClientError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "knowledge"])?)
            .send()
            .await?;
        decode(response).await
    }

    /// Handle an incoming call: answer from knowledge or escalate.
    ///
    /// # Errors
    ///
    /// Returns an error if the server rejects the question or cannot be reached.
    pub async fn simulate_call(
        &self,
        caller_id: &str,
        question: &str,
    ) -> Result<CallOutcome, ClientError> {
        match self.create_request(caller_id, question).await? {
            CreateOutcome::Handled(handled) => {
                tracing::info!(caller_id, answer = %handled.answer, "Answered caller");
                Ok(CallOutcome::Answered {
                    answer: handled.answer,
                })
            }
            CreateOutcome::Created(request) => {
                tracing::info!(caller_id, request_id = %request.id, "{}", CALLER_HOLD_MESSAGE);
                Ok(CallOutcome::Escalated {
                    request_id: request.id,
                })
            }
        }
    }

    /// Poll a request until it leaves `Pending` or `deadline` passes.
    ///
    /// # Errors
    ///
    /// Returns `StillPending` when the deadline passes, or any fetch error.
    pub async fn wait_for_resolution(
        &self,
        id: &str,
        poll: Duration,
        deadline: Duration,
    ) -> Result<HelpRequest, ClientError> {
        let started = tokio::time::Instant::now();
        loop {
            let request = self.get_request(id).await?;
            if !request.is_pending() {
                return Ok(request);
            }
            if started.elapsed() >= deadline {
                return Err(ClientError::StillPending(id.to_string()));
            }
            tokio::time::sleep(poll).await;
        }
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorResponse>(&text)
        .map(|e| e.error)
        .unwrap_or(text);
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_building() {
        let client = DeskClient::new("http://localhost:3001").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:3001/");
        let url = client.endpoint(&["api", "requests", "abc", "answer"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3001/api/requests/abc/answer");
    }

    #[test]
    fn test_endpoint_keeps_base_path_and_encodes() {
        let client = DeskClient::new("http://desk.local/frontdesk/").unwrap();
        let url = client.endpoint(&["api", "requests", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://desk.local/frontdesk/api/requests/a%2Fb");
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            DeskClient::new("not a url"),
            Err(ClientError::InvalidUrl(_))
        ));
        assert!(matches!(
            DeskClient::new("mailto:desk@example.com"),
            Err(ClientError::NotABase(_))
        ));
    }

    #[test]
    fn test_call_outcome_shape() {
        let escalated = CallOutcome::Escalated {
            request_id: "r1".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&escalated).unwrap(),
            r#"{"status":"escalated","requestId":"r1"}"#
        );

        let answered = CallOutcome::Answered {
            answer: "9-5".to_string(),
        };
        assert_eq!(
            serde_json::to_string(&answered).unwrap(),
            r#"{"status":"answered","answer":"9-5"}"#
        );
    }

    #[test]
    fn test_api_error_status() {
        let err = ClientError::Api {
            status: StatusCode::CONFLICT,
            message: "already handled".to_string(),
        };
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
        assert_eq!(err.to_string(), "Server returned 409 Conflict: already handled");
        assert_eq!(ClientError::StillPending("r1".into()).status(), None);
    }
}
