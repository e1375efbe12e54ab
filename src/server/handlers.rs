//! HTTP handlers for the desk API.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures_util::stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;

use super::api::{AnswerBody, CreateRequestBody, HealthResponse, ListQuery};
use super::error::ApiError;
use crate::desk::{CreateOutcome, HelpDesk, HelpRequest, KnowledgeItem};

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub desk: Arc<HelpDesk>,
}

impl AppState {
    #[must_use]
    pub fn new(desk: Arc<HelpDesk>) -> Self {
        Self { desk }
    }
}

/// POST /api/requests - Answer from knowledge or escalate.
pub async fn post_request(
    State(state): State<AppState>,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<CreateOutcome>), ApiError> {
    let outcome = state
        .desk
        .create_request(&body.caller_id, &body.question)
        .await?;
    let status = match outcome {
        CreateOutcome::Handled(_) => StatusCode::OK,
        CreateOutcome::Created(_) => StatusCode::CREATED,
    };
    Ok((status, Json(outcome)))
}

/// GET /api/requests - List requests, optionally by status.
pub async fn list_requests(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<HelpRequest>> {
    Json(state.desk.list_requests(query.status_filter()).await)
}

/// GET /api/requests/:id - Fetch a single request.
pub async fn get_request(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HelpRequest>, ApiError> {
    Ok(Json(state.desk.get_request(&id).await?))
}

/// POST /api/requests/:id/answer - Supervisor answers a pending request.
pub async fn post_answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AnswerBody>,
) -> Result<Json<HelpRequest>, ApiError> {
    Ok(Json(state.desk.answer_request(&id, &body.answer).await?))
}

/// POST /api/requests/:id/unresolved - Give up on a pending request.
pub async fn post_unresolved(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HelpRequest>, ApiError> {
    Ok(Json(state.desk.mark_unresolved(&id).await?))
}

/// GET /api/knowledge - All memorized answers.
pub async fn list_knowledge(State(state): State<AppState>) -> Json<Vec<KnowledgeItem>> {
    Json(state.desk.list_knowledge().await)
}

/// GET /api/events - SSE stream of lifecycle events.
pub async fn get_events_sse(
    State(state): State<AppState>,
) -> Sse<impl futures_core::Stream<Item = Result<Event, Infallible>>> {
    let rx = state.desk.subscribe();
    let stream = BroadcastStream::new(rx).filter_map(|result| async move {
        match result {
            Ok(event) => {
                let data = serde_json::to_string(&event).ok()?;
                Some(Ok(Event::default().event(&event.event_type).data(data)))
            }
            Err(_) => None, // Skip lagged messages
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

/// GET /health - Liveness probe.
pub async fn get_health() -> Json<HealthResponse> {
    Json(HealthResponse { ok: true })
}
