//! HTTP boundary API for callers and supervisors.

mod api;
mod error;
mod handlers;
#[allow(clippy::module_inception)]
mod server;

pub use api::{AnswerBody, CreateRequestBody, ErrorResponse, HealthResponse, ListQuery};
pub use error::{ApiError, ServerError};
pub use handlers::AppState;
pub use server::DeskServer;
