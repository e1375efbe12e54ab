//! Request lifecycle engine.
//!
//! Questions are answered from memorized knowledge when possible, otherwise
//! escalated as pending requests that a supervisor answers or that time out.

mod error;
mod events;
mod lifecycle;
mod matcher;
mod notify;
mod requests;
mod service;
mod sweeper;
mod types;

pub use error::DeskError;
pub use events::{
    DeskEvent, DEFAULT_EVENT_CHANNEL_CAPACITY, KNOWLEDGE_ADDED, REQUEST_CREATED,
    REQUEST_RESOLVED, REQUEST_UNRESOLVED,
};
pub use lifecycle::{DeskState, Resolution};
pub use matcher::{normalize, questions_match, KnowledgeMatcher};
pub use notify::{LogNotifier, Notifier};
pub use requests::RequestStore;
pub use service::HelpDesk;
pub use sweeper::{SweeperConfig, TimeoutSweeper, DEFAULT_PENDING_TIMEOUT, DEFAULT_TICK_INTERVAL};
pub use types::{
    CreateOutcome, DeskSnapshot, HandledAnswer, HelpRequest, KnowledgeItem, RequestStatus,
    UnknownStatus,
};
