//! Durable storage for the desk's two collections.
//!
//! The whole snapshot is read once at startup and rewritten on every
//! mutating operation.

mod error;
mod json;
mod memory;

pub use error::PersistError;
pub use json::JsonFileStore;
pub use memory::MemoryStore;

use async_trait::async_trait;

use crate::desk::DeskSnapshot;

/// Storage backend for desk snapshots.
#[async_trait]
pub trait Persistence: Send + Sync {
    /// Read the stored snapshot, or an empty one if nothing was stored yet.
    async fn load(&self) -> Result<DeskSnapshot, PersistError>;

    /// Replace the stored snapshot.
    async fn save(&self, snapshot: &DeskSnapshot) -> Result<(), PersistError>;
}
