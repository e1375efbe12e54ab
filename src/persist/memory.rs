//! In-memory store for ephemeral runs and tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{PersistError, Persistence};
use crate::desk::DeskSnapshot;

/// Snapshot store that keeps the last saved snapshot in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    snapshot: Mutex<DeskSnapshot>,
    saves: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with an existing snapshot.
    #[must_use]
    pub fn with_snapshot(snapshot: DeskSnapshot) -> Self {
        Self {
            snapshot: Mutex::new(snapshot),
            ..Self::default()
        }
    }

    /// Make every following save fail with `PersistError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of successful saves.
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// The last saved snapshot.
    pub async fn stored(&self) -> DeskSnapshot {
        self.snapshot.lock().await.clone()
    }
}

#[async_trait]
impl Persistence for MemoryStore {
    async fn load(&self) -> Result<DeskSnapshot, PersistError> {
        Ok(self.snapshot.lock().await.clone())
    }

    async fn save(&self, snapshot: &DeskSnapshot) -> Result<(), PersistError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PersistError::Unavailable);
        }
        *self.snapshot.lock().await = snapshot.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::{HelpRequest, KnowledgeItem};
    use chrono::Utc;

    #[tokio::test]
    async fn test_save_counts_and_stores() {
        let store = MemoryStore::new();
        let snapshot = DeskSnapshot {
            requests: Vec::new(),
            knowledge: vec![KnowledgeItem::new("q", "a", Utc::now())],
        };

        store.save(&snapshot).await.unwrap();

        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored().await, snapshot);
        assert_eq!(store.load().await.unwrap(), snapshot);
    }

    #[tokio::test]
    async fn test_failing_store_keeps_previous_snapshot() {
        let store = MemoryStore::new();
        store.set_failing(true);
        let snapshot = DeskSnapshot {
            requests: Vec::new(),
            knowledge: vec![KnowledgeItem::new("q", "a", Utc::now())],
        };

        assert!(matches!(
            store.save(&snapshot).await,
            Err(PersistError::Unavailable)
        ));
        assert_eq!(store.save_count(), 0);
        assert_eq!(store.stored().await, DeskSnapshot::default());
    }

    #[tokio::test]
    async fn test_with_snapshot_loads_seeded_state_without_saving() {
        let now = Utc::now();
        let snapshot = DeskSnapshot {
            requests: vec![HelpRequest::new("+1555", "Parking?", now)],
            knowledge: vec![KnowledgeItem::new("Hours?", "9-5", now)],
        };
        let store = MemoryStore::with_snapshot(snapshot.clone());

        assert_eq!(store.load().await.unwrap(), snapshot);
        assert_eq!(store.stored().await, snapshot);
        assert_eq!(store.save_count(), 0);
    }
}
