//! The help desk: single owner of all requests and knowledge.
//!
//! Every mutation takes the write lock, applies the transition to a staged
//! copy, persists the staged snapshot and only then commits it. Two callers
//! racing on the same pending request therefore see exactly one winner, and a
//! failed write leaves the in-memory state untouched.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::{broadcast, RwLock};

use super::error::DeskError;
use super::events::{
    DeskEvent, DEFAULT_EVENT_CHANNEL_CAPACITY, REQUEST_CREATED, REQUEST_RESOLVED,
    REQUEST_UNRESOLVED,
};
use super::lifecycle::DeskState;
use super::notify::{LogNotifier, Notifier};
use super::requests::require_text;
use super::types::{CreateOutcome, HandledAnswer, HelpRequest, KnowledgeItem, RequestStatus};
use crate::persist::{PersistError, Persistence};

/// Repository facade over the request store, knowledge matcher and lifecycle.
pub struct HelpDesk {
    state: RwLock<DeskState>,
    persistence: Arc<dyn Persistence>,
    notifier: Arc<dyn Notifier>,
    events: broadcast::Sender<DeskEvent>,
}

impl std::fmt::Debug for HelpDesk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HelpDesk").finish_non_exhaustive()
    }
}

impl HelpDesk {
    /// Load the stored snapshot and open the desk.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be read.
    pub async fn open(persistence: Arc<dyn Persistence>) -> Result<Self, PersistError> {
        let snapshot = persistence.load().await?;
        tracing::info!(
            requests = snapshot.requests.len(),
            knowledge = snapshot.knowledge.len(),
            "Help desk opened"
        );
        let (events, _) = broadcast::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            state: RwLock::new(DeskState::from_snapshot(snapshot)),
            persistence,
            notifier: Arc::new(LogNotifier),
            events,
        })
    }

    /// Replace the notifier (builder pattern).
    #[must_use]
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Subscribe to committed lifecycle events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<DeskEvent> {
        self.events.subscribe()
    }

    /// Answer from knowledge, or escalate as a new pending request.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if `caller_id` or `question` is empty.
    /// - `Storage` if the new request could not be persisted.
    pub async fn create_request(
        &self,
        caller_id: &str,
        question: &str,
    ) -> Result<CreateOutcome, DeskError> {
        require_text("callerId", caller_id)?;
        require_text("question", question)?;

        let mut state = self.state.write().await;
        if let Some(answer) = state.knowledge.lookup(question) {
            tracing::debug!(caller_id, "Answered from knowledge");
            return Ok(CreateOutcome::Handled(HandledAnswer::new(answer)));
        }

        let mut staged = state.clone();
        let request = staged.requests.create(caller_id, question, Utc::now())?;
        self.commit(&mut state, staged).await?;
        drop(state);

        self.notifier.supervisor_needed(&request);
        self.emit(DeskEvent::request(REQUEST_CREATED, &request));
        Ok(CreateOutcome::Created(request))
    }

    /// Resolve a pending request and memorize the answer.
    ///
    /// # Errors
    ///
    /// `InvalidInput`, `NotFound`, `Conflict` or `Storage`.
    pub async fn answer_request(&self, id: &str, answer: &str) -> Result<HelpRequest, DeskError> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let resolution = staged.answer(id, answer, Utc::now())?;
        self.commit(&mut state, staged).await?;
        drop(state);

        self.notifier.caller_answered(&resolution.request);
        self.emit(DeskEvent::request(REQUEST_RESOLVED, &resolution.request));
        self.emit(DeskEvent::knowledge(&resolution.knowledge));
        Ok(resolution.request)
    }

    /// Give up on a pending request.
    ///
    /// # Errors
    ///
    /// `NotFound`, `Conflict` or `Storage`.
    pub async fn mark_unresolved(&self, id: &str) -> Result<HelpRequest, DeskError> {
        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let request = staged.mark_unresolved(id, Utc::now())?;
        self.commit(&mut state, staged).await?;
        drop(state);

        self.emit(DeskEvent::request(REQUEST_UNRESOLVED, &request));
        Ok(request)
    }

    /// Mark every pending request older than `timeout` at `now` as unresolved,
    /// persisting the whole batch with one write.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch could not be persisted; nothing changes then.
    pub async fn sweep_expired(
        &self,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Result<Vec<HelpRequest>, PersistError> {
        let timeout = TimeDelta::from_std(timeout).unwrap_or(TimeDelta::MAX);

        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let expired = staged.expire_pending(now, timeout);
        if expired.is_empty() {
            return Ok(expired);
        }
        self.commit(&mut state, staged).await?;
        drop(state);

        for request in &expired {
            self.emit(DeskEvent::request(REQUEST_UNRESOLVED, request));
        }
        Ok(expired)
    }

    /// List requests newest first, optionally restricted to one status.
    pub async fn list_requests(&self, status: Option<RequestStatus>) -> Vec<HelpRequest> {
        self.state.read().await.requests.list(status)
    }

    /// Look up a single request.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no request has `id`.
    pub async fn get_request(&self, id: &str) -> Result<HelpRequest, DeskError> {
        self.state
            .read()
            .await
            .requests
            .get(id)
            .cloned()
            .ok_or_else(|| DeskError::NotFound(id.to_string()))
    }

    /// All memorized answers, newest first.
    pub async fn list_knowledge(&self) -> Vec<KnowledgeItem> {
        self.state.read().await.knowledge.items().to_vec()
    }

    /// Match a question against memorized answers.
    pub async fn lookup(&self, question: &str) -> Option<String> {
        self.state
            .read()
            .await
            .knowledge
            .lookup(question)
            .map(str::to_string)
    }

    async fn commit(&self, state: &mut DeskState, staged: DeskState) -> Result<(), PersistError> {
        self.persistence.save(&staged.snapshot()).await?;
        *state = staged;
        Ok(())
    }

    fn emit(&self, event: DeskEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::desk::DeskSnapshot;
    use crate::persist::MemoryStore;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        escalated: Mutex<Vec<String>>,
        answered: Mutex<Vec<String>>,
    }

    impl Notifier for RecordingNotifier {
        fn supervisor_needed(&self, request: &HelpRequest) {
            self.escalated.lock().unwrap().push(request.id.clone());
        }

        fn caller_answered(&self, request: &HelpRequest) {
            self.answered.lock().unwrap().push(request.caller_id.clone());
        }
    }

    async fn open_desk() -> (HelpDesk, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let desk = HelpDesk::open(store.clone()).await.unwrap();
        (desk, store)
    }

    fn created(outcome: CreateOutcome) -> HelpRequest {
        match outcome {
            CreateOutcome::Created(request) => request,
            CreateOutcome::Handled(h) => panic!("unexpected knowledge hit: {}", h.answer),
        }
    }

    #[tokio::test]
    async fn test_create_escalates_on_empty_knowledge() {
        let (desk, store) = open_desk().await;

        let request = created(desk.create_request("+1555", "What are your hours?").await.unwrap());

        assert_eq!(request.status, RequestStatus::Pending);
        assert_eq!(store.save_count(), 1);
        assert_eq!(store.stored().await.requests, vec![request]);
    }

    #[tokio::test]
    async fn test_create_short_circuits_on_knowledge_hit() {
        let (desk, store) = open_desk().await;
        let first = created(desk.create_request("+1555", "hours").await.unwrap());
        desk.answer_request(&first.id, "9-5").await.unwrap();
        let saves = store.save_count();

        let outcome = desk
            .create_request("+1666", "What are your hours?")
            .await
            .unwrap();

        assert_eq!(outcome, CreateOutcome::Handled(HandledAnswer::new("9-5")));
        assert_eq!(desk.list_requests(None).await.len(), 1);
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_create_validates_before_lookup() {
        let (desk, store) = open_desk().await;
        let err = desk.create_request("", "hours").await.unwrap_err();
        assert!(matches!(err, DeskError::InvalidInput(_)));
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_persists_and_notifies() {
        let notifier = Arc::new(RecordingNotifier::default());
        let store = Arc::new(MemoryStore::new());
        let desk = HelpDesk::open(store.clone())
            .await
            .unwrap()
            .with_notifier(notifier.clone());

        let request = created(desk.create_request("+1555", "Parking?").await.unwrap());
        let resolved = desk.answer_request(&request.id, "Behind the salon").await.unwrap();

        assert_eq!(resolved.status, RequestStatus::Resolved);
        let stored = store.stored().await;
        assert_eq!(stored.requests[0], resolved);
        assert_eq!(stored.knowledge.len(), 1);
        assert_eq!(stored.knowledge[0].question, "Parking?");
        assert_eq!(*notifier.escalated.lock().unwrap(), vec![request.id]);
        assert_eq!(*notifier.answered.lock().unwrap(), vec!["+1555".to_string()]);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_state_untouched() {
        let (desk, store) = open_desk().await;
        let request = created(desk.create_request("+1555", "Parking?").await.unwrap());
        store.set_failing(true);

        let err = desk.answer_request(&request.id, "Behind").await.unwrap_err();

        assert!(matches!(err, DeskError::Storage(_)));
        assert!(desk.get_request(&request.id).await.unwrap().is_pending());
        assert!(desk.list_knowledge().await.is_empty());

        store.set_failing(false);
        desk.answer_request(&request.id, "Behind").await.unwrap();
        assert_eq!(desk.list_knowledge().await.len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_persists_batch_once() {
        let (desk, store) = open_desk().await;
        created(desk.create_request("a", "one").await.unwrap());
        created(desk.create_request("b", "two").await.unwrap());
        let saves = store.save_count();

        let later = Utc::now() + TimeDelta::minutes(3);
        let expired = desk
            .sweep_expired(later, Duration::from_secs(120))
            .await
            .unwrap();

        assert_eq!(expired.len(), 2);
        assert_eq!(store.save_count(), saves + 1);
        assert!(desk
            .list_requests(Some(RequestStatus::Pending))
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn test_sweep_without_expiry_does_not_write() {
        let (desk, store) = open_desk().await;
        created(desk.create_request("a", "one").await.unwrap());
        let saves = store.save_count();

        let expired = desk
            .sweep_expired(Utc::now(), Duration::from_secs(120))
            .await
            .unwrap();

        assert!(expired.is_empty());
        assert_eq!(store.save_count(), saves);
    }

    #[tokio::test]
    async fn test_failed_sweep_keeps_requests_pending() {
        let (desk, store) = open_desk().await;
        let request = created(desk.create_request("a", "one").await.unwrap());
        store.set_failing(true);

        let later = Utc::now() + TimeDelta::minutes(3);
        assert!(desk
            .sweep_expired(later, Duration::from_secs(120))
            .await
            .is_err());
        assert!(desk.get_request(&request.id).await.unwrap().is_pending());

        store.set_failing(false);
        let expired = desk
            .sweep_expired(later, Duration::from_secs(120))
            .await
            .unwrap();
        assert_eq!(expired.len(), 1);
    }

    #[tokio::test]
    async fn test_events_follow_commits() {
        let (desk, _store) = open_desk().await;
        let mut events = desk.subscribe();

        let request = created(desk.create_request("a", "Parking?").await.unwrap());
        desk.answer_request(&request.id, "Behind").await.unwrap();

        let types: Vec<String> = [
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
            events.recv().await.unwrap(),
        ]
        .into_iter()
        .map(|e| e.event_type)
        .collect();
        assert_eq!(
            types,
            vec!["request_created", "request_resolved", "knowledge_added"]
        );
    }

    #[tokio::test]
    async fn test_concurrent_answer_and_unresolve_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let desk = Arc::new(HelpDesk::open(store).await.unwrap());

        for i in 0..20 {
            let question = format!("unresolve race {i}");
            let request = created(desk.create_request("a", &question).await.unwrap());

            let answering = {
                let desk = Arc::clone(&desk);
                let id = request.id.clone();
                tokio::spawn(async move { desk.answer_request(&id, "answer").await })
            };
            let giving_up = {
                let desk = Arc::clone(&desk);
                let id = request.id.clone();
                tokio::spawn(async move { desk.mark_unresolved(&id).await })
            };

            let answered = answering.await.unwrap();
            let gave_up = giving_up.await.unwrap();
            assert_ne!(answered.is_ok(), gave_up.is_ok());

            let final_state = desk.get_request(&request.id).await.unwrap();
            if answered.is_ok() {
                assert_eq!(final_state.status, RequestStatus::Resolved);
                assert!(matches!(gave_up, Err(DeskError::Conflict { .. })));
            } else {
                assert_eq!(final_state.status, RequestStatus::Unresolved);
                assert!(matches!(answered, Err(DeskError::Conflict { .. })));
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_answer_and_sweep_have_one_winner() {
        let store = Arc::new(MemoryStore::new());
        let desk = Arc::new(HelpDesk::open(store).await.unwrap());

        for i in 0..20 {
            let question = format!("sweep race {i}");
            let request = created(desk.create_request("a", &question).await.unwrap());

            let answering = {
                let desk = Arc::clone(&desk);
                let id = request.id.clone();
                tokio::spawn(async move { desk.answer_request(&id, "answer").await })
            };
            let sweeping = {
                let desk = Arc::clone(&desk);
                tokio::spawn(async move {
                    desk.sweep_expired(Utc::now() + TimeDelta::minutes(5), Duration::from_secs(120))
                        .await
                })
            };

            let answered = answering.await.unwrap();
            let swept = sweeping.await.unwrap().unwrap();
            let sweep_won = swept.iter().any(|expired| expired.id == request.id);
            assert_ne!(answered.is_ok(), sweep_won);

            let final_state = desk.get_request(&request.id).await.unwrap();
            if sweep_won {
                assert_eq!(final_state.status, RequestStatus::Unresolved);
                assert!(matches!(answered, Err(DeskError::Conflict { .. })));
                assert!(desk.lookup(&question).await.is_none());
            } else {
                assert_eq!(final_state.status, RequestStatus::Resolved);
                assert_eq!(final_state.answer.as_deref(), Some("answer"));
            }
        }
    }

    #[tokio::test]
    async fn test_open_from_seeded_snapshot() {
        let now = Utc::now();
        let pending = HelpRequest::new("+1555", "Parking?", now);
        let store = Arc::new(MemoryStore::with_snapshot(DeskSnapshot {
            requests: vec![pending.clone()],
            knowledge: vec![KnowledgeItem::new("Hours?", "9-5", now)],
        }));
        let desk = HelpDesk::open(store.clone()).await.unwrap();

        assert_eq!(desk.lookup("  hours? ").await.as_deref(), Some("9-5"));
        assert_eq!(desk.get_request(&pending.id).await.unwrap(), pending);
        assert_eq!(store.save_count(), 0);

        desk.answer_request(&pending.id, "Behind").await.unwrap();
        assert_eq!(store.stored().await.knowledge.len(), 2);
    }

    #[tokio::test]
    async fn test_reopen_restores_state() {
        let store = Arc::new(MemoryStore::new());
        let desk = HelpDesk::open(store.clone()).await.unwrap();
        let request = created(desk.create_request("a", "Parking?").await.unwrap());
        desk.answer_request(&request.id, "Behind").await.unwrap();
        drop(desk);

        let reopened = HelpDesk::open(store).await.unwrap();
        assert_eq!(reopened.lookup("parking?").await.as_deref(), Some("Behind"));
        assert_eq!(
            reopened.get_request(&request.id).await.unwrap().status,
            RequestStatus::Resolved
        );
    }
}
