//! Conflict store
//!
//! Single owner of the conflict collection. Every committed mutation publishes
//! the new collection and then the recomputed "has unresolved" flag, from
//! inside the same critical section that made the change. Writes go to the
//! gateway first; only the aggregate it confirms is applied locally.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{broadcast, watch};

use crate::error::{Error, Result};
use crate::gateway::{ConflictGateway, GatewayError, NewConflict};
use crate::models::{
    ConflictCounts, ConflictId, ConflictItem, Outcome, ResourceType, SyncConflict,
};
use crate::resolution::{build_resolution_payload, ensure_pending};

const EVENT_CAPACITY: usize = 64;

/// Notification emitted after each committed mutation.
///
/// Subscribers always see `Conflicts` before the matching `Unresolved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Conflicts(Arc<[SyncConflict]>),
    Unresolved(bool),
}

struct Inner<G> {
    gateway: G,
    conflicts: Mutex<Vec<SyncConflict>>,
    conflicts_tx: watch::Sender<Arc<[SyncConflict]>>,
    unresolved_tx: watch::Sender<bool>,
    events_tx: broadcast::Sender<StoreEvent>,
}

/// Thread-safe handle to the conflict collection.
pub struct ConflictStore<G> {
    inner: Arc<Inner<G>>,
}

impl<G> Clone for ConflictStore<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G> std::fmt::Debug for ConflictStore<G> {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ConflictStore")
            .field("counts", &self.counts_by_status())
            .finish_non_exhaustive()
    }
}

impl<G> ConflictStore<G> {
    /// Empty store backed by `gateway`.
    pub fn new(gateway: G) -> Self {
        let empty: Arc<[SyncConflict]> = Arc::from(Vec::new());
        let (conflicts_tx, _) = watch::channel(empty);
        let (unresolved_tx, _) = watch::channel(false);
        let (events_tx, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(Inner {
                gateway,
                conflicts: Mutex::new(Vec::new()),
                conflicts_tx,
                unresolved_tx,
                events_tx,
            }),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.inner.gateway
    }

    // ---------------------------------------------------------------------
    // Reactive surface and queries
    // ---------------------------------------------------------------------

    pub fn subscribe_conflicts(&self) -> watch::Receiver<Arc<[SyncConflict]>> {
        self.inner.conflicts_tx.subscribe()
    }

    pub fn subscribe_unresolved(&self) -> watch::Receiver<bool> {
        self.inner.unresolved_tx.subscribe()
    }

    /// Ordered stream of both notifications.
    pub fn subscribe_events(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.events_tx.subscribe()
    }

    /// Whether any conflict is still pending.
    pub fn has_unresolved(&self) -> bool {
        *self.inner.unresolved_tx.borrow()
    }

    /// The most recently published collection.
    pub fn snapshot(&self) -> Arc<[SyncConflict]> {
        Arc::clone(&*self.inner.conflicts_tx.borrow())
    }

    pub fn get(&self, id: &ConflictId) -> Option<SyncConflict> {
        self.state().iter().find(|conflict| conflict.id == *id).cloned()
    }

    /// Copy of a conflict for interactive editing.
    ///
    /// Edits on the copy stay local until passed to `submit_resolution`.
    pub fn working_copy(&self, id: &ConflictId) -> Result<SyncConflict> {
        self.get(id).ok_or(Error::NotFound(*id))
    }

    /// Pending conflicts, in collection order.
    pub fn pending_only(&self) -> Vec<SyncConflict> {
        self.state()
            .iter()
            .filter(|conflict| conflict.is_pending())
            .cloned()
            .collect()
    }

    pub fn counts_by_status(&self) -> ConflictCounts {
        ConflictCounts::tally(self.state().iter())
    }

    // ---------------------------------------------------------------------
    // Local mutation
    // ---------------------------------------------------------------------

    /// Insert or replace a conflict by id.
    ///
    /// Returns `false` without publishing when an identical conflict is
    /// already stored. A closed conflict cannot be replaced by one with a
    /// different status.
    pub fn upsert(&self, conflict: SyncConflict) -> Result<bool> {
        conflict.validate()?;

        let mut conflicts = self.state();
        match conflicts.iter().position(|existing| existing.id == conflict.id) {
            Some(index) if conflicts[index] == conflict => {
                tracing::debug!(conflict_id = %conflict.id, "Upsert skipped, conflict unchanged");
                return Ok(false);
            }
            Some(index) => {
                let existing = &conflicts[index];
                if existing.status().is_terminal() && existing.status() != conflict.status() {
                    return Err(Error::InvalidInput(format!(
                        "Conflict {} is {} and cannot become {}",
                        conflict.id,
                        existing.status(),
                        conflict.status()
                    )));
                }
                conflicts[index] = conflict;
            }
            None => conflicts.push(conflict),
        }

        self.publish(&conflicts);
        Ok(true)
    }

    fn state(&self) -> MutexGuard<'_, Vec<SyncConflict>> {
        self.inner
            .conflicts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn replace_all(&self, fresh: Vec<SyncConflict>) {
        let mut conflicts = self.state();
        *conflicts = fresh;
        self.publish(&conflicts);
    }

    fn remove_ids(&self, ids: &[ConflictId]) -> usize {
        let mut conflicts = self.state();
        let before = conflicts.len();
        conflicts.retain(|conflict| !ids.contains(&conflict.id));
        let removed = before - conflicts.len();
        if removed > 0 {
            self.publish(&conflicts);
        }
        removed
    }

    /// Must be called with the state lock held.
    fn publish(&self, conflicts: &[SyncConflict]) {
        let snapshot: Arc<[SyncConflict]> = Arc::from(conflicts);
        let unresolved = conflicts.iter().any(SyncConflict::is_pending);

        self.inner.conflicts_tx.send_replace(Arc::clone(&snapshot));
        // No subscribers is fine.
        let _ = self.inner.events_tx.send(StoreEvent::Conflicts(snapshot));
        self.inner.unresolved_tx.send_replace(unresolved);
        let _ = self.inner.events_tx.send(StoreEvent::Unresolved(unresolved));

        tracing::debug!(
            conflicts = conflicts.len(),
            unresolved,
            "Published conflict collection"
        );
    }

    fn require_pending(&self, id: &ConflictId, outcome: Outcome) -> Result<()> {
        let stored = self.working_copy(id)?;
        ensure_pending(&stored, outcome)
    }
}

impl<G: ConflictGateway> ConflictStore<G> {
    /// Replace the collection with the gateway's.
    ///
    /// On failure the collection is left as it was.
    pub async fn load(&self) -> Result<usize> {
        let fresh = self
            .inner
            .gateway
            .list_conflicts()
            .await
            .map_err(read_failed)?;
        for conflict in &fresh {
            conflict.validate()?;
        }

        let count = fresh.len();
        self.replace_all(fresh);
        tracing::info!(conflicts = count, "Loaded conflicts");
        Ok(count)
    }

    /// Re-read one conflict from the gateway and store it.
    ///
    /// Also the way to discard a working copy: callers drop their copy and
    /// take a fresh one afterwards.
    pub async fn fetch(&self, id: ConflictId) -> Result<SyncConflict> {
        let conflict = self
            .inner
            .gateway
            .get_conflict(id)
            .await
            .map_err(read_failed)?;
        self.upsert(conflict.clone())?;
        Ok(conflict)
    }

    /// Delete resolved conflicts on the gateway, then locally.
    ///
    /// Only conflicts that were resolved when the call started are removed
    /// locally; anything resolved during the round trip stays until the next
    /// purge.
    pub async fn purge_resolved(&self) -> Result<usize> {
        let resolved_ids = self
            .state()
            .iter()
            .filter(|conflict| conflict.is_resolved())
            .map(|conflict| conflict.id)
            .collect::<Vec<_>>();

        self.inner
            .gateway
            .delete_resolved()
            .await
            .map_err(write_failed)?;

        let removed = self.remove_ids(&resolved_ids);
        tracing::info!(removed, "Purged resolved conflicts");
        Ok(removed)
    }

    /// Submit an edited working copy as the resolution of its conflict.
    ///
    /// Fails with `IncompleteResolution` before contacting the gateway when
    /// any item lacks a usable choice.
    pub async fn submit_resolution(&self, working_copy: &SyncConflict) -> Result<SyncConflict> {
        let payload = build_resolution_payload(working_copy)?;
        let id = working_copy.id;
        self.require_pending(&id, Outcome::Resolved)?;

        let confirmed = self
            .inner
            .gateway
            .resolve(id, payload)
            .await
            .map_err(write_failed)?;
        self.commit_confirmed(confirmed, Outcome::Resolved)
    }

    /// Close a conflict without applying any side.
    pub async fn ignore(&self, id: ConflictId) -> Result<SyncConflict> {
        self.require_pending(&id, Outcome::Ignored)?;
        let confirmed = self.inner.gateway.ignore(id).await.map_err(write_failed)?;
        self.commit_confirmed(confirmed, Outcome::Ignored)
    }

    /// Resolve every item with the local value.
    pub async fn accept_all_local(&self, id: ConflictId) -> Result<SyncConflict> {
        self.require_pending(&id, Outcome::Resolved)?;
        let confirmed = self
            .inner
            .gateway
            .accept_local(id)
            .await
            .map_err(write_failed)?;
        self.commit_confirmed(confirmed, Outcome::Resolved)
    }

    /// Resolve every item with the remote value.
    pub async fn accept_all_remote(&self, id: ConflictId) -> Result<SyncConflict> {
        self.require_pending(&id, Outcome::Resolved)?;
        let confirmed = self
            .inner
            .gateway
            .accept_remote(id)
            .await
            .map_err(write_failed)?;
        self.commit_confirmed(confirmed, Outcome::Resolved)
    }

    /// Report a locally detected divergence and track the created conflict.
    pub async fn register(
        &self,
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        items: Vec<ConflictItem>,
    ) -> Result<SyncConflict> {
        let request = NewConflict {
            resource_type,
            resource_id: resource_id.into(),
            conflicts: items,
        };
        let created = self
            .inner
            .gateway
            .create_conflict(request)
            .await
            .map_err(write_failed)?;
        self.upsert(created.clone())?;
        tracing::info!(conflict_id = %created.id, "Registered conflict");
        Ok(created)
    }

    fn commit_confirmed(&self, confirmed: SyncConflict, outcome: Outcome) -> Result<SyncConflict> {
        self.upsert(confirmed.clone())?;
        tracing::info!(
            conflict_id = %confirmed.id,
            status = %confirmed.status(),
            %outcome,
            "Conflict submission confirmed"
        );
        Ok(confirmed)
    }
}

fn read_failed(error: GatewayError) -> Error {
    tracing::warn!(%error, "Conflict read failed");
    Error::Fetch(error)
}

fn write_failed(error: GatewayError) -> Error {
    tracing::warn!(%error, "Conflict submission failed");
    Error::Submission(error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::{GatewayResult, InMemoryGateway};
    use crate::models::{Choice, ConflictStatus, FieldValue};
    use crate::resolution::{self, ResolutionEntry};
    use pretty_assertions::assert_eq;
    use tokio::sync::broadcast::error::TryRecvError;

    fn pending(resource_id: &str) -> SyncConflict {
        SyncConflict::new(
            ResourceType::Note,
            resource_id,
            vec![
                ConflictItem::new("title", "B", "C"),
                ConflictItem::new("content", "local body", "remote body"),
            ],
        )
        .unwrap()
    }

    fn resolved_copy(conflict: &SyncConflict) -> SyncConflict {
        let mut copy = conflict.clone();
        resolution::accept_all_local(&mut copy);
        resolution::apply_outcome(&mut copy, Outcome::Resolved, chrono::Utc::now()).unwrap();
        copy
    }

    async fn loaded(conflicts: Vec<SyncConflict>) -> ConflictStore<InMemoryGateway> {
        let store = ConflictStore::new(InMemoryGateway::with_conflicts(conflicts));
        store.load().await.unwrap();
        store
    }

    fn drain(events: &mut broadcast::Receiver<StoreEvent>) -> Vec<StoreEvent> {
        let mut drained = Vec::new();
        loop {
            match events.try_recv() {
                Ok(event) => drained.push(event),
                Err(TryRecvError::Empty) => return drained,
                Err(error) => panic!("unexpected receive error: {error}"),
            }
        }
    }

    #[tokio::test]
    async fn load_publishes_collection_then_flag() {
        let conflict = pending("note-1");
        let store = ConflictStore::new(InMemoryGateway::with_conflicts([conflict.clone()]));
        let mut events = store.subscribe_events();

        assert_eq!(store.load().await.unwrap(), 1);
        assert!(store.has_unresolved());

        let expected: Arc<[SyncConflict]> = Arc::from(vec![conflict]);
        assert_eq!(
            drain(&mut events),
            vec![
                StoreEvent::Conflicts(Arc::clone(&expected)),
                StoreEvent::Unresolved(true),
            ]
        );
        assert_eq!(*store.subscribe_conflicts().borrow(), expected);
    }

    #[tokio::test]
    async fn failed_load_leaves_collection_unchanged() {
        let store = loaded(vec![pending("note-1")]).await;
        let before = store.snapshot();
        let mut events = store.subscribe_events();

        store.gateway().insert(pending("note-2"));
        store.gateway().set_unavailable(true);
        let error = store.load().await.unwrap_err();

        assert!(matches!(error, Error::Fetch(_)));
        assert_eq!(store.snapshot(), before);
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn identical_upsert_is_a_noop() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        let mut events = store.subscribe_events();

        assert!(!store.upsert(conflict).unwrap());
        assert!(drain(&mut events).is_empty());
    }

    #[tokio::test]
    async fn upsert_replaces_by_id_and_recomputes_flag() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        let mut unresolved = store.subscribe_unresolved();

        assert!(store.upsert(resolved_copy(&conflict)).unwrap());
        assert_eq!(store.snapshot().len(), 1);
        assert!(!store.has_unresolved());
        assert!(unresolved.has_changed().unwrap());
        assert!(!*unresolved.borrow_and_update());
    }

    #[test]
    fn upsert_rejects_reopening_closed_conflicts() {
        let conflict = pending("note-1");
        let store = ConflictStore::new(InMemoryGateway::new());
        store.upsert(resolved_copy(&conflict)).unwrap();

        let error = store.upsert(conflict).unwrap_err();
        assert!(matches!(error, Error::InvalidInput(_)));
        assert!(store.get(&store.snapshot()[0].id).unwrap().is_resolved());
    }

    #[test]
    fn upsert_rejects_duplicate_item_ids() {
        let conflict = pending("note-1");
        let mut json = serde_json::to_value(&conflict).unwrap();
        let first = json["conflicts"][0].clone();
        json["conflicts"][1]["id"] = first["id"].clone();
        let broken: SyncConflict = serde_json::from_value(json).unwrap();

        let store = ConflictStore::new(InMemoryGateway::new());
        assert!(matches!(
            store.upsert(broken),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn resolved_conflicts_with_open_items_are_refused() {
        let conflict = pending("note-1");
        let mut json = serde_json::to_value(&conflict).unwrap();
        json["status"] = "resolved".into();
        let inconsistent: SyncConflict = serde_json::from_value(json).unwrap();

        let store = ConflictStore::new(InMemoryGateway::new());
        assert!(matches!(
            store.upsert(inconsistent.clone()),
            Err(Error::InvalidInput(_))
        ));
        assert!(store.snapshot().is_empty());
        assert_eq!(store.counts_by_status(), ConflictCounts::default());

        store.gateway().insert(inconsistent);
        assert!(matches!(store.load().await, Err(Error::InvalidInput(_))));
        assert!(matches!(
            store.fetch(conflict.id()).await,
            Err(Error::InvalidInput(_))
        ));
        assert!(store.snapshot().is_empty());
    }

    #[tokio::test]
    async fn views_and_counts_follow_statuses() {
        let open = pending("note-1");
        let ignored = pending("note-2");
        let done = pending("note-3");
        let store = loaded(vec![open.clone(), ignored.clone(), done.clone()]).await;

        store.ignore(ignored.id).await.unwrap();
        store.accept_all_remote(done.id).await.unwrap();

        assert_eq!(
            store.counts_by_status(),
            ConflictCounts {
                pending: 1,
                resolved: 1,
                ignored: 1,
                total: 3,
            }
        );
        let pending_ids = store
            .pending_only()
            .into_iter()
            .map(|conflict| conflict.id)
            .collect::<Vec<_>>();
        assert_eq!(pending_ids, vec![open.id]);
        assert_eq!(store.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn submit_resolution_applies_confirmed_aggregate() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;

        let mut copy = store.working_copy(&conflict.id).unwrap();
        let title = copy.items()[0].id;
        let content = copy.items()[1].id;
        resolution::select_choice(&mut copy, &title, Choice::Custom, None).unwrap();
        resolution::set_custom_value(&mut copy, &title, "BC").unwrap();
        resolution::select_choice(&mut copy, &content, Choice::Remote, None).unwrap();

        let confirmed = store.submit_resolution(&copy).await.unwrap();
        assert_eq!(confirmed.status(), ConflictStatus::Resolved);
        assert_eq!(store.get(&conflict.id), Some(confirmed.clone()));
        assert!(!store.has_unresolved());
        assert_eq!(
            confirmed.item(&title).unwrap().final_value(),
            Some(&FieldValue::text("BC"))
        );
    }

    #[tokio::test]
    async fn incomplete_resolution_never_reaches_gateway() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        store.gateway().set_unavailable(true);

        let mut copy = store.working_copy(&conflict.id).unwrap();
        let title = copy.items()[0].id;
        resolution::select_choice(&mut copy, &title, Choice::Local, None).unwrap();

        let error = store.submit_resolution(&copy).await.unwrap_err();
        match error {
            Error::IncompleteResolution { unresolved } => {
                assert_eq!(unresolved, vec![copy.items()[1].id]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(store.get(&conflict.id).unwrap().is_pending());
    }

    #[tokio::test]
    async fn failed_submission_keeps_conflict_pending() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        let mut copy = store.working_copy(&conflict.id).unwrap();
        resolution::accept_all_local(&mut copy);

        store.gateway().set_unavailable(true);
        let error = store.submit_resolution(&copy).await.unwrap_err();
        assert!(matches!(error, Error::Submission(_)));
        assert_eq!(store.get(&conflict.id), Some(conflict));
        assert!(store.has_unresolved());
    }

    #[tokio::test]
    async fn closed_conflicts_reject_further_outcomes() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        store.ignore(conflict.id).await.unwrap();

        let error = store.accept_all_local(conflict.id).await.unwrap_err();
        assert!(matches!(
            error,
            Error::InvalidTransition {
                status: ConflictStatus::Ignored,
                outcome: Outcome::Resolved,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn unknown_conflicts_are_not_found() {
        let store = loaded(Vec::new()).await;
        let missing = ConflictId::new();
        assert!(matches!(
            store.ignore(missing).await,
            Err(Error::NotFound(id)) if id == missing
        ));
    }

    #[tokio::test]
    async fn fetch_discards_stale_local_state() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;

        let remote_view = resolved_copy(&conflict);
        store.gateway().insert(remote_view.clone());
        assert_eq!(store.fetch(conflict.id).await.unwrap(), remote_view);
        assert_eq!(store.working_copy(&conflict.id).unwrap(), remote_view);
    }

    #[tokio::test]
    async fn register_tracks_created_conflict() {
        let store = loaded(Vec::new()).await;
        let created = store
            .register(
                ResourceType::Folder,
                "folder-7",
                vec![ConflictItem::new("name", "Work", "Projects")],
            )
            .await
            .unwrap();

        assert_eq!(store.snapshot().as_ref(), [created.clone()].as_slice());
        assert_eq!(store.gateway().conflicts(), vec![created]);
        assert!(store.has_unresolved());
    }

    #[tokio::test]
    async fn failed_purge_leaves_collection_unchanged() {
        let conflict = pending("note-1");
        let store = loaded(vec![conflict.clone()]).await;
        store.accept_all_local(conflict.id).await.unwrap();

        store.gateway().set_unavailable(true);
        assert!(matches!(
            store.purge_resolved().await,
            Err(Error::Submission(_))
        ));
        assert_eq!(store.snapshot().len(), 1);
    }

    /// Gateway that runs a callback after the server-side purge completes.
    struct PurgeHookGateway {
        inner: InMemoryGateway,
        after_delete: Mutex<Option<Box<dyn FnOnce() + Send>>>,
    }

    impl ConflictGateway for PurgeHookGateway {
        async fn list_conflicts(&self) -> GatewayResult<Vec<SyncConflict>> {
            self.inner.list_conflicts().await
        }

        async fn get_conflict(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
            self.inner.get_conflict(id).await
        }

        async fn resolve(
            &self,
            id: ConflictId,
            resolutions: Vec<ResolutionEntry>,
        ) -> GatewayResult<SyncConflict> {
            self.inner.resolve(id, resolutions).await
        }

        async fn ignore(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
            self.inner.ignore(id).await
        }

        async fn accept_local(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
            self.inner.accept_local(id).await
        }

        async fn accept_remote(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
            self.inner.accept_remote(id).await
        }

        async fn create_conflict(&self, request: NewConflict) -> GatewayResult<SyncConflict> {
            self.inner.create_conflict(request).await
        }

        async fn delete_resolved(&self) -> GatewayResult<()> {
            self.inner.delete_resolved().await?;
            let hook = self.after_delete.lock().unwrap().take();
            if let Some(hook) = hook {
                hook();
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn purge_keeps_conflicts_resolved_mid_flight() {
        let already_done = pending("note-1");
        let in_flight = pending("note-2");
        let store = ConflictStore::new(PurgeHookGateway {
            inner: InMemoryGateway::with_conflicts([already_done.clone(), in_flight.clone()]),
            after_delete: Mutex::new(None),
        });
        store.load().await.unwrap();
        store.accept_all_local(already_done.id).await.unwrap();

        let late = resolved_copy(&in_flight);
        let handle = store.clone();
        let late_for_hook = late.clone();
        *store.gateway().after_delete.lock().unwrap() = Some(Box::new(move || {
            handle.upsert(late_for_hook).unwrap();
        }));

        assert_eq!(store.purge_resolved().await.unwrap(), 1);
        assert_eq!(store.get(&already_done.id), None);
        assert_eq!(store.get(&in_flight.id), Some(late));
        assert_eq!(store.counts_by_status().resolved, 1);
    }

    #[tokio::test]
    async fn every_mutation_emits_ordered_pairs() {
        let first = pending("note-1");
        let second = pending("note-2");
        let store = loaded(vec![first.clone(), second.clone()]).await;
        let mut events = store.subscribe_events();

        store.ignore(first.id).await.unwrap();
        store.accept_all_remote(second.id).await.unwrap();
        store.purge_resolved().await.unwrap();

        let events = drain(&mut events);
        assert_eq!(events.len(), 6);
        for pair in events.chunks(2) {
            let StoreEvent::Conflicts(snapshot) = &pair[0] else {
                panic!("collection must come first: {pair:?}");
            };
            let expected = snapshot.iter().any(SyncConflict::is_pending);
            assert_eq!(pair[1], StoreEvent::Unresolved(expected));
        }
        assert_eq!(events[5], StoreEvent::Unresolved(false));
    }
}
