//! In-process conflict gateway.
//!
//! Holds its own authoritative copies and applies the same resolution rules a
//! server would. Used for offline work and as the gateway in tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;

use super::{ConflictGateway, GatewayError, GatewayResult, NewConflict};
use crate::models::{ConflictId, Outcome, SyncConflict};
use crate::resolution::{self, ResolutionEntry};

#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    conflicts: Arc<Mutex<Vec<SyncConflict>>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway pre-populated with `conflicts`.
    pub fn with_conflicts(conflicts: impl IntoIterator<Item = SyncConflict>) -> Self {
        let gateway = Self::new();
        gateway.state().extend(conflicts);
        gateway
    }

    /// Insert or replace an aggregate behind the store's back.
    pub fn insert(&self, conflict: SyncConflict) {
        let mut conflicts = self.state();
        match conflicts.iter_mut().find(|existing| existing.id == conflict.id) {
            Some(existing) => *existing = conflict,
            None => conflicts.push(conflict),
        }
    }

    /// Copy of everything the gateway currently holds.
    pub fn conflicts(&self) -> Vec<SyncConflict> {
        self.state().clone()
    }

    /// While set, every request fails with a 503 API error.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn state(&self) -> MutexGuard<'_, Vec<SyncConflict>> {
        self.conflicts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> GatewayResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::Api {
                status: 503,
                message: "conflict service unavailable".to_string(),
            });
        }
        Ok(())
    }

    /// Run `update` on a scratch copy and commit it only if it succeeds.
    fn transition(
        &self,
        id: ConflictId,
        update: impl FnOnce(&mut SyncConflict) -> crate::Result<()>,
    ) -> GatewayResult<SyncConflict> {
        self.ensure_available()?;
        let mut conflicts = self.state();
        let stored = conflicts
            .iter_mut()
            .find(|conflict| conflict.id == id)
            .ok_or(GatewayError::NotFound(id))?;

        let mut scratch = stored.clone();
        update(&mut scratch).map_err(|error| GatewayError::Rejected(error.to_string()))?;
        *stored = scratch.clone();
        Ok(scratch)
    }
}

fn apply_resolutions(
    conflict: &mut SyncConflict,
    resolutions: &[ResolutionEntry],
) -> crate::Result<()> {
    resolution::ensure_pending(conflict, Outcome::Resolved)?;
    for entry in resolutions {
        resolution::select_choice(
            conflict,
            &entry.item_id,
            entry.source,
            Some(entry.value.clone()),
        )?;
    }
    resolution::apply_outcome(conflict, Outcome::Resolved, Utc::now())
}

impl ConflictGateway for InMemoryGateway {
    async fn list_conflicts(&self) -> GatewayResult<Vec<SyncConflict>> {
        self.ensure_available()?;
        Ok(self.conflicts())
    }

    async fn get_conflict(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.ensure_available()?;
        self.state()
            .iter()
            .find(|conflict| conflict.id == id)
            .cloned()
            .ok_or(GatewayError::NotFound(id))
    }

    async fn resolve(
        &self,
        id: ConflictId,
        resolutions: Vec<ResolutionEntry>,
    ) -> GatewayResult<SyncConflict> {
        self.transition(id, |conflict| apply_resolutions(conflict, &resolutions))
    }

    async fn ignore(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.transition(id, |conflict| {
            resolution::apply_outcome(conflict, Outcome::Ignored, Utc::now())
        })
    }

    async fn accept_local(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.transition(id, |conflict| {
            resolution::ensure_pending(conflict, Outcome::Resolved)?;
            resolution::accept_all_local(conflict);
            resolution::apply_outcome(conflict, Outcome::Resolved, Utc::now())
        })
    }

    async fn accept_remote(&self, id: ConflictId) -> GatewayResult<SyncConflict> {
        self.transition(id, |conflict| {
            resolution::ensure_pending(conflict, Outcome::Resolved)?;
            resolution::accept_all_remote(conflict);
            resolution::apply_outcome(conflict, Outcome::Resolved, Utc::now())
        })
    }

    async fn create_conflict(&self, request: NewConflict) -> GatewayResult<SyncConflict> {
        self.ensure_available()?;
        let conflict =
            SyncConflict::new(request.resource_type, request.resource_id, request.conflicts)
                .map_err(|error| GatewayError::Rejected(error.to_string()))?;
        self.state().push(conflict.clone());
        Ok(conflict)
    }

    async fn delete_resolved(&self) -> GatewayResult<()> {
        self.ensure_available()?;
        self.state().retain(|conflict| !conflict.is_resolved());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Choice, ConflictItem, ConflictStatus, FieldValue, ResourceType};
    use pretty_assertions::assert_eq;

    fn pending(field: &str) -> SyncConflict {
        SyncConflict::new(
            ResourceType::Note,
            "note-1",
            vec![ConflictItem::new(field, "mine", "theirs")],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn resolve_applies_submitted_values() {
        let conflict = pending("title");
        let item_id = conflict.items()[0].id;
        let gateway = InMemoryGateway::with_conflicts([conflict.clone()]);

        let resolved = gateway
            .resolve(
                conflict.id,
                vec![ResolutionEntry {
                    item_id,
                    value: FieldValue::text("ours and theirs"),
                    source: Choice::Custom,
                }],
            )
            .await
            .unwrap();

        assert_eq!(resolved.status(), ConflictStatus::Resolved);
        assert!(resolved.resolved_at().is_some());
        assert_eq!(
            resolved.items()[0].final_value(),
            Some(&FieldValue::text("ours and theirs"))
        );
        assert_eq!(gateway.conflicts(), vec![resolved]);
    }

    #[tokio::test]
    async fn resolve_rejects_incomplete_requests() {
        let conflict = pending("title");
        let gateway = InMemoryGateway::with_conflicts([conflict.clone()]);

        let error = gateway.resolve(conflict.id, Vec::new()).await.unwrap_err();
        assert!(matches!(error, GatewayError::Rejected(_)));
        assert_eq!(gateway.conflicts(), vec![conflict]);
    }

    #[tokio::test]
    async fn closed_conflicts_cannot_transition_again() {
        let conflict = pending("title");
        let gateway = InMemoryGateway::with_conflicts([conflict.clone()]);

        gateway.ignore(conflict.id).await.unwrap();
        let error = gateway.accept_local(conflict.id).await.unwrap_err();
        assert!(matches!(error, GatewayError::Rejected(_)));
        assert_eq!(gateway.conflicts()[0].status(), ConflictStatus::Ignored);
    }

    #[tokio::test]
    async fn accept_remote_picks_every_remote_value() {
        let conflict = pending("title");
        let gateway = InMemoryGateway::with_conflicts([conflict.clone()]);

        let resolved = gateway.accept_remote(conflict.id).await.unwrap();
        assert_eq!(
            resolved.items()[0].final_value(),
            Some(&FieldValue::text("theirs"))
        );
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let gateway = InMemoryGateway::new();
        let id = ConflictId::new();
        assert!(matches!(
            gateway.get_conflict(id).await,
            Err(GatewayError::NotFound(missing)) if missing == id
        ));
    }

    #[tokio::test]
    async fn delete_resolved_keeps_pending_and_ignored() {
        let resolved = pending("title");
        let ignored = pending("content");
        let open = pending("tags");
        let gateway =
            InMemoryGateway::with_conflicts([resolved.clone(), ignored.clone(), open.clone()]);
        gateway.accept_local(resolved.id).await.unwrap();
        gateway.ignore(ignored.id).await.unwrap();

        gateway.delete_resolved().await.unwrap();
        let remaining = gateway
            .conflicts()
            .into_iter()
            .map(|conflict| conflict.id)
            .collect::<Vec<_>>();
        assert_eq!(remaining, vec![ignored.id, open.id]);
    }

    #[tokio::test]
    async fn unavailable_gateway_fails_every_call() {
        let gateway = InMemoryGateway::with_conflicts([pending("title")]);
        gateway.set_unavailable(true);
        assert!(matches!(
            gateway.list_conflicts().await,
            Err(GatewayError::Api { status: 503, .. })
        ));

        gateway.set_unavailable(false);
        assert_eq!(gateway.list_conflicts().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn create_conflict_validates_items() {
        let gateway = InMemoryGateway::new();
        let error = gateway
            .create_conflict(NewConflict {
                resource_type: ResourceType::Note,
                resource_id: "note-1".to_string(),
                conflicts: Vec::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, GatewayError::Rejected(_)));
        assert!(gateway.conflicts().is_empty());
    }
}
