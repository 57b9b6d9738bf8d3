//! Resolution engine
//!
//! Turns per-item user choices into a validated resolution payload and
//! applies terminal outcomes to a conflict. The functions here operate on a
//! borrowed aggregate (usually a working copy) and keep nothing afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{Choice, ConflictStatus, FieldValue, ItemId, Outcome, SyncConflict};

/// One item of a resolution request sent to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionEntry {
    pub item_id: ItemId,
    pub value: FieldValue,
    pub source: Choice,
}

/// "n of m items resolved" for progress display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionProgress {
    pub resolved: usize,
    pub total: usize,
}

impl ResolutionProgress {
    /// Completion percentage; an empty conflict counts as complete.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let percent = self.resolved.saturating_mul(100) / self.total;
        u8::try_from(percent.min(100)).unwrap_or(100)
    }
}

/// Record the user's choice for one item.
///
/// `Local` and `Remote` seed the custom value from that side so switching to
/// `Custom` afterwards starts from it. `Custom` uses `custom` when given and
/// otherwise keeps whatever was typed before.
pub fn select_choice(
    conflict: &mut SyncConflict,
    item_id: &ItemId,
    choice: Choice,
    custom: Option<FieldValue>,
) -> Result<()> {
    let item = conflict.item_mut(item_id)?;
    item.select(choice, custom);
    tracing::debug!(
        conflict_id = %conflict.id,
        item_id = %item_id,
        choice = %choice,
        "Selected conflict resolution choice"
    );
    Ok(())
}

/// Update the free-text value of an item whose selection is `Custom`.
pub fn set_custom_value(
    conflict: &mut SyncConflict,
    item_id: &ItemId,
    value: impl Into<FieldValue>,
) -> Result<()> {
    let item = conflict.item_mut(item_id)?;
    if item.selected() != Some(Choice::Custom) {
        return Err(Error::InvalidInput(format!(
            "Item {item_id} must select the custom choice before a custom value can be set"
        )));
    }
    item.set_custom(value.into());
    Ok(())
}

/// Whether every item has a usable choice; gates submission.
pub fn is_fully_resolved(conflict: &SyncConflict) -> bool {
    !conflict.items().is_empty() && conflict.items().iter().all(|item| item.is_resolved())
}

/// Count resolved items.
pub fn progress(conflict: &SyncConflict) -> ResolutionProgress {
    ResolutionProgress {
        resolved: conflict
            .items()
            .iter()
            .filter(|item| item.is_resolved())
            .count(),
        total: conflict.items().len(),
    }
}

/// Build the payload for `POST conflict/{id}/resolve`.
///
/// Entries follow item order. Fails without side effects when any item is
/// still unresolved.
pub fn build_resolution_payload(conflict: &SyncConflict) -> Result<Vec<ResolutionEntry>> {
    ensure_fully_resolved(conflict)?;

    conflict
        .items()
        .iter()
        .map(|item| {
            let (Some(source), Some(value)) = (item.selected(), item.final_value()) else {
                return Err(Error::IncompleteResolution {
                    unresolved: vec![item.id],
                });
            };
            Ok(ResolutionEntry {
                item_id: item.id,
                value: value.clone(),
                source,
            })
        })
        .collect()
}

/// Pick the local side for every item.
pub fn accept_all_local(conflict: &mut SyncConflict) {
    select_all(conflict, Choice::Local);
}

/// Pick the remote side for every item.
pub fn accept_all_remote(conflict: &mut SyncConflict) {
    select_all(conflict, Choice::Remote);
}

fn select_all(conflict: &mut SyncConflict, choice: Choice) {
    for item in &mut conflict.conflicts {
        item.select(choice, None);
    }
}

/// Close a pending conflict.
///
/// This is the only status transition; closed conflicts stay closed.
/// `Resolved` additionally requires every item to be resolved.
pub fn apply_outcome(
    conflict: &mut SyncConflict,
    outcome: Outcome,
    now: DateTime<Utc>,
) -> Result<()> {
    ensure_pending(conflict, outcome)?;
    if outcome == Outcome::Resolved {
        ensure_fully_resolved(conflict)?;
    }
    conflict.status = outcome.into();
    if outcome == Outcome::Resolved {
        conflict.resolved_at = Some(now);
    }
    tracing::debug!(conflict_id = %conflict.id, outcome = %outcome, "Applied conflict outcome");
    Ok(())
}

fn ensure_fully_resolved(conflict: &SyncConflict) -> Result<()> {
    if is_fully_resolved(conflict) {
        return Ok(());
    }
    Err(Error::IncompleteResolution {
        unresolved: conflict
            .items()
            .iter()
            .filter(|item| !item.is_resolved())
            .map(|item| item.id)
            .collect(),
    })
}

/// Fail with `InvalidTransition` unless the conflict is pending.
pub fn ensure_pending(conflict: &SyncConflict, outcome: Outcome) -> Result<()> {
    if conflict.status() == ConflictStatus::Pending {
        Ok(())
    } else {
        Err(Error::InvalidTransition {
            id: conflict.id,
            status: conflict.status(),
            outcome,
        })
    }
}
