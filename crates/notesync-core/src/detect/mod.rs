//! Conflict detection
//!
//! Field-level three-way comparison between a base version, the user's
//! in-flight edit and the server's current version. Edits that touch only one
//! side, or that converge on the same value, merge silently; only fields that
//! both sides changed to different values become `ConflictItem`s.

mod version;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::models::{ConflictItem, FieldValue, ResourceType, SyncConflict};
use crate::resolution::ResolutionEntry;

pub use version::{
    check_active_edit, check_version, is_recently_modified_by_other, ActiveEdit, VersionMismatch,
    VersionMismatchKind, CONCURRENT_EDIT_WINDOW_MINUTES,
};

/// The tracked fields of one version of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceSnapshot {
    fields: BTreeMap<String, FieldValue>,
}

impl ResourceSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field setter.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(field.into(), value.into());
    }

    /// Value of a field; missing fields read as `null`.
    pub fn get(&self, field: &str) -> &FieldValue {
        const NULL: &FieldValue = &FieldValue::Null;
        self.fields.get(field).unwrap_or(NULL)
    }

    /// Field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for ResourceSnapshot {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// Result of a three-way comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreeWayOutcome {
    /// Auto-merged fields; divergent fields keep their base value until resolved
    pub merged: ResourceSnapshot,
    /// One item per truly divergent field, in field-name order
    pub conflicts: Vec<ConflictItem>,
}

impl ThreeWayOutcome {
    /// Whether every field merged without user input.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Compare three versions field by field.
pub fn three_way(
    base: &ResourceSnapshot,
    local: &ResourceSnapshot,
    remote: &ResourceSnapshot,
) -> ThreeWayOutcome {
    let names = base
        .field_names()
        .chain(local.field_names())
        .chain(remote.field_names())
        .collect::<BTreeSet<_>>();

    let mut merged = ResourceSnapshot::new();
    let mut conflicts = Vec::new();

    for name in names {
        let base_value = base.get(name);
        let local_value = local.get(name);
        let remote_value = remote.get(name);

        if local_value == remote_value {
            merged.set(name, local_value.clone());
        } else if local_value == base_value {
            merged.set(name, remote_value.clone());
        } else if remote_value == base_value {
            merged.set(name, local_value.clone());
        } else {
            merged.set(name, base_value.clone());
            conflicts.push(
                ConflictItem::new(name, local_value.clone(), remote_value.clone())
                    .with_description(describe_divergence(name)),
            );
        }
    }

    tracing::debug!(
        fields = merged.fields.len(),
        conflicts = conflicts.len(),
        "Three-way comparison finished"
    );
    ThreeWayOutcome { merged, conflicts }
}

fn describe_divergence(field: &str) -> String {
    match field {
        "content" => "The content differs between both versions".to_string(),
        _ => format!("The {field} was changed in both versions"),
    }
}

/// Overlay the chosen values onto the auto-merged snapshot.
///
/// Entries whose item id is not part of `outcome` are ignored.
pub fn merged_with_resolution(
    outcome: &ThreeWayOutcome,
    resolutions: &[ResolutionEntry],
) -> ResourceSnapshot {
    let mut merged = outcome.merged.clone();
    for item in &outcome.conflicts {
        if let Some(entry) = resolutions.iter().find(|entry| entry.item_id == item.id) {
            merged.set(item.field.clone(), entry.value.clone());
        }
    }
    merged
}

/// Outcome of client-side detection for one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// Everything merged; submit `merged` against the current version
    Clean(ResourceSnapshot),
    /// At least one field needs an explicit choice
    Conflicted {
        merged: ResourceSnapshot,
        conflict: SyncConflict,
    },
}

/// Run the three-way comparison and wrap divergent fields in a fresh
/// pending `SyncConflict`.
pub fn detect(
    resource_type: ResourceType,
    resource_id: &str,
    base: &ResourceSnapshot,
    local: &ResourceSnapshot,
    remote: &ResourceSnapshot,
) -> Result<Detection> {
    let outcome = three_way(base, local, remote);
    if outcome.is_clean() {
        return Ok(Detection::Clean(outcome.merged));
    }

    let conflict = SyncConflict::new(resource_type, resource_id, outcome.conflicts)?;
    tracing::info!(
        conflict_id = %conflict.id,
        resource_type = %resource_type,
        resource_id,
        items = conflict.items().len(),
        "Detected divergent edits"
    );
    Ok(Detection::Conflicted {
        merged: outcome.merged,
        conflict,
    })
}
