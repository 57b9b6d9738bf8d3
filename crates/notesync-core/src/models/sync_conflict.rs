//! Sync conflict model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::conflict_item::{ConflictItem, ItemId};
use crate::error::{Error, Result};

/// A unique identifier for a sync conflict, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConflictId(Uuid);

impl ConflictId {
    /// Create a new unique conflict ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ConflictId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConflictId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Kind of resource a conflict was detected on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Note,
    Folder,
    Settings,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Note => "note",
            Self::Folder => "folder",
            Self::Settings => "settings",
        };
        f.write_str(label)
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "note" => Ok(Self::Note),
            "folder" => Ok(Self::Folder),
            "settings" => Ok(Self::Settings),
            other => Err(format!("unknown resource type '{other}'")),
        }
    }
}

/// Lifecycle status of a sync conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConflictStatus {
    /// Awaiting a decision
    #[default]
    Pending,
    /// Closed with a merged result
    Resolved,
    /// Closed without merging
    Ignored,
}

impl ConflictStatus {
    /// Whether no further transition is possible.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Ignored)
    }
}

impl fmt::Display for ConflictStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Resolved => "resolved",
            Self::Ignored => "ignored",
        };
        f.write_str(label)
    }
}

/// Terminal outcome applied to a pending conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Resolved,
    Ignored,
}

impl From<Outcome> for ConflictStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Resolved => Self::Resolved,
            Outcome::Ignored => Self::Ignored,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ConflictStatus::from(*self).fmt(f)
    }
}

/// All field-level conflicts detected for one resource version pair.
///
/// An aggregate is created `pending` and moves to `resolved` or `ignored`
/// exactly once; a fresh divergence on the same resource gets a new
/// aggregate rather than reopening this one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConflict {
    pub(crate) id: ConflictId,
    /// Kind of resource involved
    pub resource_type: ResourceType,
    /// Identifier of the note, folder, or settings record
    pub resource_id: String,
    pub(crate) conflicts: Vec<ConflictItem>,
    #[serde(default)]
    pub(crate) status: ConflictStatus,
    /// Detection timestamp
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) resolved_at: Option<DateTime<Utc>>,
}

impl SyncConflict {
    /// Create a pending conflict from the diverging items of a resource.
    pub fn new(
        resource_type: ResourceType,
        resource_id: impl Into<String>,
        conflicts: Vec<ConflictItem>,
    ) -> Result<Self> {
        let resource_id = resource_id.into().trim().to_string();
        if resource_id.is_empty() {
            return Err(Error::InvalidInput(
                "Conflict resource_id cannot be empty".to_string(),
            ));
        }
        if conflicts.is_empty() {
            return Err(Error::InvalidInput(
                "Conflict must contain at least one item".to_string(),
            ));
        }

        let conflict = Self {
            id: ConflictId::new(),
            resource_type,
            resource_id,
            conflicts,
            status: ConflictStatus::Pending,
            created_at: Utc::now(),
            resolved_at: None,
        };
        conflict.validate()?;
        Ok(conflict)
    }

    /// Identifier, fixed at creation.
    ///
    /// ```compile_fail
    /// use notesync_core::{ConflictId, ConflictItem, ResourceType, SyncConflict};
    ///
    /// let items = vec![ConflictItem::new("title", "B", "C")];
    /// let mut conflict = SyncConflict::new(ResourceType::Note, "note-1", items).unwrap();
    /// conflict.id = ConflictId::new();
    /// ```
    pub const fn id(&self) -> ConflictId {
        self.id
    }

    /// Field-level items, in detection order.
    pub fn items(&self) -> &[ConflictItem] {
        &self.conflicts
    }

    /// Look up an item by id.
    pub fn item(&self, id: &ItemId) -> Option<&ConflictItem> {
        self.conflicts.iter().find(|item| item.id == *id)
    }

    /// Current lifecycle status.
    pub const fn status(&self) -> ConflictStatus {
        self.status
    }

    /// Whether the conflict still awaits a decision.
    pub fn is_pending(&self) -> bool {
        self.status == ConflictStatus::Pending
    }

    pub fn is_resolved(&self) -> bool {
        self.status == ConflictStatus::Resolved
    }

    /// When the conflict was resolved, if it was.
    pub const fn resolved_at(&self) -> Option<DateTime<Utc>> {
        self.resolved_at
    }

    /// Check the invariants every stored conflict must hold.
    ///
    /// Item ids are unique, and a `resolved` conflict has every item resolved.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.conflicts.len());
        for item in &self.conflicts {
            if !seen.insert(item.id) {
                return Err(Error::InvalidInput(format!(
                    "Conflict {} contains duplicate item id {}",
                    self.id, item.id
                )));
            }
        }

        if self.is_resolved() {
            let unresolved = self
                .conflicts
                .iter()
                .filter(|item| !item.is_resolved())
                .count();
            if unresolved > 0 || self.conflicts.is_empty() {
                return Err(Error::InvalidInput(format!(
                    "Conflict {} is resolved but {unresolved} of {} item(s) are unresolved",
                    self.id,
                    self.conflicts.len()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn item_mut(&mut self, id: &ItemId) -> Result<&mut ConflictItem> {
        let conflict = self.id;
        self.conflicts
            .iter_mut()
            .find(|item| item.id == *id)
            .ok_or(Error::ItemNotFound {
                conflict,
                item: *id,
            })
    }
}

/// Number of conflicts per status over one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConflictCounts {
    pub pending: usize,
    pub resolved: usize,
    pub ignored: usize,
    pub total: usize,
}

impl ConflictCounts {
    /// Tally the statuses of a collection.
    pub fn tally<'a>(conflicts: impl IntoIterator<Item = &'a SyncConflict>) -> Self {
        conflicts
            .into_iter()
            .fold(Self::default(), |mut counts, conflict| {
                match conflict.status {
                    ConflictStatus::Pending => counts.pending += 1,
                    ConflictStatus::Resolved => counts.resolved += 1,
                    ConflictStatus::Ignored => counts.ignored += 1,
                }
                counts.total += 1;
                counts
            })
    }
}
