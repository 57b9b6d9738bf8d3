//! Conflict item model

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::value::FieldValue;

/// A unique identifier for a conflict item, using UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Create a new unique item ID using UUID v7
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

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ItemId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Which side of a conflict the user picked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    /// Keep the user's in-flight edit
    Local,
    /// Take the server's current value
    Remote,
    /// Use a hand-written value
    Custom,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::Custom => "custom",
        };
        f.write_str(label)
    }
}

impl FromStr for Choice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            "custom" => Ok(Self::Custom),
            other => Err(format!(
                "unknown choice '{other}' (expected local, remote or custom)"
            )),
        }
    }
}

/// A single field-level disagreement between a local and a remote version.
///
/// `resolved` is derived state: it is recomputed whenever the selection or
/// the custom value changes, and on deserialization, so it can never drift
/// from the selection it summarizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ConflictItemRecord")]
pub struct ConflictItem {
    pub(crate) id: ItemId,
    /// Name of the diverging field (e.g. `title`, `content`, `tags`)
    pub field: String,
    /// The user's in-flight value
    pub local_value: FieldValue,
    /// The server's current value
    pub remote_value: FieldValue,
    resolved: bool,
    #[serde(rename = "selectedValue")]
    selected: Option<Choice>,
    custom_value: Option<FieldValue>,
    /// Human-readable explanation shown next to the field
    pub description: Option<String>,
    /// When the divergence was detected
    pub timestamp: DateTime<Utc>,
}

impl ConflictItem {
    /// Create an unresolved item for a diverging field.
    pub fn new(
        field: impl Into<String>,
        local_value: impl Into<FieldValue>,
        remote_value: impl Into<FieldValue>,
    ) -> Self {
        Self {
            id: ItemId::new(),
            field: field.into(),
            local_value: local_value.into(),
            remote_value: remote_value.into(),
            resolved: false,
            selected: None,
            custom_value: None,
            description: None,
            timestamp: Utc::now(),
        }
    }

    /// Identifier, unique within the parent aggregate and fixed at creation.
    ///
    /// ```compile_fail
    /// use notesync_core::{ConflictItem, ItemId};
    ///
    /// let mut item = ConflictItem::new("title", "B", "C");
    /// item.id = ItemId::new();
    /// ```
    pub const fn id(&self) -> ItemId {
        self.id
    }

    /// Attach a description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the item currently has a usable selection.
    pub const fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// The current selection, `None` while unset.
    pub const fn selected(&self) -> Option<Choice> {
        self.selected
    }

    /// The working value for a custom selection (seeded on local/remote picks).
    pub const fn custom_value(&self) -> Option<&FieldValue> {
        self.custom_value.as_ref()
    }

    /// The value this item resolves to, if resolved.
    pub fn final_value(&self) -> Option<&FieldValue> {
        if !self.resolved {
            return None;
        }
        match self.selected? {
            Choice::Local => Some(&self.local_value),
            Choice::Remote => Some(&self.remote_value),
            Choice::Custom => self.custom_value.as_ref(),
        }
    }

    pub(crate) fn select(&mut self, choice: Choice, custom: Option<FieldValue>) {
        self.selected = Some(choice);
        match choice {
            Choice::Local => self.custom_value = Some(self.local_value.clone()),
            Choice::Remote => self.custom_value = Some(self.remote_value.clone()),
            Choice::Custom => {
                if let Some(value) = custom {
                    self.custom_value = Some(value);
                }
            }
        }
        self.refresh_resolved();
    }

    pub(crate) fn set_custom(&mut self, value: FieldValue) {
        self.custom_value = Some(value);
        self.refresh_resolved();
    }

    fn refresh_resolved(&mut self) {
        self.resolved = compute_resolved(self.selected, self.custom_value.as_ref());
    }
}

/// `resolved` holds iff a choice is made and a custom choice carries a
/// non-empty value.
pub(crate) fn compute_resolved(selected: Option<Choice>, custom: Option<&FieldValue>) -> bool {
    match selected {
        None => false,
        Some(Choice::Local | Choice::Remote) => true,
        Some(Choice::Custom) => custom.is_some_and(|value| !value.is_empty()),
    }
}

/// Wire shape accepted from the gateway; `resolved` is ignored and recomputed.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConflictItemRecord {
    id: ItemId,
    field: String,
    #[serde(default)]
    local_value: FieldValue,
    #[serde(default)]
    remote_value: FieldValue,
    #[serde(default, deserialize_with = "deserialize_selection")]
    selected_value: Option<Choice>,
    #[serde(default)]
    custom_value: Option<FieldValue>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "Utc::now")]
    timestamp: DateTime<Utc>,
}

/// `null`, a missing field and `"unset"` all mean no selection.
fn deserialize_selection<'de, D>(deserializer: D) -> Result<Option<Choice>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref() {
        None | Some("unset") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(de::Error::custom),
    }
}

impl From<ConflictItemRecord> for ConflictItem {
    fn from(record: ConflictItemRecord) -> Self {
        let custom_value = record.custom_value;
        Self {
            id: record.id,
            field: record.field,
            local_value: record.local_value,
            remote_value: record.remote_value,
            resolved: compute_resolved(record.selected_value, custom_value.as_ref()),
            selected: record.selected_value,
            custom_value,
            description: record.description,
            timestamp: record.timestamp,
        }
    }
}
