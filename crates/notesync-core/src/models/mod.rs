//! Data models for notesync

mod conflict_item;
mod sync_conflict;
mod value;

pub use conflict_item::{Choice, ConflictItem, ItemId};
pub use sync_conflict::{
    ConflictCounts, ConflictId, ConflictStatus, Outcome, ResourceType, SyncConflict,
};
pub use value::FieldValue;
