//! Error types for notesync-core

use thiserror::Error;

use crate::gateway::GatewayError;
use crate::models::{ConflictId, ConflictStatus, ItemId, Outcome};

/// Result type alias using notesync-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in notesync-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Reading conflicts from the gateway failed; local state is unchanged
    #[error("Failed to fetch conflicts: {0}")]
    Fetch(#[source] GatewayError),

    /// A payload was requested before every item had a usable choice
    #[error("Resolution is incomplete: {} item(s) unresolved", unresolved.len())]
    IncompleteResolution {
        /// Items still lacking a valid selection, in aggregate order
        unresolved: Vec<ItemId>,
    },

    /// The aggregate is already closed
    #[error("Conflict {id} is {status}; cannot mark it {outcome}")]
    InvalidTransition {
        id: ConflictId,
        status: ConflictStatus,
        outcome: Outcome,
    },

    /// The gateway rejected a write; local state is unchanged
    #[error("Conflict submission failed: {0}")]
    Submission(#[source] GatewayError),

    /// Conflict not present in the store
    #[error("Conflict not found: {0}")]
    NotFound(ConflictId),

    /// Item not present in the addressed conflict
    #[error("Conflict item {item} not found in conflict {conflict}")]
    ItemNotFound { conflict: ConflictId, item: ItemId },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
