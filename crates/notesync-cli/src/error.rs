use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] notesync_core::Error),
    #[error(transparent)]
    Gateway(#[from] notesync_core::GatewayError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Conflict ID cannot be empty")]
    EmptyConflictId,
    #[error("Conflict not found for id/prefix: {0}")]
    ConflictNotFound(String),
    #[error("{0}")]
    AmbiguousConflictId(String),
    #[error("Invalid --pick '{0}': expected ITEM=local|remote|custom:VALUE")]
    InvalidPick(String),
    #[error("No item matches '{0}' in this conflict")]
    ItemNotFound(String),
    #[error("Choose --pick, --all-local or --all-remote")]
    NoResolutionGiven,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(
        "The notes API is not configured. Run `notesync config set --api-url URL` or set NOTESYNC_API_URL."
    )]
    ApiNotConfigured,
}
