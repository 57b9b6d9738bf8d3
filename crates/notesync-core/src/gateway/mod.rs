//! Conflict submission gateway
//!
//! The authoritative side of the conflict lifecycle. The store reads
//! conflicts through this trait and never applies a write locally before the
//! gateway has confirmed it.

mod http;
mod memory;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{ConflictId, ConflictItem, ResourceType, SyncConflict};
use crate::resolution::ResolutionEntry;

pub use http::HttpConflictGateway;
pub use memory::InMemoryGateway;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid gateway configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Gateway HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Gateway API error: {message} ({status})")]
    Api { status: u16, message: String },
    #[error("Conflict not found: {0}")]
    NotFound(ConflictId),
    #[error("Gateway rejected request: {0}")]
    Rejected(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Body of `POST conflicts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConflict {
    pub resource_type: ResourceType,
    pub resource_id: String,
    pub conflicts: Vec<ConflictItem>,
}

/// Body of `POST conflicts/{id}/resolve`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveRequest {
    pub resolutions: Vec<ResolutionEntry>,
}

/// Remote operations on the authoritative conflict collection.
pub trait ConflictGateway: Send + Sync {
    /// `GET conflicts`
    fn list_conflicts(&self) -> impl Future<Output = GatewayResult<Vec<SyncConflict>>> + Send;

    /// `GET conflicts/{id}`
    fn get_conflict(
        &self,
        id: ConflictId,
    ) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `POST conflicts/{id}/resolve`
    fn resolve(
        &self,
        id: ConflictId,
        resolutions: Vec<ResolutionEntry>,
    ) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `POST conflicts/{id}/ignore`
    fn ignore(&self, id: ConflictId) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `POST conflicts/{id}/accept-local`
    fn accept_local(
        &self,
        id: ConflictId,
    ) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `POST conflicts/{id}/accept-remote`
    fn accept_remote(
        &self,
        id: ConflictId,
    ) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `POST conflicts`
    fn create_conflict(
        &self,
        request: NewConflict,
    ) -> impl Future<Output = GatewayResult<SyncConflict>> + Send;

    /// `DELETE conflicts/resolved`
    fn delete_resolved(&self) -> impl Future<Output = GatewayResult<()>> + Send;
}
