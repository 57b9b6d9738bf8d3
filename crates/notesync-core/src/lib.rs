//! notesync-core - Conflict handling for notesync
//!
//! This crate contains the conflict model, the resolution engine, client-side
//! three-way detection, the gateway to the notes API, and the reactive store
//! used by every notesync interface.

pub mod config;
pub mod detect;
pub mod error;
pub mod gateway;
pub mod models;
pub mod resolution;
pub mod store;
pub mod util;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use gateway::{ConflictGateway, GatewayError, HttpConflictGateway, InMemoryGateway};
pub use models::{
    Choice, ConflictCounts, ConflictId, ConflictItem, ConflictStatus, FieldValue, ItemId, Outcome,
    ResourceType, SyncConflict,
};
pub use store::{ConflictStore, StoreEvent};
