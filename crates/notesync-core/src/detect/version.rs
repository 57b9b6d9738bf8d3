//! Optimistic version check

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Edits landing within this many minutes of each other count as simultaneous.
pub const CONCURRENT_EDIT_WINDOW_MINUTES: i64 = 5;

/// How far the caller's base version lags behind the current version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VersionMismatchKind {
    /// Exactly one newer version, written moments ago
    ConcurrentEdit,
    /// The base is older than that
    Stale,
}

/// Signal that a write was based on an outdated version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionMismatch {
    pub current_version: u64,
    pub expected_version: u64,
    /// When the current version was written
    pub last_modified_at: DateTime<Utc>,
    pub kind: VersionMismatchKind,
}

/// Warning that someone else edited a resource moments ago.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEdit {
    pub last_modified_by: String,
    pub last_modified_at: DateTime<Utc>,
}

/// Compare the caller's base version with the current one.
///
/// Returns `None` when they match and the write can proceed.
pub fn check_version(
    current_version: u64,
    expected_version: u64,
    last_modified_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<VersionMismatch> {
    if current_version == expected_version {
        return None;
    }

    let recent = now.signed_duration_since(last_modified_at)
        < Duration::minutes(CONCURRENT_EDIT_WINDOW_MINUTES);
    let kind = if current_version.checked_sub(expected_version) == Some(1) && recent {
        VersionMismatchKind::ConcurrentEdit
    } else {
        VersionMismatchKind::Stale
    };

    tracing::debug!(
        current_version,
        expected_version,
        ?kind,
        "Version mismatch detected"
    );
    Some(VersionMismatch {
        current_version,
        expected_version,
        last_modified_at,
        kind,
    })
}

/// Whether a user other than `user` wrote the resource less than `threshold` ago.
pub fn is_recently_modified_by_other(
    last_modified_by: &str,
    user: &str,
    last_modified_at: DateTime<Utc>,
    now: DateTime<Utc>,
    threshold: Duration,
) -> bool {
    last_modified_by != user && now.signed_duration_since(last_modified_at) < threshold
}

/// Check for another user's edit within the concurrent-edit window.
///
/// Meant to run before an editor opens, so the user is warned before a
/// version mismatch happens.
pub fn check_active_edit(
    last_modified_by: &str,
    user: &str,
    last_modified_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<ActiveEdit> {
    let window = Duration::minutes(CONCURRENT_EDIT_WINDOW_MINUTES);
    if !is_recently_modified_by_other(last_modified_by, user, last_modified_at, now, window) {
        return None;
    }

    tracing::debug!(last_modified_by, "Resource recently modified by another user");
    Some(ActiveEdit {
        last_modified_by: last_modified_by.to_string(),
        last_modified_at,
    })
}
