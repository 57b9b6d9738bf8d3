use chrono::{DateTime, Utc};
use notesync_core::resolution::progress;
use notesync_core::{
    ConflictGateway, ConflictId, ConflictStore, FieldValue, GatewayConfig, HttpConflictGateway,
    SyncConflict,
};

use crate::cli::ApiArgs;
use crate::config::{effective_gateway_config, CliConfig};
use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

/// Build the HTTP-backed store from flags, env and config file, then load it.
pub async fn open_store(api: &ApiArgs) -> Result<ConflictStore<HttpConflictGateway>, CliError> {
    let file = CliConfig::load().map_err(CliError::Config)?;
    let config = effective_gateway_config(api, GatewayConfig::from_env(), &file);
    if config.api_base_url.is_none() {
        return Err(CliError::ApiNotConfigured);
    }

    let store = ConflictStore::new(HttpConflictGateway::new(&config)?);
    store.load().await?;
    Ok(store)
}

pub fn normalize_conflict_identifier(id: &str) -> Result<String, CliError> {
    let trimmed = id.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptyConflictId)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Find a loaded conflict by full id or unique id prefix.
pub fn resolve_conflict_id<G>(
    store: &ConflictStore<G>,
    query: &str,
) -> Result<ConflictId, CliError> {
    let query = normalize_conflict_identifier(query)?;
    if let Ok(id) = query.parse::<ConflictId>() {
        if store.get(&id).is_some() {
            return Ok(id);
        }
    }

    let needle = query.to_ascii_lowercase();
    let matching = store
        .snapshot()
        .iter()
        .map(|conflict| conflict.id())
        .filter(|id| id.to_string().starts_with(&needle))
        .collect::<Vec<_>>();

    match matching.as_slice() {
        [] => Err(CliError::ConflictNotFound(query)),
        [id] => Ok(*id),
        _ => {
            let options = matching
                .iter()
                .take(3)
                .map(short_id)
                .collect::<Vec<_>>()
                .join(", ");
            Err(CliError::AmbiguousConflictId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

/// Fetch the freshest copy of a conflict before acting on it.
pub async fn refreshed<G: ConflictGateway>(
    store: &ConflictStore<G>,
    query: &str,
) -> Result<SyncConflict, CliError> {
    let id = resolve_conflict_id(store, query)?;
    Ok(store.fetch(id).await?)
}

pub fn short_id(id: &ConflictId) -> String {
    id.to_string().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_conflict_lines(conflicts: &[SyncConflict]) -> Vec<String> {
    let now = Utc::now();
    conflicts
        .iter()
        .map(|conflict| {
            let short_id = short_id(&conflict.id());
            let resource = format!("{}:{}", conflict.resource_type, conflict.resource_id);
            let progress = progress(conflict);
            let items = format!("{}/{} items", progress.resolved, progress.total);
            let status = conflict.status().to_string();
            let age = format_relative_time(conflict.created_at, now);
            format!("{short_id:<13}  {status:<8}  {resource:<24}  {items:<11}  {age}")
        })
        .collect()
}

pub fn format_conflict_detail(conflict: &SyncConflict) -> Vec<String> {
    let progress = progress(conflict);
    let mut lines = vec![
        format!("Conflict {}", conflict.id()),
        format!(
            "Resource: {} {}",
            conflict.resource_type, conflict.resource_id
        ),
        format!("Status:   {}", conflict.status()),
        format!(
            "Detected: {}",
            conflict.created_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
    ];
    if let Some(resolved_at) = conflict.resolved_at() {
        lines.push(format!(
            "Resolved: {}",
            resolved_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }
    lines.push(format!(
        "Progress: {} of {} items resolved ({}%)",
        progress.resolved,
        progress.total,
        progress.percent()
    ));

    for item in conflict.items() {
        lines.push(String::new());
        let choice = item
            .selected()
            .map_or_else(|| "unset".to_string(), |choice| choice.to_string());
        lines.push(format!("[{}] {} ({choice})", item.id(), item.field));
        if let Some(description) = &item.description {
            lines.push(format!("  {description}"));
        }
        lines.push(format!("  local:  {}", preview_value(&item.local_value, 60)));
        lines.push(format!("  remote: {}", preview_value(&item.remote_value, 60)));
        if let Some(value) = item.final_value() {
            lines.push(format!("  final:  {}", preview_value(value, 60)));
        }
    }
    lines
}

/// Single-line rendering of a field value, truncated to `max_chars`.
pub fn preview_value(value: &FieldValue, max_chars: usize) -> String {
    let rendered = value.to_string();
    let collapsed = rendered.split_whitespace().collect::<Vec<_>>().join(" ");

    if collapsed.chars().count() <= max_chars {
        collapsed
    } else {
        let take_len = max_chars.saturating_sub(3);
        let mut truncated = collapsed.chars().take(take_len).collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp).num_seconds().max(0);
    let minute = 60;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else {
        format!("{}w ago", diff / week)
    }
}
