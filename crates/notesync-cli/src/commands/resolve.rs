use notesync_core::resolution::select_choice;
use notesync_core::{Choice, ConflictGateway, ConflictStore, FieldValue, ItemId, SyncConflict};

use crate::commands::common::{refreshed, short_id};
use crate::error::CliError;

/// One `--pick ITEM=CHOICE` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pick {
    /// Field name or item id
    pub item: String,
    pub choice: Choice,
    pub custom: Option<FieldValue>,
}

pub fn parse_pick(raw: &str) -> Result<Pick, CliError> {
    let invalid = || CliError::InvalidPick(raw.to_string());
    let (item, choice) = raw.split_once('=').ok_or_else(invalid)?;
    let item = item.trim();
    if item.is_empty() {
        return Err(invalid());
    }

    let (choice, custom) = match choice.split_once(':') {
        Some((name, value)) if name.trim().eq_ignore_ascii_case("custom") => {
            (Choice::Custom, Some(FieldValue::text(value)))
        }
        Some(_) => return Err(invalid()),
        None => (choice.parse::<Choice>().map_err(|_| invalid())?, None),
    };

    Ok(Pick {
        item: item.to_string(),
        choice,
        custom,
    })
}

/// Apply picks to a working copy, matching items by id first, then field name.
pub fn apply_picks(conflict: &mut SyncConflict, picks: &[Pick]) -> Result<(), CliError> {
    for pick in picks {
        let item_id = find_item(conflict, &pick.item)?;
        select_choice(conflict, &item_id, pick.choice, pick.custom.clone())?;
    }
    Ok(())
}

fn find_item(conflict: &SyncConflict, selector: &str) -> Result<ItemId, CliError> {
    if let Ok(id) = selector.parse::<ItemId>() {
        if conflict.item(&id).is_some() {
            return Ok(id);
        }
    }

    let mut by_field = conflict
        .items()
        .iter()
        .filter(|item| item.field.eq_ignore_ascii_case(selector));
    match (by_field.next(), by_field.next()) {
        (Some(item), None) => Ok(item.id()),
        _ => Err(CliError::ItemNotFound(selector.to_string())),
    }
}

pub async fn run_resolve<G: ConflictGateway>(
    store: &ConflictStore<G>,
    id: &str,
    picks: &[String],
    all_local: bool,
    all_remote: bool,
) -> Result<(), CliError> {
    let conflict = refreshed(store, id).await?;

    let resolved = if all_local {
        store.accept_all_local(conflict.id()).await?
    } else if all_remote {
        store.accept_all_remote(conflict.id()).await?
    } else if picks.is_empty() {
        return Err(CliError::NoResolutionGiven);
    } else {
        let picks = picks
            .iter()
            .map(|raw| parse_pick(raw))
            .collect::<Result<Vec<_>, _>>()?;
        let mut working_copy = store.working_copy(&conflict.id())?;
        apply_picks(&mut working_copy, &picks)?;
        store.submit_resolution(&working_copy).await?
    };

    println!(
        "Resolved conflict {} on {} {}",
        short_id(&resolved.id()),
        resolved.resource_type,
        resolved.resource_id
    );
    Ok(())
}
