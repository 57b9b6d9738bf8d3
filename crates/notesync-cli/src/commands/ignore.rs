use notesync_core::{ConflictGateway, ConflictStore};

use crate::commands::common::{refreshed, short_id};
use crate::error::CliError;

pub async fn run_ignore<G: ConflictGateway>(
    store: &ConflictStore<G>,
    id: &str,
) -> Result<(), CliError> {
    let conflict = refreshed(store, id).await?;
    let ignored = store.ignore(conflict.id()).await?;
    println!(
        "Ignored conflict {} on {} {}",
        short_id(&ignored.id()),
        ignored.resource_type,
        ignored.resource_id
    );
    Ok(())
}
