use notesync_core::{ConflictGateway, ConflictStore};

use crate::commands::common::{format_conflict_detail, refreshed};
use crate::error::CliError;

pub async fn run_show<G: ConflictGateway>(
    store: &ConflictStore<G>,
    id: &str,
    as_json: bool,
) -> Result<(), CliError> {
    let conflict = refreshed(store, id).await?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&conflict)?);
    } else {
        for line in format_conflict_detail(&conflict) {
            println!("{line}");
        }
    }
    Ok(())
}
