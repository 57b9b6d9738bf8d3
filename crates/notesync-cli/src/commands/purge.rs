use notesync_core::{ConflictGateway, ConflictStore};

use crate::error::CliError;

pub async fn run_purge<G: ConflictGateway>(store: &ConflictStore<G>) -> Result<(), CliError> {
    let removed = store.purge_resolved().await?;
    match removed {
        0 => println!("No resolved conflicts to purge."),
        1 => println!("Purged 1 resolved conflict."),
        count => println!("Purged {count} resolved conflicts."),
    }
    Ok(())
}
