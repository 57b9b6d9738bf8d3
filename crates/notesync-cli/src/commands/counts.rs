use notesync_core::ConflictStore;

use crate::error::CliError;

pub fn run_counts<G>(store: &ConflictStore<G>, as_json: bool) -> Result<(), CliError> {
    let counts = store.counts_by_status();

    if as_json {
        println!("{}", serde_json::to_string_pretty(&counts)?);
    } else {
        println!("pending   {}", counts.pending);
        println!("resolved  {}", counts.resolved);
        println!("ignored   {}", counts.ignored);
        println!("total     {}", counts.total);
    }
    Ok(())
}
