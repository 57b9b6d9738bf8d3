use notesync_core::ConflictStore;

use crate::commands::common::format_conflict_lines;
use crate::error::CliError;

pub fn run_list<G>(
    store: &ConflictStore<G>,
    pending_only: bool,
    as_json: bool,
) -> Result<(), CliError> {
    let conflicts = if pending_only {
        store.pending_only()
    } else {
        store.snapshot().to_vec()
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&conflicts)?);
        return Ok(());
    }

    if conflicts.is_empty() {
        println!("No conflicts.");
        return Ok(());
    }

    for line in format_conflict_lines(&conflicts) {
        println!("{line}");
    }
    Ok(())
}
