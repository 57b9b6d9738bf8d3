//! notesync CLI - Review and resolve note sync conflicts
//!
//! Lists, inspects and resolves the conflicts the notes API reports.

mod cli;
mod commands;
mod config;
mod error;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::open_store;
use crate::commands::config::run_config;
use crate::commands::counts::run_counts;
use crate::commands::ignore::run_ignore;
use crate::commands::list::run_list;
use crate::commands::purge::run_purge;
use crate::commands::resolve::run_resolve;
use crate::commands::show::run_show;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "notesync=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config { command } => run_config(command, &cli.api)?,
        Commands::List { pending, json } => {
            let store = open_store(&cli.api).await?;
            run_list(&store, pending, json)?;
        }
        Commands::Show { id, json } => {
            let store = open_store(&cli.api).await?;
            run_show(&store, &id, json).await?;
        }
        Commands::Counts { json } => {
            let store = open_store(&cli.api).await?;
            run_counts(&store, json)?;
        }
        Commands::Resolve {
            id,
            picks,
            all_local,
            all_remote,
        } => {
            let store = open_store(&cli.api).await?;
            run_resolve(&store, &id, &picks, all_local, all_remote).await?;
        }
        Commands::Ignore { id } => {
            let store = open_store(&cli.api).await?;
            run_ignore(&store, &id).await?;
        }
        Commands::Purge => {
            let store = open_store(&cli.api).await?;
            run_purge(&store).await?;
        }
    }

    Ok(())
}
