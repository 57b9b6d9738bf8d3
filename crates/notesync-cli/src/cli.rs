use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "notesync")]
#[command(about = "Review and resolve note sync conflicts from the command line")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub api: ApiArgs,
}

/// Overrides for the notes API connection; these win over env and config file.
#[derive(Args, Debug, Default, Clone)]
pub struct ApiArgs {
    /// Notes API base URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Bearer token for the notes API
    #[arg(long, global = true, value_name = "TOKEN")]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List conflicts
    #[command(alias = "ls")]
    List {
        /// Only show conflicts awaiting a decision
        #[arg(long)]
        pending: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the items of one conflict
    Show {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Count conflicts by status
    Counts {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Resolve a pending conflict
    Resolve {
        /// Conflict ID or unique ID prefix
        id: String,
        /// Per-item choice: ITEM=local, ITEM=remote or ITEM=custom:VALUE.
        /// ITEM is the field name or the item ID.
        #[arg(long = "pick", value_name = "ITEM=CHOICE", conflicts_with_all = ["all_local", "all_remote"])]
        picks: Vec<String>,
        /// Keep the local value for every item
        #[arg(long, conflicts_with = "all_remote")]
        all_local: bool,
        /// Take the remote value for every item
        #[arg(long)]
        all_remote: bool,
    },
    /// Close a pending conflict without applying either side
    Ignore {
        /// Conflict ID or unique ID prefix
        id: String,
    },
    /// Delete resolved conflicts
    Purge,
    /// Manage the persisted CLI configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Persist the given --api-url, --token and --timeout to the config file
    Set {
        /// Request timeout in seconds
        #[arg(long = "timeout", value_name = "SECONDS")]
        request_timeout_secs: Option<u64>,
    },
    /// Print the effective configuration
    Show,
}
