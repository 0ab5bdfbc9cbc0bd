//! # reslist
//!
//! Browse and edit a paginated JSON fixture through a reslist
//! `ResourceManager`.
//!
//! ## Commands
//!
//! - `list`: Load the first page (or every page with `--all`)
//! - `add`: Insert a record
//! - `update`: Update a record by id
//! - `delete`: Delete a record by id
//! - `set`: Patch one field of a loaded record locally
//!
//! ## Example
//!
//! ```bash
//! # Walk every page
//! reslist --config reslist.toml list --all
//!
//! # Insert and then rename a record
//! reslist add '{"name": "Ada"}'
//! reslist update 1 '{"name": "Ada Lovelace"}'
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use list_types::RecordId;
use serde_json::Value;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod store;

use commands::{add, delete, list, set, update};
use config::CliConfig;

/// Browse and edit a paginated JSON fixture.
#[derive(Parser, Debug)]
#[command(name = "reslist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file (default: ./reslist.toml if present)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Fixture file, overriding the configured one
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Load and print records
    List {
        /// Follow next pages until the last one
        #[arg(long)]
        all: bool,
    },

    /// Insert a record
    Add {
        /// Record as JSON
        data: Value,

        /// Read the stored record from this response field
        #[arg(long)]
        result_key: Option<String>,
    },

    /// Update a record
    Update {
        /// Record id
        id: RecordId,

        /// Fields to change, as JSON
        data: Value,
    },

    /// Delete a record
    Delete {
        /// Record id
        id: RecordId,
    },

    /// Set one field of a loaded record without writing it back
    Set {
        /// Record id
        id: RecordId,

        /// Field to set
        key: String,

        /// New value, as JSON
        value: Value,

        /// Match on this field instead of the id field
        #[arg(long)]
        match_key: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = CliConfig::load(cli.config.as_deref()).await?;
    if let Some(fixture) = cli.fixture {
        config.fixture.path = fixture;
    }
    let manager = commands::manager(&config);

    match cli.command {
        Commands::List { all } => {
            list::run(&manager, all).await?;
        }
        Commands::Add { data, result_key } => {
            add::run(&manager, data, result_key.as_deref()).await?;
        }
        Commands::Update { id, data } => {
            update::run(&manager, &id, data).await?;
        }
        Commands::Delete { id } => {
            delete::run(&manager, &id).await?;
        }
        Commands::Set {
            id,
            key,
            value,
            match_key,
        } => {
            set::run(&manager, &id, &key, value, match_key.as_deref()).await?;
        }
    }

    Ok(())
}

/// Log to stderr, honoring `RUST_LOG` unless `--verbose` is given.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
