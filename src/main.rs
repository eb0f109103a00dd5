//! # Collection Gate CLI (`cgate`)
//!
//! The `cgate` binary runs the gateway server and offers operator shortcuts
//! for the same capabilities over the command line.
//!
//! ## Usage
//!
//! ```bash
//! cgate --config ./config/cgate.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `cgate serve` | Start the HTTP API |
//! | `cgate search "<text>"` | Search collections by label or pid |
//! | `cgate counts` | Print object and collection counts |
//! | `cgate access <pid> <action>` | Evaluate an access check |

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use collection_gate::access::{ingest_access, manage_access, share_migrate_access, StaticGate};
use collection_gate::config::load_config;
use collection_gate::ingest::PolicyResolver;
use collection_gate::objects::RestObjectStore;
use collection_gate::search::run_search;
use collection_gate::server::run_server;
use collection_gate::stats::run_counts;
use collection_gate::triplestore::SparqlHttpClient;

/// Collection Gate — access, search, and ingest gateway for a digital
/// object repository.
#[derive(Parser)]
#[command(
    name = "cgate",
    about = "Collection Gate — access, search, and ingest gateway for a digital object repository",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/cgate.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    ///
    /// Binds to `[server].bind` and serves until terminated.
    Serve,

    /// Search collections by label or pid.
    ///
    /// Runs the same filtered query the search endpoint uses and prints
    /// one match per line.
    Search {
        /// The search text.
        query: String,
    },

    /// Print object and collection counts.
    Counts,

    /// Evaluate an access check for an object.
    ///
    /// Prints `allowed` or `forbidden` and exits non-zero on denial, so
    /// the command composes in scripts.
    Access {
        /// Pid of the target object.
        pid: String,

        /// Which surface to check.
        #[arg(value_enum)]
        action: AccessAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum AccessAction {
    Manage,
    ShareMigrate,
    Ingest,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collection_gate=info,cgate=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Serve => run_server(&config).await,
        Commands::Search { query } => {
            let store = SparqlHttpClient::new(&config.triplestore)?;
            run_search(&store, &config, &query).await
        }
        Commands::Counts => {
            let store = SparqlHttpClient::new(&config.triplestore)?;
            run_counts(&store, &config).await
        }
        Commands::Access { pid, action } => {
            let objects = RestObjectStore::new(&config.repository)?;
            let gate = StaticGate::new(&config.access);
            let decision = match action {
                AccessAction::Manage => manage_access(&objects, &gate, &pid).await?,
                AccessAction::ShareMigrate => share_migrate_access(&objects, &gate, &pid).await?,
                AccessAction::Ingest => {
                    let resolver = PolicyResolver::new();
                    ingest_access(
                        &objects,
                        &gate,
                        &resolver,
                        &config.repository.collection_models,
                        &pid,
                    )
                    .await?
                }
            };

            if decision.is_allowed() {
                println!("allowed");
                Ok(())
            } else {
                println!("forbidden");
                std::process::exit(1);
            }
        }
    }
}
