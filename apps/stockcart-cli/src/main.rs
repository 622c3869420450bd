//! # stockcart
//!
//! Command-line front end for a Stockcart cart.
//!
//! ## Usage
//! ```text
//! stockcart list
//! stockcart add 3
//! stockcart update 3 2
//! stockcart remove 3
//! ```
//!
//! Every command prints the cart as JSON on stdout after it runs. Logs and
//! notifications go to stderr. A rejected operation exits with status 2.
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Initialize Logging     tracing-subscriber, RUST_LOG overrides       │
//! │  2. Load Config            stockcart.toml → STOCKCART_* → flags         │
//! │  3. Open Storage           SQLite in the platform data dir (WAL)        │
//! │  4. Open Session           load snapshot, spawn worker                  │
//! │  5. Run Command            one operation, wait for it                   │
//! │  6. Shut Down              drain the worker, close storage, print cart  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use stockcart_core::ProductId;
use stockcart_session::{
    CartConfig, CartSession, HttpCatalog, Outcome, SqlitePersistence, TracingNotifier,
};

#[derive(Debug, Parser)]
#[command(name = "stockcart", version, about = "Shopping cart with live stock checks")]
struct Cli {
    /// Config file (default: stockcart.toml in the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog API base URL, overriding config and environment
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// SQLite file holding the cart, overriding config and environment
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the cart
    List,

    /// Add one unit of a product
    Add { id: i64 },

    /// Remove a product from the cart
    Remove { id: i64 },

    /// Set the amount of a product already in the cart
    Update {
        id: i64,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let db_path = config
        .database_path()
        .ok_or_else(|| anyhow!("No database path available; set STOCKCART_DB_PATH"))?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Creating data directory {}", parent.display()))?;
    }
    info!(path = %db_path.display(), "Opening cart storage");

    let storage = SqlitePersistence::open(&db_path)
        .await
        .context("Opening cart storage")?;
    let database = storage.database().clone();
    let catalog = Arc::new(HttpCatalog::from_settings(&config.api).context("Building API client")?);

    let session = CartSession::open(
        &config,
        Arc::new(storage),
        catalog.clone(),
        catalog,
        Arc::new(TracingNotifier),
    )
    .await;

    let outcome = run(&session, &cli.command).await;
    session.shutdown().await;
    database.close().await;

    println!("{}", serde_json::to_string_pretty(&session.get_cart())?);

    match outcome {
        Outcome::Rejected => Ok(ExitCode::from(2)),
        Outcome::Committed | Outcome::Unchanged => Ok(ExitCode::SUCCESS),
    }
}

async fn run(session: &CartSession, command: &Command) -> Outcome {
    debug!(?command, "Running command");

    match *command {
        Command::List => Outcome::Unchanged,
        Command::Add { id } => session.add_item(ProductId(id)).await,
        Command::Remove { id } => session.remove_item(ProductId(id)).await,
        Command::Update { id, amount } => session.update_amount(ProductId(id), amount).await,
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<CartConfig> {
    let mut config = CartConfig::load(cli.config.clone()).context("Loading configuration")?;

    if let Some(url) = &cli.api_url {
        config.api.base_url = url.clone();
    }
    if let Some(path) = &cli.db {
        config.storage.database_path = Some(path.clone());
    }

    config.validate().context("Validating configuration")?;
    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=stockcart_session=trace` - Trace the session crate only
/// - Default: INFO, DEBUG for stockcart crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,stockcart=debug,stockcart_session=debug,stockcart_db=debug,sqlx=warn")
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_update_accepts_negative_amount() {
        let cli = Cli::try_parse_from(["stockcart", "update", "3", "-1"]).unwrap();
        assert!(matches!(cli.command, Command::Update { id: 3, amount: -1 }));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "stockcart",
            "add",
            "7",
            "--api-url",
            "http://shop.local:3333",
        ])
        .unwrap();

        assert!(matches!(cli.command, Command::Add { id: 7 }));
        assert_eq!(cli.api_url.as_deref(), Some("http://shop.local:3333"));
    }
}
