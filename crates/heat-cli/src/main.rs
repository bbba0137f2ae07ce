//! heatctl — operator view of persisted heat.
//!
//! Reads and adjusts counters in a redb heat store, using the same
//! prefix, bounds and TTL the serving process uses (from `heat.toml`).
//!
//! ```text
//! heatctl --db /var/lib/heat/heat.redb show 203.0.113.7
//! heatctl --config heat.toml reset 203.0.113.7
//! heatctl --format json list
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use heat_core::HeatConfig;
use heat_store::RedbStore;

mod commands;

use commands::OutputFormat;
use commands::heat::Adjustment;

#[derive(Parser)]
#[command(
    name = "heatctl",
    about = "Inspect and adjust persisted heat counters",
    version,
    propagate_version = true,
)]
struct Cli {
    /// Path to the redb heat store.
    #[arg(long, global = true, default_value = "heat.redb")]
    db: PathBuf,

    /// Path to a heat.toml with a [heat] table. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print an identifier's temperature and state.
    Show { identifier: String },
    /// Raise an identifier's temperature (capped at the maximum).
    Increase {
        identifier: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Lower an identifier's temperature (floored at the minimum).
    Decrease {
        identifier: String,
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
    /// Pin an identifier at the maximum temperature.
    Max { identifier: String },
    /// Drop an identifier to the minimum temperature.
    Reset { identifier: String },
    /// List every live counter under the configured prefix.
    List,
    /// Delete expired entries from the store.
    Purge,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("heatctl=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => HeatConfig::from_file(path)?,
        None => HeatConfig::default(),
    };
    let store = RedbStore::open(&cli.db)?;

    let adjustment = match cli.command {
        Command::Show { identifier } => (identifier, Adjustment::Show),
        Command::Increase { identifier, amount } => (identifier, Adjustment::Increase(amount)),
        Command::Decrease { identifier, amount } => (identifier, Adjustment::Decrease(amount)),
        Command::Max { identifier } => (identifier, Adjustment::ToMaximum),
        Command::Reset { identifier } => (identifier, Adjustment::ToMinimum),
        Command::List => {
            let reports = commands::store::list(&store, &config)?;
            println!("{}", commands::heat::render(&reports, cli.format)?);
            return Ok(());
        }
        Command::Purge => {
            let purged = commands::store::purge(&store)?;
            match cli.format {
                OutputFormat::Json => println!("{}", serde_json::json!({ "purged": purged })),
                OutputFormat::Text => println!("purged {purged} expired entries"),
            }
            return Ok(());
        }
    };

    let (identifier, adjustment) = adjustment;
    let report = commands::heat::adjust(Arc::new(store), &config, &identifier, adjustment)?;
    println!("{}", commands::heat::render(&[report], cli.format)?);
    Ok(())
}
