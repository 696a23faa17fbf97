//! FarmOptima (farmoptima) - Main entry point
//!
//! Record keeping for fields, machinery, field operations and repairs,
//! backed by a per-collection JSON store in the data folder.

use anyhow::{Context, Result};
use clap::Parser;
use farmoptima_common::config::{load_toml_config, resolve_data_folder};
use farmoptima_common::store::SlotKey;
use farmoptima_common::FarmStore;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::Args;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_toml_config(args.config.as_deref());

    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("farmoptima={0},farmoptima_common={0},farmoptima_ai={0}", config.logging.level)
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let data_folder = resolve_data_folder(args.data_folder.as_deref(), &config);
    info!("Data folder: {}", data_folder.display());

    let store = FarmStore::open(&data_folder)
        .with_context(|| format!("Failed to open data folder {}", data_folder.display()))?;

    let mut changes = store.subscribe();
    let output = commands::run(args.command, &store, &config, args.config.as_deref()).await?;
    println!("{}", output);

    while let Ok(event) = changes.try_recv() {
        let keys: Vec<SlotKey> = SlotKey::ALL.into_iter().filter(|k| event.affects(*k)).collect();
        debug!(event = event.event_type(), ?keys, "Store changed");
    }

    debug!("Command complete");
    Ok(())
}
