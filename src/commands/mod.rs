pub mod add;
pub mod config;
pub mod events;
pub mod import;
pub mod run;

use anyhow::{Context, Result};
use pocketcal_core::{EngineConfig, EventStore, FsStorage};

/// Load the config and open the event store it points at.
pub fn open_store() -> Result<(EngineConfig, EventStore<FsStorage>)> {
    let config = EngineConfig::load().context("Failed to load config")?;
    let store = EventStore::new(FsStorage, config.events_path(), &config.canonical_file);
    Ok((config, store))
}
