use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pocketcal_core::date::parse_yyyymmdd;
use pocketcal_core::query::query;

use crate::commands::open_store;
use crate::render::Render;

pub fn run(date: Option<&str>, json: bool) -> Result<()> {
    let (_, mut store) = open_store()?;
    store.load();

    let events = match date {
        Some(text) => {
            let date = parse_yyyymmdd(text).with_context(|| format!("Invalid --date '{}'", text))?;
            query(store.events(), date)
        }
        None => store.events().to_vec(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    for event in &events {
        println!("  {}", event.render());
    }

    Ok(())
}
