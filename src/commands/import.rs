use std::path::Path;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pocketcal_core::ics::parse_ics;

use crate::commands::open_store;

/// Check that `file` holds readable events, then copy it next to the
/// calendar file. The copy is only ever read; edits go to the calendar file.
pub fn run(file: &Path) -> Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let events = parse_ics(&content);
    if events.is_empty() {
        anyhow::bail!("No usable events in {}", file.display());
    }

    let (config, store) = open_store()?;
    let file_name = file
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Not a file: {}", file.display()))?;
    let target = store.events_dir().join(file_name);

    if target == store.canonical_path() {
        anyhow::bail!(
            "Refusing to overwrite the calendar file {}.\n\
            Rename the file before importing it.",
            target.display()
        );
    }
    let is_ics = Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ics"));
    if !is_ics {
        anyhow::bail!("Only .ics files are read from {}", config.events_path().display());
    }

    std::fs::create_dir_all(store.events_dir())?;
    std::fs::copy(file, &target).with_context(|| format!("Failed to copy to {}", target.display()))?;

    println!(
        "{}",
        format!("  Imported {} events into {}", events.len(), target.display()).green()
    );

    Ok(())
}
