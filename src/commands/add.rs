use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use pocketcal_core::editor::{Draft, Field, REPEAT_HELP, Validated, validate};

use crate::commands::open_store;
use crate::render::Render;

/// Values in field order: name, date, time, duration, repeat, note.
pub fn run(values: [String; 6]) -> Result<()> {
    let mut draft = Draft::new();

    for (field, value) in Field::ALL.into_iter().zip(values) {
        // Duration may be left out entirely.
        if field == Field::Duration && value.is_empty() {
            continue;
        }
        match validate(field, &value) {
            Ok(Validated::Accept(text)) => draft.set(field, text),
            Ok(Validated::Help) => anyhow::bail!("Repeat codes: {}", REPEAT_HELP),
            Err(e) => anyhow::bail!("{} ({})", field.error_message(), e),
        }
    }

    let event = draft.to_event()?;
    let (_, mut store) = open_store()?;
    store
        .add(event.clone())
        .with_context(|| format!("Failed to write {}", store.canonical_path().display()))?;

    println!("{}", format!("  Created: {}", event.name).green());
    println!("  {}", event.render());

    Ok(())
}
