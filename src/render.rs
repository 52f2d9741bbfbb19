//! Colored terminal rendering for calendar types.

use owo_colors::OwoColorize;
use pocketcal_core::Event;
use pocketcal_core::Repeat;

pub trait Render {
    fn render(&self) -> String;
}

impl Render for Repeat {
    fn render(&self) -> String {
        match self {
            Repeat::No => String::new(),
            other => format!("↻ {}", other).cyan().to_string(),
        }
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let mut line = format!(
            "{} {} {}",
            self.start_date.format("%a %b %-d %Y").to_string().bold(),
            self.start_time_str(),
            self.name
        );
        if self.duration.is_some() {
            let duration = format!("({})", self.duration_str());
            line.push_str(&format!(" {}", duration.dimmed()));
        }
        let repeat = self.repeat.render();
        if !repeat.is_empty() {
            line.push(' ');
            line.push_str(&repeat);
        }
        if !self.note.is_empty() {
            line.push_str(&format!("\n      {}", self.note.dimmed()));
        }
        line
    }
}
