use std::io;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pocketcal_core::Calendar;
use pocketcal_core::date::parse_clock_time;
use pocketcal_core::hal::Clock;
use tokio::time::{MissedTickBehavior, interval};
use tracing::info;

use crate::clock::SystemClock;
use crate::commands::open_store;
use crate::terminal::{RawModeGuard, TerminalDisplay, TerminalKeyboard};

/// Drive the calendar until Home is pressed on the month or week screen.
///
/// Keys are polled on the debounce cadence and the terminal is repainted on
/// the frame cadence. Both run on this task, so the engine never sees
/// concurrent access.
pub async fn run(time: Option<&str>) -> Result<()> {
    let (config, store) = open_store()?;

    let mut clock = SystemClock::new();
    if let Some(text) = time {
        let time = parse_clock_time(text).with_context(|| format!("Invalid --time '{}'", text))?;
        let date = clock.now().date();
        clock.adjust(date.and_time(time));
    }

    let today = clock.now().date();
    let mut calendar = Calendar::new(store, &config, today);
    calendar.activate(today);

    let _guard = RawModeGuard::enter().context("Failed to set up the terminal")?;
    let mut keyboard = TerminalKeyboard::new();
    let mut display = TerminalDisplay::new(io::stdout());

    let mut input = interval(config.key_debounce.max(Duration::from_millis(1)));
    input.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut redraw = interval(config.frame_interval());
    redraw.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let started = Instant::now();
    loop {
        tokio::select! {
            _ = input.tick() => {
                let now_ms = started.elapsed().as_millis() as u64;
                let tick = calendar.tick(now_ms, &mut keyboard, &mut display, &clock);
                if tick.exit || keyboard.quit_requested() {
                    break;
                }
            }
            _ = redraw.tick() => {
                display.flush()?;
            }
        }
    }

    info!("Calendar closed with {} events", calendar.store().events().len());
    Ok(())
}
