//! The calendar controller.
//!
//! `Calendar` owns every piece of mutable UI state. An outside scheduler
//! calls `tick` at a bounded rate; each call reads at most one key, runs it
//! to completion, and redraws when something changed and the frame budget
//! allows.

use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, warn};

use crate::config::EngineConfig;
use crate::editor::{Editor, EditorStep, REPEAT_HELP};
use crate::error::CalResult;
use crate::event::Event;
use crate::hal::{Clock, Display, Key, Keyboard};
use crate::input::{LineEvent, LineInput};
use crate::nav::{
    DayCommand, MonthCommand, Navigator, Screen, WeekCommand, parse_day_command,
    parse_month_command, parse_week_command,
};
use crate::query::DayEvents;
use crate::storage::Storage;
use crate::store::EventStore;
use crate::view::{
    DayLayout, MonthLayout, WeekLayout, draw_day, draw_event_form, draw_month, draw_week,
};

/// Cadences, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timing {
    key_debounce: u64,
    frame: u64,
    message: u64,
    help: u64,
}

impl Timing {
    fn from_config(config: &EngineConfig) -> Self {
        let ms = |d: Duration| d.as_millis() as u64;
        Timing {
            key_debounce: ms(config.key_debounce),
            frame: ms(config.frame_interval()),
            message: ms(config.message_duration),
            help: ms(config.help_duration),
        }
    }
}

/// What happened during one `tick`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Key read this tick, `Key::None` when idle or debouncing.
    pub key: Key,
    pub redrawn: bool,
    /// Home pressed on Month or Week: hand control back to the shell.
    pub exit: bool,
}

pub struct Calendar<S: Storage> {
    store: EventStore<S>,
    timing: Timing,
    nav: Navigator,
    editor: Option<Editor>,
    day_events: DayEvents,
    input: LineInput,
    today: NaiveDate,
    /// Set by every state change; cleared by `redraw`.
    dirty: bool,
    exit_requested: bool,
    pending_message: Option<(String, u64)>,
    message_until: Option<u64>,
    last_key_ms: Option<u64>,
    last_echo_ms: Option<u64>,
    last_frame_ms: Option<u64>,
}

impl<S: Storage> Calendar<S> {
    pub fn new(store: EventStore<S>, config: &EngineConfig, today: NaiveDate) -> Self {
        Calendar {
            store,
            timing: Timing::from_config(config),
            nav: Navigator::new(today),
            editor: None,
            day_events: DayEvents::new(),
            input: LineInput::new(),
            today,
            dirty: true,
            exit_requested: false,
            pending_message: None,
            message_until: None,
            last_key_ms: None,
            last_echo_ms: None,
            last_frame_ms: None,
        }
    }

    /// Reset to the current month and make sure events are loaded.
    pub fn activate(&mut self, today: NaiveDate) {
        self.today = today;
        self.nav = Navigator::new(today);
        self.editor = None;
        self.input = LineInput::new();
        self.exit_requested = false;
        self.store.load();
        self.dirty = true;
    }

    pub fn screen(&self) -> Screen {
        self.nav.screen
    }

    pub fn navigator(&self) -> &Navigator {
        &self.nav
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    pub fn line(&self) -> &str {
        self.input.line()
    }

    pub fn store(&self) -> &EventStore<S> {
        &self.store
    }

    pub fn day_events(&self) -> &DayEvents {
        &self.day_events
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Message waiting to be shown on the next tick.
    pub fn pending_message(&self) -> Option<&str> {
        self.pending_message.as_ref().map(|(text, _)| text.as_str())
    }

    // =========================================================================
    // Store operations
    // =========================================================================

    /// Recompute the day's events for `date`. Returns the match count.
    pub fn query(&mut self, date: NaiveDate) -> usize {
        self.store.load();
        self.day_events.refresh(self.store.events(), date)
    }

    pub fn add_event(&mut self, event: Event) -> CalResult<()> {
        self.store.add(event)
    }

    /// Delete the event at `index` of the current day's events.
    pub fn delete_event(&mut self, index: usize) -> CalResult<bool> {
        let Some(event) = self.day_events.remove(index) else {
            return Ok(false);
        };
        self.store.delete(&event)
    }

    /// Replace the event at `index` of the current day's events.
    pub fn update_event(&mut self, index: usize, updated: Event) -> CalResult<bool> {
        let Some(original) = self.day_events.replace(index, updated.clone()) else {
            return Ok(false);
        };
        self.store.update(&original, updated)
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// One pass of the control loop at monotonic time `now_ms`.
    pub fn tick(
        &mut self,
        now_ms: u64,
        keyboard: &mut impl Keyboard,
        display: &mut impl Display,
        clock: &impl Clock,
    ) -> Tick {
        self.today = clock.now().date();
        let mut key = Key::None;

        if elapsed(self.last_key_ms, now_ms, self.timing.key_debounce) {
            self.last_key_ms = Some(now_ms);
            key = Key::from(keyboard.poll());
            if key != Key::None {
                self.input.set_modifiers(keyboard.modifiers());
                self.handle_key(key);
                keyboard.set_modifiers(self.input.modifiers());
            }
        }

        if let Some((text, hold)) = self.pending_message.take() {
            display.message(&text);
            self.message_until = Some(now_ms + hold);
        }
        let holding_message = self.message_until.is_some_and(|until| now_ms < until);

        if !holding_message && elapsed(self.last_echo_ms, now_ms, self.timing.frame) {
            self.last_echo_ms = Some(now_ms);
            let prompt = self.editor.as_ref().and_then(Editor::prompt);
            display.echo_line(self.input.line(), prompt);
        }

        let mut redrawn = false;
        if self.dirty && elapsed(self.last_frame_ms, now_ms, self.timing.frame) {
            self.last_frame_ms = Some(now_ms);
            self.redraw(display);
            redrawn = true;
        }

        Tick {
            key,
            redrawn,
            exit: self.exit_requested,
        }
    }

    /// Draw the current screen if anything changed since the last frame.
    pub fn redraw(&mut self, display: &mut impl Display) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        self.store.load();

        match self.draw_screen(display) {
            Ok(()) => display.refresh(),
            Err(e) => error!("Cannot draw {:?}: {}", self.nav.screen, e),
        }
    }

    fn draw_screen(&mut self, display: &mut impl Display) -> CalResult<()> {
        let events = self.store.events();
        match self.nav.screen {
            Screen::Month => {
                let layout = MonthLayout::build(events, self.today, self.nav.month_offset)?;
                draw_month(display, &layout);
            }
            Screen::Week => {
                let layout = WeekLayout::build(events, self.today, self.nav.week_offset)?;
                draw_week(display, &layout);
            }
            Screen::Day(_) => {
                let date = self.nav.selected;
                self.day_events.refresh(events, date);
                let layout = DayLayout::new(date, self.day_events.iter().cloned());
                draw_day(display, &layout);
            }
            Screen::NewEvent | Screen::ViewEvent => {
                if let Some(editor) = &self.editor {
                    let background = self.nav.screen.background();
                    draw_event_form(display, background, editor.status(), editor.draft().fields());
                }
            }
        }
        Ok(())
    }

    // =========================================================================
    // Key handling
    // =========================================================================

    /// Apply one key to the current screen.
    pub fn handle_key(&mut self, key: Key) {
        match self.input.apply(key) {
            LineEvent::Edited => {}
            LineEvent::Submit(line) => self.submit(line),
            LineEvent::Home => self.home(),
            LineEvent::Left => self.step(-1),
            LineEvent::Right => self.step(1),
            LineEvent::Center => self.center(),
        }
    }

    fn submit(&mut self, line: String) {
        debug!("Command {:?} on {:?}", line, self.nav.screen);
        match self.nav.screen {
            Screen::Month => self.month_command(&line),
            Screen::Week => self.week_command(&line),
            Screen::Day(_) => self.day_command(&line),
            Screen::NewEvent | Screen::ViewEvent => self.editor_command(line),
        }
    }

    fn home(&mut self) {
        match self.nav.screen {
            Screen::Month | Screen::Week => {
                self.input.reset_modifiers();
                self.exit_requested = true;
            }
            Screen::Day(_) => self.go_to_month(),
            Screen::NewEvent | Screen::ViewEvent => {
                let Some(editor) = self.editor.as_mut() else {
                    return self.go_to_month();
                };
                match editor.home() {
                    EditorStep::Continue { line } => {
                        self.input.set(line);
                        self.dirty = true;
                    }
                    _ => self.go_to_month(),
                }
            }
        }
    }

    fn step(&mut self, direction: i32) {
        match self.nav.screen {
            Screen::Month => self.nav.month_offset += direction,
            Screen::Week => self.nav.week_offset += direction,
            Screen::Day(_) => {
                if let Err(e) = self.nav.step_day(i64::from(direction)) {
                    warn!("Cannot move day: {}", e);
                    return;
                }
                self.refresh_day();
            }
            Screen::NewEvent | Screen::ViewEvent => return,
        }
        self.dirty = true;
    }

    fn center(&mut self) {
        self.nav.screen = match self.nav.screen {
            Screen::Month | Screen::Day(_) => Screen::Week,
            Screen::Week => Screen::Month,
            Screen::NewEvent | Screen::ViewEvent => return,
        };
        self.input.reset_modifiers();
        self.dirty = true;
    }

    fn month_command(&mut self, line: &str) {
        let (year, month) = match self.nav.displayed_month(self.today) {
            Ok(displayed) => displayed,
            Err(e) => {
                warn!("Displayed month out of range: {}", e);
                (self.today.year(), self.today.month())
            }
        };

        match parse_month_command(line, year, month) {
            MonthCommand::NewEvent => self.start_editor(None),
            MonthCommand::ShowMonth { year, month } => {
                self.nav.show_month(self.today, year, month);
                self.dirty = true;
            }
            MonthCommand::OpenDay(date) => {
                self.nav.show_month(self.today, date.year(), date.month());
                self.open_day(date);
            }
            MonthCommand::Invalid => self.show_message("Invalid"),
        }
    }

    fn week_command(&mut self, line: &str) {
        match parse_week_command(line) {
            WeekCommand::NewEvent => self.start_editor(None),
            WeekCommand::OpenDay(weekday) => match self.nav.open_weekday(self.today, weekday) {
                Ok(()) => {
                    self.refresh_day();
                    self.input.reset_modifiers();
                    self.dirty = true;
                }
                Err(e) => {
                    warn!("Cannot open {}: {}", weekday, e);
                    self.show_message("Invalid");
                }
            },
            WeekCommand::Invalid => self.show_message("Invalid"),
        }
    }

    fn day_command(&mut self, line: &str) {
        match parse_day_command(line, self.day_events.len()) {
            DayCommand::NewEvent => self.start_editor(Some(self.nav.selected)),
            DayCommand::ViewEvent(index) => {
                let Some(event) = self.day_events.get(index).cloned() else {
                    return self.show_message("Invalid");
                };
                self.editor = Some(Editor::view(index, event));
                self.nav.screen = Screen::ViewEvent;
                self.input.reset_modifiers();
                self.dirty = true;
            }
            DayCommand::Invalid => self.show_message("Invalid"),
        }
    }

    fn editor_command(&mut self, line: String) {
        let Some(editor) = self.editor.as_mut() else {
            return self.go_to_month();
        };

        match editor.enter(&line) {
            EditorStep::Continue { line } => {
                self.input.set(line);
                self.dirty = true;
            }
            EditorStep::Rejected { message } => {
                self.input.set(line);
                self.show_message(message);
            }
            EditorStep::Help => {
                self.pending_message = Some((REPEAT_HELP.to_string(), self.timing.help));
            }
            EditorStep::Create(event) => {
                let message = format!("New Event \"{}\" Created", event.name);
                let result = self.store.add(event);
                self.report(result, message);
                self.go_to_month();
            }
            EditorStep::Delete { index, event } => {
                let message = format!("Event : \"{}\" Deleted", event.name);
                let result = self.delete_event(index);
                self.report_change(result, &event.name, message);
                self.go_to_month();
            }
            EditorStep::Save { index, original, updated } => {
                let message = format!("Event : \"{}\" Edited", updated.name);
                let result = self.update_event(index, updated);
                self.report_change(result, &original.name, message);
                self.go_to_month();
            }
            EditorStep::Exit => self.go_to_month(),
        }
    }

    // =========================================================================
    // Transitions
    // =========================================================================

    fn start_editor(&mut self, start_date: Option<NaiveDate>) {
        self.editor = Some(Editor::create(start_date));
        self.nav.screen = Screen::NewEvent;
        self.input.clear();
        self.input.reset_modifiers();
        self.dirty = true;
    }

    fn open_day(&mut self, date: NaiveDate) {
        self.nav.open_day(date);
        self.refresh_day();
        self.input.reset_modifiers();
        self.dirty = true;
    }

    fn refresh_day(&mut self) {
        let date = self.nav.selected;
        self.query(date);
    }

    fn go_to_month(&mut self) {
        self.editor = None;
        self.nav.screen = Screen::Month;
        self.input.clear();
        self.input.reset_modifiers();
        self.dirty = true;
    }

    fn show_message(&mut self, text: &str) {
        self.pending_message = Some((text.to_string(), self.timing.message));
    }

    /// Announce a store change, or that it did not reach the card.
    fn report(&mut self, result: CalResult<()>, success: String) {
        match result {
            Ok(()) => self.show_message(&success),
            Err(e) => {
                error!("Event change not saved: {}", e);
                self.show_message("Error: Could not save events");
            }
        }
    }

    /// Like `report`, for changes that target an existing entry.
    fn report_change(&mut self, result: CalResult<bool>, name: &str, success: String) {
        match result {
            Ok(true) => self.show_message(&success),
            Ok(false) => {
                warn!("Event \"{}\" is no longer in the store", name);
                self.show_message("Error: Event not found");
            }
            Err(e) => self.report(Err(e), success),
        }
    }
}

fn elapsed(last: Option<u64>, now: u64, interval: u64) -> bool {
    last.is_none_or(|last| now.saturating_sub(last) >= interval)
}
