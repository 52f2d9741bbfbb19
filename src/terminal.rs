//! Terminal stand-ins for the device keyboard, e-ink panel and OLED line.
//!
//! The 320x240 panel is scaled down to a character grid: one column per 6
//! pixels and one row per 9. Draw calls only update the grid; `flush` writes
//! it out, so the engine's frame rate decides how often the terminal repaints.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::Print;
use crossterm::terminal::{self, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue};
use owo_colors::OwoColorize;
use pocketcal_core::hal::{Background, Display, Font, Icon, Key, Keyboard, Modifiers};
use tracing::warn;

const PX_PER_COL: i32 = 6;
const PX_PER_ROW: i32 = 9;
const COLS: usize = 54;
const ROWS: usize = 27;

// =============================================================================
// Terminal mode
// =============================================================================

/// Raw mode on an alternate screen, restored on drop.
pub struct RawModeGuard;

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, cursor::Hide)?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = execute!(io::stdout(), cursor::Show, LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}

// =============================================================================
// Keyboard
// =============================================================================

/// Reads crossterm key events without blocking.
///
/// Esc acts as Home and Tab as the center key. Ctrl-C leaves the session.
#[derive(Debug, Default)]
pub struct TerminalKeyboard {
    modifiers: Modifiers,
    quit: bool,
}

impl TerminalKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }

    fn read_code(&mut self) -> io::Result<u8> {
        while event::poll(Duration::ZERO)? {
            if let TermEvent::Key(key) = event::read()? {
                if let Some(code) = self.translate(key) {
                    return Ok(code);
                }
            }
        }
        Ok(Key::None.code())
    }

    fn translate(&mut self, key: KeyEvent) -> Option<u8> {
        if key.kind != KeyEventKind::Press {
            return None;
        }
        let code = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                return None;
            }
            KeyCode::Char(c) if c.is_ascii_graphic() => Key::Char(c),
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Enter => Key::Enter,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Esc | KeyCode::Home => Key::Home,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Tab => Key::Center,
            _ => return None,
        };
        Some(code.code())
    }
}

impl Keyboard for TerminalKeyboard {
    fn poll(&mut self) -> u8 {
        match self.read_code() {
            Ok(code) => code,
            Err(e) => {
                warn!("Cannot read terminal input: {}", e);
                Key::None.code()
            }
        }
    }

    fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }
}

// =============================================================================
// Display
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    font: Font,
}

const EMPTY: Cell = Cell {
    ch: ' ',
    font: Font::Regular,
};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Oled {
    Line { line: String, prompt: Option<String> },
    Message(String),
}

/// Character-grid panel plus a one-line OLED below it.
pub struct TerminalDisplay<W: Write> {
    out: W,
    status: String,
    /// Whether this frame set the status bar; screens without one leave it blank.
    status_drawn: bool,
    cells: Vec<Cell>,
    oled: Oled,
    panel_dirty: bool,
    oled_dirty: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        TerminalDisplay {
            out,
            status: String::new(),
            status_drawn: false,
            cells: vec![EMPTY; COLS * ROWS],
            oled: Oled::Line {
                line: String::new(),
                prompt: None,
            },
            panel_dirty: false,
            oled_dirty: false,
        }
    }

    /// Write whatever changed since the last flush.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.panel_dirty {
            self.panel_dirty = false;
            queue!(self.out, cursor::MoveTo(0, 0), terminal::Clear(ClearType::CurrentLine))?;
            let status = format!("{:<width$}", self.status, width = COLS);
            queue!(self.out, Print(status.reversed()))?;
            for row in 0..ROWS {
                let line = self.render_row(row);
                queue!(
                    self.out,
                    cursor::MoveTo(0, row as u16 + 1),
                    terminal::Clear(ClearType::CurrentLine),
                    Print(line)
                )?;
            }
        }

        if self.oled_dirty {
            self.oled_dirty = false;
            let text = match &self.oled {
                Oled::Line { line, prompt: Some(prompt) } => {
                    format!("{} {} {}", prompt.dimmed(), ">".bold(), line)
                }
                Oled::Line { line, prompt: None } => format!("{} {}", ">".bold(), line),
                Oled::Message(text) => text.yellow().to_string(),
            };
            queue!(
                self.out,
                cursor::MoveTo(0, ROWS as u16 + 2),
                terminal::Clear(ClearType::CurrentLine),
                Print(text)
            )?;
        }

        self.out.flush()
    }

    /// One grid row, styled run by run.
    fn render_row(&self, row: usize) -> String {
        let cells = &self.cells[row * COLS..(row + 1) * COLS];
        let mut line = String::new();
        let mut start = 0;
        while start < cells.len() {
            let font = cells[start].font;
            let end = cells[start..]
                .iter()
                .position(|c| c.font != font)
                .map_or(cells.len(), |n| start + n);
            let run: String = cells[start..end].iter().map(|c| c.ch).collect();
            let styled = match font {
                Font::Regular => run,
                Font::Bold => run.bold().to_string(),
                Font::Small => run.dimmed().to_string(),
                Font::SmallNum => run.cyan().to_string(),
            };
            line.push_str(&styled);
            start = end;
        }
        line
    }

    fn put(&mut self, col: i32, row: i32, text: &str, font: Font) {
        if !(0..ROWS as i32).contains(&row) {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let col = col + i as i32;
            if !(0..COLS as i32).contains(&col) {
                continue;
            }
            self.cells[row as usize * COLS + col as usize] = Cell { ch, font };
        }
    }

    fn clear_panel(&mut self) {
        self.cells.fill(EMPTY);
    }
}

/// Weekday heading columns shared by the month, week and day backgrounds.
const HEADER_X: [i32; 7] = [9, 53, 97, 141, 185, 229, 273];
const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
const FORM_LABELS: [(&str, i32); 6] = [
    ("Name:", 68),
    ("Date:", 90),
    ("Time:", 112),
    ("Length:", 134),
    ("Repeat:", 156),
    ("Note:", 178),
];

impl<W: Write> Display for TerminalDisplay<W> {
    fn status_bar(&mut self, text: &str) {
        self.status = text.to_string();
        self.status_drawn = true;
    }

    fn background(&mut self, background: Background) {
        self.clear_panel();
        match background {
            Background::Month => {
                for (x, label) in HEADER_X.iter().zip(WEEKDAY_LABELS) {
                    self.text(*x, 40, label, Font::Bold);
                }
            }
            Background::Week => {
                for (x, label) in HEADER_X.iter().zip(WEEKDAY_LABELS) {
                    self.text(*x, 50, label, Font::Bold);
                }
            }
            Background::Day(selected) => {
                for (i, (x, label)) in HEADER_X.iter().zip(WEEKDAY_LABELS).enumerate() {
                    let font = if i as u32 == selected.num_days_from_sunday() {
                        Font::Bold
                    } else {
                        Font::Small
                    };
                    self.text(*x, 48, label, font);
                }
                for n in 1..=7 {
                    self.text(18, 74 + (n - 1) * 19, &format!("{n}."), Font::Small);
                }
            }
            Background::NewEvent | Background::ViewEvent => {
                for (n, (label, y)) in FORM_LABELS.into_iter().enumerate() {
                    let label = if background == Background::ViewEvent {
                        format!("{} {}", n + 1, label)
                    } else {
                        label.to_string()
                    };
                    self.text(18, y, &label, Font::Small);
                }
            }
        }
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: Font) {
        self.put(x / PX_PER_COL, y / PX_PER_ROW, text, font);
    }

    fn blank(&mut self, x: i32, y: i32, w: u32, h: u32) {
        let first_col = x / PX_PER_COL;
        let last_col = (x + w as i32) / PX_PER_COL;
        // A row is cleared only if the rectangle starts at or above its top.
        let first_row = (y + PX_PER_ROW - 1) / PX_PER_ROW;
        let last_row = (y + h as i32) / PX_PER_ROW;
        for row in first_row..=last_row {
            let width = (last_col - first_col).max(0) as usize;
            self.put(first_col, row, &" ".repeat(width), Font::Regular);
        }
    }

    fn icon(&mut self, x: i32, y: i32, icon: Icon) {
        let glyph = match icon {
            Icon::OneEvent => "•",
            Icon::TwoEvents => "••",
        };
        self.text(x, y, glyph, Font::Bold);
    }

    fn refresh(&mut self) {
        if !std::mem::take(&mut self.status_drawn) {
            self.status.clear();
        }
        self.panel_dirty = true;
    }

    fn echo_line(&mut self, line: &str, prompt: Option<&str>) {
        let next = Oled::Line {
            line: line.to_string(),
            prompt: prompt.map(String::from),
        };
        if next != self.oled {
            self.oled = next;
            self.oled_dirty = true;
        }
    }

    fn message(&mut self, text: &str) {
        self.oled = Oled::Message(text.to_string());
        self.oled_dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn output(display: &mut TerminalDisplay<Vec<u8>>) -> String {
        display.flush().unwrap();
        String::from_utf8_lossy(&std::mem::take(&mut display.out)).into_owned()
    }

    #[test]
    fn test_nothing_written_until_refresh() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.status_bar("Jun 2025 | Type a Date:");
        display.text(13, 64, "10", Font::Bold);
        assert!(output(&mut display).is_empty());

        display.refresh();
        let out = output(&mut display);
        assert!(out.contains("Jun 2025 | Type a Date:"));
        assert!(out.contains("10"));
    }

    #[test]
    fn test_status_cleared_on_screens_without_one() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.status_bar("Events 1-7 or (N)ew");
        display.refresh();
        assert!(output(&mut display).contains("Events 1-7"));

        display.background(Background::NewEvent);
        display.refresh();
        assert!(!output(&mut display).contains("Events 1-7"));
    }

    #[test]
    fn test_blank_keeps_text_above_it() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.background(Background::Day(Weekday::Mon));
        display.text(48, 74, "Dentist", Font::Small);
        display.text(48, 82, "Starts: 14:00", Font::Small);
        display.blank(12, 85, 297, 6 * 19);
        display.refresh();

        let out = output(&mut display);
        assert!(out.contains("Dentist"));
        assert!(out.contains("Starts: 14:00"));
    }

    #[test]
    fn test_echo_only_rewritten_on_change() {
        let mut display = TerminalDisplay::new(Vec::new());
        display.echo_line("jan", None);
        assert!(output(&mut display).contains("jan"));

        display.echo_line("jan", None);
        assert!(output(&mut display).is_empty());

        display.message("Invalid");
        assert!(output(&mut display).contains("Invalid"));
    }

    #[test]
    fn test_keys_translate_to_device_codes() {
        let mut keyboard = TerminalKeyboard::new();
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);

        assert_eq!(keyboard.translate(press(KeyCode::Char('n'))), Some(b'n'));
        assert_eq!(keyboard.translate(press(KeyCode::Esc)), Some(Key::Home.code()));
        assert_eq!(keyboard.translate(press(KeyCode::Tab)), Some(Key::Center.code()));
        assert_eq!(keyboard.translate(press(KeyCode::F(5))), None);

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(keyboard.translate(ctrl_c), None);
        assert!(keyboard.quit_requested());
    }
}
