//! Hardware capabilities the engine is driven through.
//!
//! The keyboard, the e-ink panel with its OLED line display, and the RTC are
//! traits so the engine runs the same on the device, in the terminal shell,
//! and under test.

use std::collections::VecDeque;

use chrono::{NaiveDateTime, Weekday};

// =============================================================================
// Keyboard
// =============================================================================

/// Keyboard layer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Modifiers {
    #[default]
    Normal,
    Shift,
    Func,
    FnShift,
}

impl Modifiers {
    /// Shift key pressed.
    pub fn toggle_shift(self) -> Self {
        match self {
            Modifiers::Shift | Modifiers::FnShift => Modifiers::Normal,
            Modifiers::Func => Modifiers::FnShift,
            Modifiers::Normal => Modifiers::Shift,
        }
    }

    /// Fn key pressed.
    pub fn toggle_fn(self) -> Self {
        match self {
            Modifiers::Func | Modifiers::FnShift => Modifiers::Normal,
            Modifiers::Shift => Modifiers::FnShift,
            Modifiers::Normal => Modifiers::Func,
        }
    }

    /// State after typing `c`. Digits keep Fn latched so numbers can be
    /// entered in a row; anything else drops back to normal.
    pub fn after_char(self, c: char) -> Self {
        if c.is_ascii_digit() { self } else { Modifiers::Normal }
    }
}

pub trait Keyboard {
    /// Next character code, 0 when nothing was pressed.
    fn poll(&mut self) -> u8;

    fn modifiers(&self) -> Modifiers;

    fn set_modifiers(&mut self, modifiers: Modifiers);
}

/// A decoded key code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    None,
    Home,
    Enter,
    Shift,
    Fn,
    Space,
    Backspace,
    Left,
    Right,
    Center,
    Char(char),
    /// A control code with no meaning to the calendar.
    Ignored(u8),
}

impl From<u8> for Key {
    fn from(code: u8) -> Self {
        match code {
            0 => Key::None,
            12 => Key::Home,
            13 => Key::Enter,
            17 => Key::Shift,
            18 => Key::Fn,
            32 => Key::Space,
            8 => Key::Backspace,
            19 => Key::Left,
            21 => Key::Right,
            7 | 20 => Key::Center,
            c if c.is_ascii_graphic() => Key::Char(c as char),
            other => Key::Ignored(other),
        }
    }
}

impl Key {
    /// The code a keyboard reports for this key.
    pub fn code(self) -> u8 {
        match self {
            Key::None => 0,
            Key::Home => 12,
            Key::Enter => 13,
            Key::Shift => 17,
            Key::Fn => 18,
            Key::Space => 32,
            Key::Backspace => 8,
            Key::Left => 19,
            Key::Right => 21,
            Key::Center => 20,
            Key::Char(c) => c as u8,
            Key::Ignored(code) => code,
        }
    }
}

/// Replays a fixed sequence of key codes, then reports nothing.
#[derive(Debug, Default, Clone)]
pub struct ScriptedKeyboard {
    codes: VecDeque<u8>,
    modifiers: Modifiers,
}

impl ScriptedKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue every character of `text`, followed by Enter.
    pub fn line(mut self, text: &str) -> Self {
        self.codes.extend(text.bytes());
        self.codes.push_back(Key::Enter.code());
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.codes.push_back(key.code());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl Keyboard for ScriptedKeyboard {
    fn poll(&mut self) -> u8 {
        self.codes.pop_front().unwrap_or(0)
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

/// Full-screen backdrop bitmaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    Month,
    Week,
    Day(Weekday),
    NewEvent,
    ViewEvent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
    Small,
    SmallNum,
}

/// Event count markers drawn in month cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    OneEvent,
    TwoEvents,
}

/// The e-ink panel plus the single-line OLED.
pub trait Display {
    fn status_bar(&mut self, text: &str);

    fn background(&mut self, background: Background);

    fn text(&mut self, x: i32, y: i32, text: &str, font: Font);

    /// Clear a rectangle to white.
    fn blank(&mut self, x: i32, y: i32, w: u32, h: u32);

    fn icon(&mut self, x: i32, y: i32, icon: Icon);

    /// Push the composed frame to the panel.
    fn refresh(&mut self);

    /// Show the line being typed on the OLED.
    fn echo_line(&mut self, line: &str, prompt: Option<&str>);

    /// Show a transient message on the OLED.
    fn message(&mut self, text: &str);
}

/// One call made on a `RecordingDisplay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawCall {
    StatusBar(String),
    Background(Background),
    Text { x: i32, y: i32, text: String, font: Font },
    Blank { x: i32, y: i32, w: u32, h: u32 },
    Icon { x: i32, y: i32, icon: Icon },
    Refresh,
    Echo { line: String, prompt: Option<String> },
    Message(String),
}

/// Display that keeps every call, for tests and headless runs.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    pub calls: Vec<DrawCall>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }

    /// Text drawn on the panel, in call order.
    pub fn texts(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Message(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn last_status(&self) -> Option<&str> {
        self.calls.iter().rev().find_map(|call| match call {
            DrawCall::StatusBar(text) => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn refreshes(&self) -> usize {
        self.calls.iter().filter(|c| **c == DrawCall::Refresh).count()
    }
}

impl Display for RecordingDisplay {
    fn status_bar(&mut self, text: &str) {
        self.calls.push(DrawCall::StatusBar(text.to_string()));
    }

    fn background(&mut self, background: Background) {
        self.calls.push(DrawCall::Background(background));
    }

    fn text(&mut self, x: i32, y: i32, text: &str, font: Font) {
        self.calls.push(DrawCall::Text {
            x,
            y,
            text: text.to_string(),
            font,
        });
    }

    fn blank(&mut self, x: i32, y: i32, w: u32, h: u32) {
        self.calls.push(DrawCall::Blank { x, y, w, h });
    }

    fn icon(&mut self, x: i32, y: i32, icon: Icon) {
        self.calls.push(DrawCall::Icon { x, y, icon });
    }

    fn refresh(&mut self) {
        self.calls.push(DrawCall::Refresh);
    }

    fn echo_line(&mut self, line: &str, prompt: Option<&str>) {
        self.calls.push(DrawCall::Echo {
            line: line.to_string(),
            prompt: prompt.map(String::from),
        });
    }

    fn message(&mut self, text: &str) {
        self.calls.push(DrawCall::Message(text.to_string()));
    }
}

// =============================================================================
// Clock
// =============================================================================

/// The real-time clock.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;

    /// Set the clock to `to`.
    fn adjust(&mut self, to: NaiveDateTime);
}

/// A clock that only moves when told to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    now: NaiveDateTime,
}

impl FixedClock {
    pub fn new(now: NaiveDateTime) -> Self {
        FixedClock { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.now
    }

    fn adjust(&mut self, to: NaiveDateTime) {
        self.now = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_decoding() {
        assert_eq!(Key::from(0), Key::None);
        assert_eq!(Key::from(7), Key::Center);
        assert_eq!(Key::from(20), Key::Center);
        assert_eq!(Key::from(b'n'), Key::Char('n'));
        assert_eq!(Key::from(27), Key::Ignored(27));
        assert_eq!(Key::from(Key::Left.code()), Key::Left);
    }

    #[test]
    fn test_modifier_toggles_combine() {
        let m = Modifiers::Normal.toggle_fn();
        assert_eq!(m, Modifiers::Func);
        let m = m.toggle_shift();
        assert_eq!(m, Modifiers::FnShift);
        assert_eq!(m.toggle_shift(), Modifiers::Normal);
        assert_eq!(m.toggle_fn(), Modifiers::Normal);
        assert_eq!(Modifiers::Shift.toggle_shift(), Modifiers::Normal);
    }

    #[test]
    fn test_digits_keep_fn_latched() {
        assert_eq!(Modifiers::Func.after_char('7'), Modifiers::Func);
        assert_eq!(Modifiers::Func.after_char('a'), Modifiers::Normal);
        assert_eq!(Modifiers::Shift.after_char(':'), Modifiers::Normal);
    }

    #[test]
    fn test_scripted_keyboard_drains_then_idles() {
        let mut kb = ScriptedKeyboard::new().line("n").key(Key::Home);
        assert_eq!(kb.poll(), b'n');
        assert_eq!(kb.poll(), 13);
        assert_eq!(kb.poll(), 12);
        assert_eq!(kb.poll(), 0);
        assert!(kb.is_empty());
    }
}
