//! The command line typed on the OLED, and keyboard layer state.

use crate::hal::{Key, Modifiers};

/// What a key means once editing keys have been applied to the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineEvent {
    /// Nothing beyond a change to the line or the modifiers.
    Edited,
    /// Enter pressed; carries the finished line.
    Submit(String),
    Home,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineInput {
    line: String,
    modifiers: Modifiers,
}

impl LineInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&self) -> &str {
        &self.line
    }

    /// Replace the line, e.g. with a pre-filled field value.
    pub fn set(&mut self, line: impl Into<String>) {
        self.line = line.into();
    }

    pub fn clear(&mut self) {
        self.line.clear();
    }

    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn reset_modifiers(&mut self) {
        self.modifiers = Modifiers::Normal;
    }

    /// Apply `key`. Line editing and modifier keys are absorbed here; Enter
    /// takes the line, leaving it empty.
    pub fn apply(&mut self, key: Key) -> LineEvent {
        match key {
            Key::None | Key::Ignored(_) => LineEvent::Edited,
            Key::Shift => {
                self.modifiers = self.modifiers.toggle_shift();
                LineEvent::Edited
            }
            Key::Fn => {
                self.modifiers = self.modifiers.toggle_fn();
                LineEvent::Edited
            }
            Key::Space => {
                self.line.push(' ');
                LineEvent::Edited
            }
            Key::Backspace => {
                self.line.pop();
                LineEvent::Edited
            }
            Key::Char(c) => {
                self.line.push(c);
                self.modifiers = self.modifiers.after_char(c);
                LineEvent::Edited
            }
            Key::Enter => LineEvent::Submit(std::mem::take(&mut self.line)),
            Key::Home => LineEvent::Home,
            Key::Left => LineEvent::Left,
            Key::Right => LineEvent::Right,
            Key::Center => LineEvent::Center,
        }
    }
}
