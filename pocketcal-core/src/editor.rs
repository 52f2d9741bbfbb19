//! Field-by-field event entry.
//!
//! Creation walks the six fields in order. Viewing starts on a menu from
//! which single fields are edited, the event is saved, or it is deleted.
//! Both share one validator per field.

use std::str::FromStr;

use chrono::NaiveDate;

use crate::date::{format_duration, format_yyyymmdd, parse_duration, parse_hhmm, parse_yyyymmdd};
use crate::error::{CalError, CalResult};
use crate::event::{Event, Repeat};

/// Shown for `HELP` at the repeat prompt.
pub const REPEAT_HELP: &str = "NO, DAILY, WEEKLY MO,WE, MONTHLY 10, YEARLY JAN05";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Name,
    StartDate,
    StartTime,
    Duration,
    Repeat,
    Note,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Name,
        Field::StartDate,
        Field::StartTime,
        Field::Duration,
        Field::Repeat,
        Field::Note,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Field> {
        Field::ALL.get(self.index() + 1).copied()
    }

    pub fn prev(self) -> Option<Field> {
        self.index().checked_sub(1).map(|i| Field::ALL[i])
    }

    /// Line display prompt while the field is being typed.
    pub fn prompt(self) -> &'static str {
        match self {
            Field::Name => "Enter the Event Name",
            Field::StartDate => "Enter the Start Date (YYYYMMDD)",
            Field::StartTime => "Enter the Start Time (HH:MM)",
            Field::Duration => "Enter the Event Duration (HH:MM)",
            Field::Repeat => "Enter the Repeat Code or \"Help\"",
            Field::Note => "Attach a Note to the Event",
        }
    }

    /// Message shown when the field rejects a line.
    pub fn error_message(self) -> &'static str {
        match self {
            Field::Name => "Error: Empty event name",
            Field::StartDate => "Error: Invalid date (YYYYMMDD)",
            Field::StartTime => "Error: Invalid time (HH:MM)",
            Field::Duration => "Error: Invalid duration (H:MM)",
            Field::Repeat => "Error: Invalid repeat value",
            Field::Note => "Error: Invalid note",
        }
    }
}

/// Result of running a field's validator on a typed line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    /// The line is acceptable; store this normalized text.
    Accept(String),
    /// The repeat field asked for guidance.
    Help,
}

/// Check `line` against the rule for `field`.
pub fn validate(field: Field, line: &str) -> CalResult<Validated> {
    let accepted = match field {
        // Content lines are read back trimmed; trailing blanks would not survive.
        Field::Name => {
            let name = line.trim_end();
            if name.is_empty() {
                return Err(CalError::EmptyName);
            }
            name.to_string()
        }
        Field::StartDate => {
            let date = parse_yyyymmdd(line)?;
            // Leading-zero years such as 00250101 are not real input.
            if line.parse::<u32>().unwrap_or(0) <= 10_000_000 {
                return Err(CalError::InvalidDate(line.to_string()));
            }
            format_yyyymmdd(date)
        }
        Field::StartTime => {
            parse_hhmm(line)?;
            line.to_string()
        }
        Field::Duration => format_duration(parse_duration(line)?),
        Field::Repeat => {
            if line.trim().eq_ignore_ascii_case("help") {
                return Ok(Validated::Help);
            }
            Repeat::from_str(line)?.to_string()
        }
        Field::Note => line.trim_end().to_string(),
    };
    Ok(Validated::Accept(accepted))
}

/// The in-progress event, one text value per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    fields: [String; 6],
}

impl Draft {
    pub fn new() -> Self {
        Self::default()
    }

    /// A blank draft whose start date is already filled in.
    pub fn starting_on(date: NaiveDate) -> Self {
        let mut draft = Draft::new();
        draft.set(Field::StartDate, format_yyyymmdd(date));
        draft
    }

    pub fn from_event(event: &Event) -> Self {
        Draft {
            fields: [
                event.name.clone(),
                event.start_date_str(),
                event.start_time_str(),
                event.duration_str(),
                event.repeat.to_string(),
                event.note.clone(),
            ],
        }
    }

    pub fn get(&self, field: Field) -> &str {
        &self.fields[field.index()]
    }

    pub fn set(&mut self, field: Field, value: String) {
        self.fields[field.index()] = value;
    }

    pub fn fields(&self) -> &[String; 6] {
        &self.fields
    }

    /// Convert to an event. An empty duration means unknown.
    pub fn to_event(&self) -> CalResult<Event> {
        let name = self.get(Field::Name).trim_end();
        if name.is_empty() {
            return Err(CalError::EmptyName);
        }

        let mut event = Event::new(
            name,
            parse_yyyymmdd(self.get(Field::StartDate))?,
            parse_hhmm(self.get(Field::StartTime))?,
        );
        event.duration = match self.get(Field::Duration) {
            "" => None,
            text => Some(parse_duration(text)?),
        };
        event.repeat = match self.get(Field::Repeat) {
            // A weekly rule loaded without BYDAY shows as a bare WEEKLY.
            "WEEKLY" => Repeat::Weekly(Vec::new()),
            text => Repeat::from_str(text)?,
        };
        event.note = self.get(Field::Note).trim_end().to_string();
        Ok(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Create,
    /// Editing `original`, which sits at `index` in the day's events.
    View { index: usize, original: Event },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    Menu,
    Field(Field),
}

/// What the caller should do after a key reached the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorStep {
    /// Keep editing with this text on the input line.
    Continue { line: String },
    /// The line failed validation; show the message and keep the line.
    Rejected { message: &'static str },
    /// Show the repeat guidance; the line is cleared.
    Help,
    Create(Event),
    Delete { index: usize, event: Event },
    Save { index: usize, original: Event, updated: Event },
    /// Leave the editor without changes.
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Editor {
    mode: Mode,
    cursor: Cursor,
    draft: Draft,
}

impl Editor {
    /// Start a new event, optionally on a known date.
    pub fn create(start_date: Option<NaiveDate>) -> Self {
        Editor {
            mode: Mode::Create,
            cursor: Cursor::Field(Field::Name),
            draft: start_date.map(Draft::starting_on).unwrap_or_default(),
        }
    }

    /// Open `event` at `index` of the day's events on the menu.
    pub fn view(index: usize, event: Event) -> Self {
        Editor {
            draft: Draft::from_event(&event),
            mode: Mode::View {
                index,
                original: event,
            },
            cursor: Cursor::Menu,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn is_create(&self) -> bool {
        self.mode == Mode::Create
    }

    /// Prompt for the line display, if any.
    pub fn prompt(&self) -> Option<&'static str> {
        match self.cursor {
            Cursor::Menu => None,
            Cursor::Field(field) => Some(field.prompt()),
        }
    }

    /// Status bar text. The creation screen has none.
    pub fn status(&self) -> Option<&'static str> {
        match (&self.mode, self.cursor) {
            (Mode::Create, _) => None,
            (Mode::View { .. }, Cursor::Menu) => Some("Type 1-6,(D)elete,or (S)ave"),
            (Mode::View { .. }, Cursor::Field(_)) => Some("Type the info!"),
        }
    }

    /// Enter pressed with `line` typed.
    pub fn enter(&mut self, line: &str) -> EditorStep {
        match self.cursor {
            Cursor::Menu => self.menu_command(line),
            Cursor::Field(field) => self.submit_field(field, line),
        }
    }

    /// Home pressed.
    pub fn home(&mut self) -> EditorStep {
        match (&self.mode, self.cursor) {
            (Mode::Create, Cursor::Field(field)) => match field.prev() {
                Some(prev) => {
                    self.cursor = Cursor::Field(prev);
                    EditorStep::Continue {
                        line: String::new(),
                    }
                }
                None => EditorStep::Exit,
            },
            _ => EditorStep::Exit,
        }
    }

    fn menu_command(&mut self, line: &str) -> EditorStep {
        let Mode::View { index, original } = &self.mode else {
            return EditorStep::Continue {
                line: String::new(),
            };
        };

        let command = line.trim();
        match command {
            "d" | "D" => EditorStep::Delete {
                index: *index,
                event: original.clone(),
            },
            "s" | "S" => match self.draft.to_event() {
                Ok(updated) => EditorStep::Save {
                    index: *index,
                    original: original.clone(),
                    updated,
                },
                Err(_) => EditorStep::Rejected {
                    message: "Error: Cannot save event",
                },
            },
            _ => {
                let field = command
                    .parse::<usize>()
                    .ok()
                    .filter(|n| (1..=6).contains(n))
                    .map(|n| Field::ALL[n - 1]);
                match field {
                    Some(field) => {
                        self.cursor = Cursor::Field(field);
                        EditorStep::Continue {
                            line: self.draft.get(field).to_string(),
                        }
                    }
                    None => EditorStep::Continue {
                        line: String::new(),
                    },
                }
            }
        }
    }

    fn submit_field(&mut self, field: Field, line: &str) -> EditorStep {
        let value = match validate(field, line) {
            Ok(Validated::Accept(value)) => value,
            Ok(Validated::Help) => return EditorStep::Help,
            Err(_) => {
                return EditorStep::Rejected {
                    message: field.error_message(),
                };
            }
        };
        self.draft.set(field, value);

        if !self.is_create() {
            self.cursor = Cursor::Menu;
            return EditorStep::Continue {
                line: String::new(),
            };
        }

        match field.next() {
            Some(next) => {
                self.cursor = Cursor::Field(next);
                EditorStep::Continue {
                    line: self.draft.get(next).to_string(),
                }
            }
            None => match self.draft.to_event() {
                Ok(event) => EditorStep::Create(event),
                Err(_) => EditorStep::Rejected {
                    message: field.error_message(),
                },
            },
        }
    }
}
