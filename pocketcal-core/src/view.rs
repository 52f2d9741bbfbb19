//! Month, Week and Day views.
//!
//! Each view is built as a plain layout value from the stored events and the
//! current date, then drawn onto a `Display`. Building never touches the
//! store; drawing never queries.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::constants::{MAX_DAY_EVENTS, WEEK_VIEW_MAX_EVENTS, WEEK_VIEW_NAME_CHARS};
use crate::date::{add_days, days_in_month, day_of_week, month_name, normalize, week_start};
use crate::error::CalResult;
use crate::event::Event;
use crate::hal::{Background, Display, Font, Icon};
use crate::query::query;

// Month grid geometry, in panel pixels.
const GRID_X: i32 = 7;
const GRID_Y: i32 = 49;
const CELL_W: i32 = 44;
const CELL_H: i32 = 27;
const GRID_CELLS: u32 = 42;

// Week and Day columns share the month grid's column pitch.
const COLUMN_W: i32 = 44;

/// Coordinates of the draft fields on the editor screens.
const FORM_X: i32 = 106;
const FORM_Y: [i32; 6] = [68, 90, 112, 134, 156, 178];

/// `m/d` without padding, as printed above week and day columns.
fn short_date(date: NaiveDate) -> String {
    format!("{}/{}", date.month(), date.day())
}

// =============================================================================
// Month
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthCell {
    pub day: u32,
    pub event_count: usize,
    pub today: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLayout {
    pub year: i32,
    pub month: u32,
    /// Weekday of the 1st, 0 = Sunday. Also the number of leading blanks.
    pub first_weekday: u32,
    pub cells: Vec<MonthCell>,
}

impl MonthLayout {
    /// Lay out the month `offset` months away from `today`'s month.
    pub fn build(events: &[Event], today: NaiveDate, offset: i32) -> CalResult<Self> {
        let first = normalize(today.year(), today.month() as i32 + offset, 1, 0, 0)?.date();
        let (year, month) = (first.year(), first.month());

        let cells = (1..=days_in_month(year, month))
            .map(|day| {
                let date = first.with_day(day).unwrap_or(first);
                MonthCell {
                    day,
                    event_count: query(events, date).len(),
                    today: offset == 0 && day == today.day(),
                }
            })
            .collect();

        Ok(MonthLayout {
            year,
            month,
            first_weekday: day_of_week(year, month, 1),
            cells,
        })
    }

    pub fn days(&self) -> u32 {
        self.cells.len() as u32
    }

    pub fn leading_blanks(&self) -> u32 {
        self.first_weekday
    }

    /// Grid rows actually occupied by days.
    pub fn rows(&self) -> u32 {
        (self.first_weekday + self.days()).div_ceil(7)
    }

    pub fn status(&self) -> String {
        format!("{} {} | Type a Date:", month_name(self.month), self.year)
    }
}

fn cell_origin(index: u32) -> (i32, i32) {
    let (row, col) = ((index / 7) as i32, (index % 7) as i32);
    (GRID_X + col * CELL_W, GRID_Y + row * CELL_H)
}

pub fn draw_month(display: &mut impl Display, layout: &MonthLayout) {
    display.status_bar(&layout.status());
    display.background(Background::Month);

    let trailing_start = layout.first_weekday + layout.days();
    for index in (0..layout.first_weekday).chain(trailing_start..GRID_CELLS) {
        let (x, y) = cell_origin(index);
        display.blank(x, y, CELL_W as u32, CELL_H as u32);
    }

    for (i, cell) in layout.cells.iter().enumerate() {
        let (x, y) = cell_origin(layout.first_weekday + i as u32);
        let font = if cell.today { Font::Bold } else { Font::Regular };
        display.text(x + 6, y + 15, &cell.day.to_string(), font);

        match cell.event_count {
            0 => {}
            1 => display.icon(x + 29, y + 8, Icon::OneEvent),
            2 => display.icon(x + 29, y + 8, Icon::TwoEvents),
            n => display.text(x + 32, y + 16, &n.to_string(), Font::Small),
        }
    }
}

// =============================================================================
// Week
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekColumn {
    pub date: NaiveDate,
    /// At most `WEEK_VIEW_MAX_EVENTS`.
    pub events: Vec<Event>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeekLayout {
    pub sunday: NaiveDate,
    pub columns: Vec<WeekColumn>,
}

impl WeekLayout {
    /// Lay out the week `offset` weeks away from the week holding `today`.
    pub fn build(events: &[Event], today: NaiveDate, offset: i32) -> CalResult<Self> {
        let sunday = add_days(week_start(today), 7 * i64::from(offset))?;

        let columns = (0..7)
            .map(|i| -> CalResult<WeekColumn> {
                let date = add_days(sunday, i)?;
                let mut day_events = query(events, date);
                day_events.truncate(WEEK_VIEW_MAX_EVENTS);
                Ok(WeekColumn {
                    date,
                    events: day_events,
                })
            })
            .collect::<CalResult<Vec<_>>>()?;

        Ok(WeekLayout { sunday, columns })
    }
}

pub fn draw_week(display: &mut impl Display, layout: &WeekLayout) {
    display.status_bar("Type Sun, etc. or (N)ew");
    display.background(Background::Week);

    for (i, column) in layout.columns.iter().enumerate() {
        let col_x = i as i32 * COLUMN_W;
        display.text(9 + col_x, 62, &short_date(column.date), Font::Regular);

        let count = column.events.len() as i32;
        let empty = (WEEK_VIEW_MAX_EVENTS as i32 - count) as u32;
        display.blank(9 + col_x, 71 + count * 23, 39, empty * 23);

        for (j, event) in column.events.iter().enumerate() {
            let row_y = j as i32 * 23;
            let time = if event.is_recurring() {
                format!(":: {}", event.start_time_str())
            } else {
                event.start_time_str()
            };
            let name: String = event.name.chars().take(WEEK_VIEW_NAME_CHARS).collect();

            display.text(12 + col_x, 80 + row_y, &time, Font::SmallNum);
            display.text(12 + col_x, 89 + row_y, &name, Font::Small);
        }
    }
}

// =============================================================================
// Day
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayLayout {
    pub date: NaiveDate,
    /// At most `MAX_DAY_EVENTS`, in the order the `1`-`7` selectors use.
    pub events: Vec<Event>,
}

impl DayLayout {
    pub fn new(date: NaiveDate, events: impl IntoIterator<Item = Event>) -> Self {
        DayLayout {
            date,
            events: events.into_iter().take(MAX_DAY_EVENTS).collect(),
        }
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }
}

/// `Starts: 09:00, Dur: 0:30, Rep: WEEKLY MO`
pub fn summary_line(event: &Event) -> String {
    format!(
        "Starts: {}, Dur: {}, Rep: {}",
        event.start_time_str(),
        event.duration_str(),
        event.repeat
    )
}

pub fn draw_day(display: &mut impl Display, layout: &DayLayout) {
    let weekday = layout.weekday();
    display.status_bar("Events 1-7 or (N)ew");
    display.background(Background::Day(weekday));

    let col_x = weekday.num_days_from_sunday() as i32 * COLUMN_W;
    display.text(9 + col_x, 59, &short_date(layout.date), Font::Regular);

    let count = layout.events.len() as i32;
    let empty = (MAX_DAY_EVENTS as i32 - count) as u32;
    display.blank(12, 66 + count * 19, 297, empty * 19);

    for (j, event) in layout.events.iter().enumerate() {
        let row_y = j as i32 * 19;
        display.text(48, 74 + row_y, &event.name, Font::Small);
        display.text(48, 82 + row_y, &summary_line(event), Font::Small);
    }
}

// =============================================================================
// Editor form
// =============================================================================

/// Draw the six draft fields over the New-Event or View-Event backdrop.
pub fn draw_event_form(
    display: &mut impl Display,
    background: Background,
    status: Option<&str>,
    fields: &[String; 6],
) {
    if let Some(status) = status {
        display.status_bar(status);
    }
    display.background(background);

    for (value, y) in fields.iter().zip(FORM_Y) {
        display.text(FORM_X, y, value, Font::Regular);
    }
}
