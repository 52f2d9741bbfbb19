//! Screens and the typed commands that move between them.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::constants::{MAX_DAY_EVENTS, MAX_YEAR, MIN_YEAR};
use crate::date::{
    add_days, days_in_month, normalize, parse_month_name, parse_weekday_name, parse_yyyymmdd,
    week_start,
};
use crate::error::CalResult;
use crate::hal::Background;

/// Which screen the calendar is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Month,
    Week,
    Day(Weekday),
    NewEvent,
    ViewEvent,
}

impl Screen {
    pub fn background(self) -> Background {
        match self {
            Screen::Month => Background::Month,
            Screen::Week => Background::Week,
            Screen::Day(weekday) => Background::Day(weekday),
            Screen::NewEvent => Background::NewEvent,
            Screen::ViewEvent => Background::ViewEvent,
        }
    }

    pub fn is_editor(self) -> bool {
        matches!(self, Screen::NewEvent | Screen::ViewEvent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonthCommand {
    NewEvent,
    ShowMonth { year: i32, month: u32 },
    OpenDay(NaiveDate),
    Invalid,
}

/// Interpret a line typed on the Month screen.
///
/// `n`, `jan [YYYY]`, `YYYYMMDD`, or a day of the displayed month.
pub fn parse_month_command(line: &str, displayed_year: i32, displayed_month: u32) -> MonthCommand {
    let command = line.trim().to_lowercase();

    if command == "n" {
        return MonthCommand::NewEvent;
    }

    if let Some(month) = command.get(..3).and_then(parse_month_name) {
        let year = match command[3..].strip_prefix(' ').map(str::trim) {
            None if command.len() == 3 => Some(displayed_year),
            Some(year) if year.len() == 4 => year.parse::<i32>().ok(),
            _ => None,
        };
        return match year {
            Some(year) if (MIN_YEAR..=MAX_YEAR).contains(&year) => {
                MonthCommand::ShowMonth { year, month }
            }
            _ => MonthCommand::Invalid,
        };
    }

    if command.len() == 8 {
        return match parse_yyyymmdd(&command) {
            Ok(date) if (MIN_YEAR..=MAX_YEAR).contains(&date.year()) => MonthCommand::OpenDay(date),
            _ => MonthCommand::Invalid,
        };
    }

    if (1..=2).contains(&command.len()) && command.bytes().all(|b| b.is_ascii_digit()) {
        let day: u32 = command.parse().unwrap_or(0);
        if (1..=days_in_month(displayed_year, displayed_month)).contains(&day) {
            if let Some(date) = NaiveDate::from_ymd_opt(displayed_year, displayed_month, day) {
                return MonthCommand::OpenDay(date);
            }
        }
    }

    MonthCommand::Invalid
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekCommand {
    NewEvent,
    OpenDay(Weekday),
    Invalid,
}

/// Interpret a line typed on the Week screen: `n` or a weekday name.
pub fn parse_week_command(line: &str) -> WeekCommand {
    let command = line.trim().to_lowercase();
    if command == "n" {
        return WeekCommand::NewEvent;
    }
    parse_weekday_name(&command)
        .map(WeekCommand::OpenDay)
        .unwrap_or(WeekCommand::Invalid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCommand {
    NewEvent,
    /// Zero-based index into the day's events.
    ViewEvent(usize),
    Invalid,
}

/// Interpret a line typed on a Day screen: `n` or an event number `1`-`7`
/// among the `event_count` shown.
pub fn parse_day_command(line: &str, event_count: usize) -> DayCommand {
    let command = line.trim().to_lowercase();
    if command == "n" {
        return DayCommand::NewEvent;
    }

    match command.parse::<usize>() {
        Ok(n) if command.len() == 1 && n >= 1 && n <= event_count.min(MAX_DAY_EVENTS) => {
            DayCommand::ViewEvent(n - 1)
        }
        _ => DayCommand::Invalid,
    }
}

/// Where the views are pointed, relative to today.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigator {
    pub screen: Screen,
    pub month_offset: i32,
    pub week_offset: i32,
    /// Date shown by the Day screen.
    pub selected: NaiveDate,
}

impl Navigator {
    pub fn new(today: NaiveDate) -> Self {
        Navigator {
            screen: Screen::Month,
            month_offset: 0,
            week_offset: 0,
            selected: today,
        }
    }

    /// Year and month of the Month screen.
    pub fn displayed_month(&self, today: NaiveDate) -> CalResult<(i32, u32)> {
        let first = normalize(today.year(), today.month() as i32 + self.month_offset, 1, 0, 0)?;
        Ok((first.year(), first.month()))
    }

    /// Sunday of the Week screen.
    pub fn displayed_sunday(&self, today: NaiveDate) -> CalResult<NaiveDate> {
        add_days(week_start(today), 7 * i64::from(self.week_offset))
    }

    /// Point the Month screen at `year`-`month`.
    pub fn show_month(&mut self, today: NaiveDate, year: i32, month: u32) {
        let target = year * 12 + month as i32;
        let current = today.year() * 12 + today.month() as i32;
        self.month_offset = target - current;
        self.screen = Screen::Month;
    }

    /// Switch to the Day screen for `date`.
    pub fn open_day(&mut self, date: NaiveDate) {
        self.selected = date;
        self.screen = Screen::Day(date.weekday());
    }

    /// Open `weekday` within the displayed week.
    pub fn open_weekday(&mut self, today: NaiveDate, weekday: Weekday) -> CalResult<()> {
        let sunday = self.displayed_sunday(today)?;
        let date = add_days(sunday, i64::from(weekday.num_days_from_sunday()))?;
        self.open_day(date);
        Ok(())
    }

    /// Move the Day screen by `days`, landing on the matching weekday.
    pub fn step_day(&mut self, days: i64) -> CalResult<()> {
        let date = add_days(self.selected, days)?;
        self.open_day(date);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_commands() {
        assert_eq!(parse_month_command("N", 2025, 6), MonthCommand::NewEvent);
        assert_eq!(
            parse_month_command("jan 2026", 2025, 6),
            MonthCommand::ShowMonth { year: 2026, month: 1 }
        );
        assert_eq!(
            parse_month_command("Dec", 2025, 6),
            MonthCommand::ShowMonth { year: 2025, month: 12 }
        );
        assert_eq!(
            parse_month_command("20250615", 2025, 6),
            MonthCommand::OpenDay(date(2025, 6, 15))
        );
        assert_eq!(
            parse_month_command("7", 2025, 2),
            MonthCommand::OpenDay(date(2025, 2, 7))
        );
    }

    #[test]
    fn test_month_commands_rejected() {
        assert_eq!(parse_month_command("jan 1969", 2025, 6), MonthCommand::Invalid);
        assert_eq!(parse_month_command("january", 2025, 6), MonthCommand::Invalid);
        assert_eq!(parse_month_command("20251301", 2025, 6), MonthCommand::Invalid);
        assert_eq!(parse_month_command("30", 2025, 2), MonthCommand::Invalid);
        assert_eq!(parse_month_command("0", 2025, 2), MonthCommand::Invalid);
        assert_eq!(parse_month_command("123", 2025, 2), MonthCommand::Invalid);
        assert_eq!(parse_month_command("", 2025, 2), MonthCommand::Invalid);
        assert_eq!(parse_month_command("hello", 2025, 2), MonthCommand::Invalid);
    }

    #[test]
    fn test_week_commands() {
        assert_eq!(parse_week_command("n"), WeekCommand::NewEvent);
        assert_eq!(parse_week_command("sun"), WeekCommand::OpenDay(Weekday::Sun));
        assert_eq!(parse_week_command("TH"), WeekCommand::OpenDay(Weekday::Thu));
        assert_eq!(parse_week_command("friday"), WeekCommand::OpenDay(Weekday::Fri));
        assert_eq!(parse_week_command("x"), WeekCommand::Invalid);
    }

    #[test]
    fn test_day_commands() {
        assert_eq!(parse_day_command("n", 0), DayCommand::NewEvent);
        assert_eq!(parse_day_command("2", 3), DayCommand::ViewEvent(1));
        assert_eq!(parse_day_command("4", 3), DayCommand::Invalid);
        assert_eq!(parse_day_command("0", 3), DayCommand::Invalid);
        assert_eq!(parse_day_command("8", 9), DayCommand::Invalid);
    }

    #[test]
    fn test_show_month_sets_relative_offset() {
        let today = date(2025, 6, 15);
        let mut nav = Navigator::new(today);
        nav.show_month(today, 2026, 1);
        assert_eq!(nav.month_offset, 7);
        assert_eq!(nav.displayed_month(today).unwrap(), (2026, 1));

        nav.month_offset = -6;
        assert_eq!(nav.displayed_month(today).unwrap(), (2024, 12));
    }

    #[test]
    fn test_open_weekday_uses_displayed_week() {
        let today = date(2025, 6, 4);
        let mut nav = Navigator::new(today);
        nav.week_offset = -1;
        nav.open_weekday(today, Weekday::Mon).unwrap();
        assert_eq!(nav.selected, date(2025, 5, 26));
        assert_eq!(nav.screen, Screen::Day(Weekday::Mon));
    }

    #[test]
    fn test_step_day_crosses_year() {
        let mut nav = Navigator::new(date(2025, 1, 1));
        nav.open_day(date(2025, 1, 1));
        nav.step_day(-1).unwrap();
        assert_eq!(nav.selected, date(2024, 12, 31));
        assert_eq!(nav.screen, Screen::Day(Weekday::Tue));
    }
}
