//! The persisted calendar event and its repeat rule.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use serde::{Serialize, Serializer};

use crate::date::{
    days_in_month, format_duration, format_hhmm, format_yyyymmdd, month_name, parse_month_name,
    parse_weekday_code, weekday_code,
};
use crate::error::{CalError, CalResult};

/// A calendar event as stored on the SD card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub start_date: NaiveDate,
    pub start_time: NaiveTime,
    /// Whole minutes from the start. `None` when the source file had no
    /// usable end time.
    pub duration: Option<u32>,
    pub repeat: Repeat,
    pub note: String,
}

impl Event {
    pub fn new(name: impl Into<String>, start_date: NaiveDate, start_time: NaiveTime) -> Self {
        Event {
            name: name.into(),
            start_date,
            start_time,
            duration: None,
            repeat: Repeat::No,
            note: String::new(),
        }
    }

    pub fn start_date_str(&self) -> String {
        format_yyyymmdd(self.start_date)
    }

    pub fn start_time_str(&self) -> String {
        format_hhmm(self.start_time)
    }

    /// `H:MM`, or empty when unknown.
    pub fn duration_str(&self) -> String {
        self.duration.map(format_duration).unwrap_or_default()
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat != Repeat::No
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Monthly recurrence target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonthlyRule {
    /// Fixed day of the month (`MONTHLY 10`).
    Day(u32),
    /// Nth weekday of the month (`MONTHLY 2TU`, `MONTHLY -1FR`). An ordinal
    /// of zero means every such weekday.
    Weekday { ordinal: i32, day: Weekday },
}

impl MonthlyRule {
    /// Whether `date` falls on this rule within its own month.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match *self {
            MonthlyRule::Day(d) => date.day() == d,
            MonthlyRule::Weekday { ordinal, day } => {
                if date.weekday() != day {
                    return false;
                }
                let from_start = (date.day() as i32 - 1) / 7 + 1;
                let dim = days_in_month(date.year(), date.month()) as i32;
                let from_end = (dim - date.day() as i32) / 7 + 1;
                match ordinal {
                    0 => true,
                    n if n > 0 => from_start == n,
                    n => from_end == -n,
                }
            }
        }
    }

    /// Parse `10` or an `[+-]nWD` code such as `2TU`.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
            let day: u32 = code.parse().ok()?;
            return (1..=31).contains(&day).then_some(MonthlyRule::Day(day));
        }

        if code.len() < 2 || !code.is_char_boundary(code.len() - 2) {
            return None;
        }
        let (ordinal, day) = code.split_at(code.len() - 2);
        let day = parse_weekday_code(day)?;
        let ordinal = match ordinal {
            "" => 0,
            n => n.trim_start_matches('+').parse::<i32>().ok()?,
        };
        (-5..=5)
            .contains(&ordinal)
            .then_some(MonthlyRule::Weekday { ordinal, day })
    }
}

impl fmt::Display for MonthlyRule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MonthlyRule::Day(d) => write!(f, "{d}"),
            MonthlyRule::Weekday { ordinal: 0, day } => write!(f, "{}", weekday_code(*day)),
            MonthlyRule::Weekday { ordinal, day } => {
                write!(f, "{}{}", ordinal, weekday_code(*day))
            }
        }
    }
}

/// How an event repeats.
///
/// Text form: `NO`, `DAILY`, `WEEKLY MO,WE`, `MONTHLY 10`, `YEARLY JAN05`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Repeat {
    #[default]
    No,
    Daily,
    /// Empty when the source rule carried no BYDAY list.
    Weekly(Vec<Weekday>),
    Monthly(MonthlyRule),
    Yearly { month: u32, day: u32 },
}

impl Repeat {
    pub fn is_weekly_on(&self, day: Weekday) -> bool {
        matches!(self, Repeat::Weekly(days) if days.contains(&day))
    }
}

impl fmt::Display for Repeat {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Repeat::No => write!(f, "NO"),
            Repeat::Daily => write!(f, "DAILY"),
            Repeat::Weekly(days) if days.is_empty() => write!(f, "WEEKLY"),
            Repeat::Weekly(days) => {
                let codes: Vec<&str> = days.iter().map(|d| weekday_code(*d)).collect();
                write!(f, "WEEKLY {}", codes.join(","))
            }
            Repeat::Monthly(rule) => write!(f, "MONTHLY {rule}"),
            Repeat::Yearly { month, day } => {
                write!(f, "YEARLY {}{:02}", month_name(*month).to_uppercase(), day)
            }
        }
    }
}

impl FromStr for Repeat {
    type Err = CalError;

    /// Parse the typed text form, any case. WEEKLY, MONTHLY and YEARLY need
    /// an argument after a single space.
    fn from_str(s: &str) -> CalResult<Self> {
        let upper = s.trim().to_uppercase();
        let invalid = || CalError::InvalidRepeat(s.to_string());

        match upper.as_str() {
            "NO" => return Ok(Repeat::No),
            "DAILY" => return Ok(Repeat::Daily),
            _ => {}
        }

        let (kind, arg) = upper.split_once(' ').ok_or_else(invalid)?;
        let arg = arg.trim();
        if arg.is_empty() {
            return Err(invalid());
        }

        match kind {
            "WEEKLY" => arg
                .split(',')
                .map(|code| parse_weekday_code(code.trim()))
                .collect::<Option<Vec<_>>>()
                .map(Repeat::Weekly)
                .ok_or_else(invalid),
            "MONTHLY" => MonthlyRule::parse(arg).map(Repeat::Monthly).ok_or_else(invalid),
            "YEARLY" => parse_yearly(arg).ok_or_else(invalid),
            _ => Err(invalid()),
        }
    }
}

/// `JAN05` / `JAN5` style month+day.
fn parse_yearly(arg: &str) -> Option<Repeat> {
    if arg.len() < 4 || !arg.is_char_boundary(3) {
        return None;
    }
    let (name, day) = arg.split_at(3);
    let month = parse_month_name(name)?;
    let day: u32 = day.parse().ok()?;
    // Feb 29 is allowed; it only matches in leap years.
    (1..=days_in_month(2024, month))
        .contains(&day)
        .then_some(Repeat::Yearly { month, day })
}

impl Serialize for Repeat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_repeat_text_forms() {
        assert_eq!("no".parse::<Repeat>().unwrap(), Repeat::No);
        assert_eq!("Daily".parse::<Repeat>().unwrap(), Repeat::Daily);
        assert_eq!(
            "weekly mo,we".parse::<Repeat>().unwrap(),
            Repeat::Weekly(vec![Weekday::Mon, Weekday::Wed])
        );
        assert_eq!(
            "MONTHLY 10".parse::<Repeat>().unwrap(),
            Repeat::Monthly(MonthlyRule::Day(10))
        );
        assert_eq!(
            "MONTHLY 2TU".parse::<Repeat>().unwrap(),
            Repeat::Monthly(MonthlyRule::Weekday { ordinal: 2, day: Weekday::Tue })
        );
        assert_eq!(
            "yearly jan05".parse::<Repeat>().unwrap(),
            Repeat::Yearly { month: 1, day: 5 }
        );
    }

    #[test]
    fn test_repeat_rejects_malformed() {
        for bad in ["", "WEEKLY", "WEEKLY ", "WEEKLY XX", "MONTHLY 32", "YEARLY FOO01", "YEARLY FEB30", "HOURLY 1"] {
            assert!(bad.parse::<Repeat>().is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_repeat_display_matches_parse() {
        for text in ["NO", "DAILY", "WEEKLY MO,WE", "MONTHLY 10", "MONTHLY -1FR", "YEARLY DEC25"] {
            assert_eq!(text.parse::<Repeat>().unwrap().to_string(), text);
        }
        assert_eq!(Repeat::Weekly(vec![]).to_string(), "WEEKLY");
    }

    #[test]
    fn test_monthly_nth_weekday_matching() {
        let second_tuesday = MonthlyRule::Weekday { ordinal: 2, day: Weekday::Tue };
        assert!(second_tuesday.matches(date(2025, 6, 10)));
        assert!(!second_tuesday.matches(date(2025, 6, 3)));

        let last_friday = MonthlyRule::Weekday { ordinal: -1, day: Weekday::Fri };
        assert!(last_friday.matches(date(2025, 6, 27)));
        assert!(!last_friday.matches(date(2025, 6, 20)));
    }

    #[test]
    fn test_event_text_accessors() {
        let mut event = Event::new("Standup", date(2025, 6, 1), NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        event.duration = Some(30);
        assert_eq!(event.start_date_str(), "20250601");
        assert_eq!(event.start_time_str(), "09:00");
        assert_eq!(event.duration_str(), "0:30");
        assert!(!event.is_recurring());
    }
}
