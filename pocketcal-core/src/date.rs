//! Calendar arithmetic and the fixed-width date/time text forms.
//!
//! Dates travel as `YYYYMMDD`, times as `HH:MM` and durations as whole
//! minutes (shown as `H:MM`). Everything here is pure.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::{CalError, CalResult};

/// Sunday-first weekday table, indexed by `day_of_week`.
pub const WEEKDAYS: [Weekday; 7] = [
    Weekday::Sun,
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
];

const WEEKDAY_CODES: [&str; 7] = ["SU", "MO", "TU", "WE", "TH", "FR", "SA"];

const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day of the week for a Gregorian date, 0 = Sunday .. 6 = Saturday.
///
/// Zeller's congruence, shifted so the week starts on Sunday.
pub fn day_of_week(year: i32, month: u32, day: u32) -> u32 {
    let (mut y, mut m) = (year, month as i32);
    if m < 3 {
        m += 12;
        y -= 1;
    }

    let k = y.rem_euclid(100);
    let j = y.div_euclid(100);
    let h = (day as i32 + 13 * (m + 1) / 5 + k + k / 4 + j / 4 + 5 * j).rem_euclid(7);

    ((h + 6) % 7) as u32
}

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` (1-12) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Roll possibly out-of-range components into a real date-time.
///
/// `month` may be outside 1-12 and `day`, `hour`, `minute` may overflow or
/// underflow by any amount; the excess carries through as many month and
/// year boundaries as needed.
pub fn normalize(
    year: i32,
    month: i32,
    day: i32,
    hour: i32,
    minute: i32,
) -> CalResult<NaiveDateTime> {
    let months = year as i64 * 12 + (month as i64 - 1);
    let y = months.div_euclid(12);
    let m = months.rem_euclid(12) as u32 + 1;

    let first = i32::try_from(y)
        .ok()
        .and_then(|y| NaiveDate::from_ymd_opt(y, m, 1))
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| CalError::DateOutOfRange(format!("{year}-{month}")))?;

    let offset = (day as i64 - 1) * 24 * 60 + hour as i64 * 60 + minute as i64;

    first
        .checked_add_signed(Duration::minutes(offset))
        .ok_or_else(|| {
            CalError::DateOutOfRange(format!("{year}-{month}-{day} {hour}:{minute}"))
        })
}

/// `date` shifted by a signed number of days.
pub fn add_days(date: NaiveDate, days: i64) -> CalResult<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
        .ok_or_else(|| CalError::DateOutOfRange(format!("{date} + {days} days")))
}

pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Parse an 8-digit `YYYYMMDD` string into a real calendar date.
pub fn parse_yyyymmdd(s: &str) -> CalResult<NaiveDate> {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CalError::InvalidDate(s.to_string()));
    }

    let year: i32 = s[0..4].parse().map_err(|_| CalError::InvalidDate(s.to_string()))?;
    let month: u32 = s[4..6].parse().map_err(|_| CalError::InvalidDate(s.to_string()))?;
    let day: u32 = s[6..8].parse().map_err(|_| CalError::InvalidDate(s.to_string()))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| CalError::InvalidDate(s.to_string()))
}

pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Parse a 5-character `HH:MM` string.
pub fn parse_hhmm(s: &str) -> CalResult<NaiveTime> {
    let b = s.as_bytes();
    let well_formed = b.len() == 5
        && b[2] == b':'
        && [0, 1, 3, 4].iter().all(|&i| b[i].is_ascii_digit());
    if !well_formed {
        return Err(CalError::InvalidTime(s.to_string()));
    }

    let hour: u32 = s[0..2].parse().map_err(|_| CalError::InvalidTime(s.to_string()))?;
    let minute: u32 = s[3..5].parse().map_err(|_| CalError::InvalidTime(s.to_string()))?;

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(|| CalError::InvalidTime(s.to_string()))
}

/// Render whole minutes as `H:MM`.
pub fn format_duration(minutes: u32) -> String {
    format!("{}:{:02}", minutes / 60, minutes % 60)
}

/// Parse `H:MM` or `HH:MM` into whole minutes.
pub fn parse_duration(s: &str) -> CalResult<u32> {
    let invalid = || CalError::InvalidDuration(s.to_string());

    let (hours, minutes) = s.split_once(':').ok_or_else(invalid)?;
    if !(1..=2).contains(&hours.len())
        || minutes.len() != 2
        || !hours.bytes().chain(minutes.bytes()).all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    Ok(hours * 60 + minutes)
}

/// Parse a wall-clock setting: `H:MM`, `HH:MM`, `HMM` or `HHMM`.
pub fn parse_clock_time(s: &str) -> CalResult<NaiveTime> {
    let s = s.trim();
    let invalid = || CalError::InvalidTime(s.to_string());

    let (hour, minute) = match s.split_once(':') {
        Some((h, m)) => {
            if !(1..=2).contains(&h.len()) || m.len() != 2 {
                return Err(invalid());
            }
            (h.parse::<u32>().map_err(|_| invalid())?, m.parse::<u32>().map_err(|_| invalid())?)
        }
        None => {
            if !(3..=4).contains(&s.len()) {
                return Err(invalid());
            }
            let value: u32 = s.parse().map_err(|_| invalid())?;
            (value / 100, value % 100)
        }
    };

    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Two-letter iCalendar day code (`SU`, `MO`, ...).
pub fn weekday_code(day: Weekday) -> &'static str {
    WEEKDAY_CODES[day.num_days_from_sunday() as usize]
}

pub fn parse_weekday_code(code: &str) -> Option<Weekday> {
    WEEKDAY_CODES
        .iter()
        .position(|c| c.eq_ignore_ascii_case(code))
        .map(|i| WEEKDAYS[i])
}

/// Match a typed weekday: two-letter code, three-letter abbreviation or
/// the full English name, any case.
pub fn parse_weekday_name(input: &str) -> Option<Weekday> {
    let input = input.trim().to_lowercase();
    if input.len() < 2 {
        return None;
    }

    WEEKDAY_NAMES
        .iter()
        .position(|name| match input.len() {
            2 | 3 => name.starts_with(&input),
            _ => *name == input,
        })
        .map(|i| WEEKDAYS[i])
}

/// Three-letter month name, `"ERR"` outside 1-12.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[month as usize - 1],
        _ => "ERR",
    }
}

/// Month number for a three-letter month name, any case.
pub fn parse_month_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_days_in_month_leap_rules() {
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2025, 4), 30);
        assert_eq!(days_in_month(2025, 12), 31);
    }

    #[test]
    fn test_days_in_month_matches_chrono() {
        for year in [1970, 1999, 2000, 2024, 2100, 2200] {
            for month in 1..=12 {
                let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
                };
                assert_eq!(
                    days_in_month(year, month) as i64,
                    (next - first).num_days(),
                    "{year}-{month}"
                );
            }
        }
    }

    #[test]
    fn test_day_of_week_reference_dates() {
        assert_eq!(day_of_week(2024, 1, 1), 1); // Monday
        assert_eq!(day_of_week(2025, 4, 1), 2); // Tuesday
        assert_eq!(day_of_week(2025, 6, 15), 0); // Sunday
        assert_eq!(day_of_week(1970, 1, 1), 4); // Thursday
        assert_eq!(day_of_week(2000, 2, 29), 2); // Tuesday
    }

    #[test]
    fn test_day_of_week_agrees_with_chrono_across_range() {
        let mut date = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2200, 12, 31).unwrap();
        while date <= end {
            assert_eq!(
                day_of_week(date.year(), date.month(), date.day()),
                date.weekday().num_days_from_sunday(),
                "{date}"
            );
            date += Duration::days(13);
        }
    }

    #[test]
    fn test_normalize_rolls_across_multiple_months() {
        let dt = normalize(2025, 1, 31 + 28 + 5, 0, 0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 3, 5).unwrap());

        let dt = normalize(2024, 12, 31, 23, 90).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!((dt.hour(), dt.minute()), (0, 30));
    }

    #[test]
    fn test_normalize_rolls_backwards() {
        let dt = normalize(2025, 3, 0, 0, 0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2025, 2, 28).unwrap());

        let dt = normalize(2025, 1, -3, 0, 0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 12, 28).unwrap());

        let dt = normalize(2025, -1, 1, 0, 0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2024, 11, 1).unwrap());
    }

    #[test]
    fn test_parse_yyyymmdd_rejects_bad_input() {
        assert!(parse_yyyymmdd("2025131").is_err());
        assert!(parse_yyyymmdd("2025-1-01").is_err());
        assert!(parse_yyyymmdd("20250230").is_err());
        assert!(parse_yyyymmdd("2025013x").is_err());
        assert_eq!(
            parse_yyyymmdd("20250615").unwrap(),
            NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
        );
    }

    #[test]
    fn test_hhmm_format_and_parse() {
        let t = parse_hhmm("09:05").unwrap();
        assert_eq!(format_hhmm(t), "09:05");
        assert!(parse_hhmm("9:05").is_err());
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("12-30").is_err());
    }

    #[test]
    fn test_duration_parse() {
        assert_eq!(parse_duration("1:30").unwrap(), 90);
        assert_eq!(parse_duration("10:00").unwrap(), 600);
        assert_eq!(parse_duration("0:45").unwrap(), 45);
        assert!(parse_duration("130").is_err());
        assert!(parse_duration("100:00").is_err());
        assert!(parse_duration("1:3").is_err());
        assert!(parse_duration(":30").is_err());
        assert_eq!(format_duration(90), "1:30");
        assert_eq!(format_duration(5), "0:05");
    }

    #[test]
    fn test_parse_clock_time_forms() {
        assert_eq!(parse_clock_time("7:45").unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(parse_clock_time("0745").unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert_eq!(parse_clock_time("745").unwrap(), NaiveTime::from_hms_opt(7, 45, 0).unwrap());
        assert!(parse_clock_time("24:00").is_err());
        assert!(parse_clock_time("7:5").is_err());
        assert!(parse_clock_time("12").is_err());
    }

    #[test]
    fn test_weekday_names() {
        assert_eq!(parse_weekday_name("su"), Some(Weekday::Sun));
        assert_eq!(parse_weekday_name("Wed"), Some(Weekday::Wed));
        assert_eq!(parse_weekday_name("thursday"), Some(Weekday::Thu));
        assert_eq!(parse_weekday_name("t"), None);
        assert_eq!(parse_weekday_name("thurs"), None);
        assert_eq!(weekday_code(Weekday::Fri), "FR");
        assert_eq!(parse_weekday_code("we"), Some(Weekday::Wed));
    }

    #[test]
    fn test_week_start_is_sunday() {
        let wed = NaiveDate::from_ymd_opt(2025, 6, 4).unwrap();
        assert_eq!(week_start(wed), NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
        let sun = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(week_start(sun), sun);
    }
}
