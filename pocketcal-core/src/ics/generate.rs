//! ICS file generation.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc};
use icalendar::{Calendar, Component, EventLike};

use super::rrule::encode_rrule;
use crate::constants::PRODID;
use crate::date::normalize;
use crate::error::CalResult;
use crate::event::Event;

/// Generate one VCALENDAR holding every event, in order.
///
/// UIDs are derived from the position in `events` and the write time, so
/// they are unique within a write.
pub fn generate_ics(events: &[Event], written_at: DateTime<Utc>) -> CalResult<String> {
    let dtstamp = written_at.format("%Y%m%dT%H%M%SZ").to_string();
    let mut cal = Calendar::new();

    for (index, event) in events.iter().enumerate() {
        let start = event.start_date.and_time(event.start_time);

        let mut ics_event = icalendar::Event::new();
        ics_event.uid(&format!("PM_{index}_{dtstamp}@pocketcal"));
        ics_event.add_property("DTSTAMP", &dtstamp);
        ics_event.summary(&unix_newlines(&event.name));
        ics_event.add_property("DTSTART", format_ics_datetime(start));

        if let Some(minutes) = event.duration {
            let end = normalize(
                start.year(),
                start.month() as i32,
                start.day() as i32,
                start.hour() as i32,
                (start.minute() + minutes) as i32,
            )?;
            ics_event.add_property("DTEND", format_ics_datetime(end));
        }

        if let Some(rrule) = encode_rrule(&event.repeat) {
            ics_event.add_property("RRULE", &rrule);
        }

        ics_event.description(&unix_newlines(&event.note));

        cal.push(ics_event.done());
    }

    Ok(strip_ics_bloat(&cal.done().to_string()))
}

fn format_ics_datetime(dt: NaiveDateTime) -> String {
    dt.format("%Y%m%dT%H%M%S").to_string()
}

/// icalendar escapes `\n` in TEXT values but writes a bare `\r` through.
fn unix_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

/// Clean up ICS output from the icalendar crate
/// - Replace PRODID with ours
/// - Remove CALSCALE:GREGORIAN (it's the default)
fn strip_ics_bloat(ics: &str) -> String {
    let mut result = String::with_capacity(ics.len());

    for line in ics.lines() {
        if line.starts_with("PRODID:") {
            result.push_str("PRODID:");
            result.push_str(PRODID);
            result.push_str("\r\n");
            continue;
        }

        if line == "CALSCALE:GREGORIAN" {
            continue;
        }

        result.push_str(line);
        result.push_str("\r\n");
    }

    result
}
