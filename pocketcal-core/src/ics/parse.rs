//! Tolerant, line-oriented ICS reading.
//!
//! A broken VEVENT never aborts the file: missing fields fall back to their
//! defaults, and only a block without a usable DTSTART is dropped.

use chrono::{NaiveDate, NaiveTime};
use icalendar::parser::unfold;
use tracing::warn;

use super::rrule::decode_rrule;
use crate::date::parse_yyyymmdd;
use crate::event::{Event, Repeat};

/// Parse the full text of an .ics file.
pub fn parse_ics(content: &str) -> Vec<Event> {
    let unfolded = unfold(content);
    parse_lines(unfolded.lines())
}

/// Parse already-unfolded ICS lines. Blank lines are skipped and every line
/// is trimmed before use.
pub fn parse_lines<'a, I>(lines: I) -> Vec<Event>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut events = Vec::new();
    let mut block: Option<Vec<ContentLine>> = None;
    // Depth of components nested inside the current VEVENT (VALARM etc).
    let mut nested = 0usize;

    for line in lines.into_iter().map(str::trim).filter(|l| !l.is_empty()) {
        let upper = line.to_ascii_uppercase();

        if upper == "BEGIN:VEVENT" {
            block = Some(Vec::new());
            nested = 0;
            continue;
        }

        if upper == "END:VEVENT" {
            if let Some(props) = block.take() {
                match event_from_block(&props) {
                    Some(event) => events.push(event),
                    None => warn!("Skipping VEVENT without a usable DTSTART"),
                }
            }
            continue;
        }

        let Some(props) = block.as_mut() else {
            continue;
        };

        if upper.starts_with("BEGIN:") {
            nested += 1;
        } else if upper.starts_with("END:") {
            nested = nested.saturating_sub(1);
        } else if nested == 0 {
            if let Some(prop) = ContentLine::parse(line) {
                props.push(prop);
            }
        }
    }

    events
}

/// One `NAME;PARAM=X:value` line.
#[derive(Debug)]
struct ContentLine {
    name: String,
    value: String,
}

impl ContentLine {
    fn parse(line: &str) -> Option<Self> {
        // The value starts at the first colon outside a quoted parameter.
        let mut in_quotes = false;
        let colon = line.char_indices().find_map(|(i, c)| match c {
            '"' => {
                in_quotes = !in_quotes;
                None
            }
            ':' if !in_quotes => Some(i),
            _ => None,
        })?;

        let head = &line[..colon];
        let name = head.split(';').next().unwrap_or(head).trim();
        if name.is_empty() {
            return None;
        }

        Some(ContentLine {
            name: name.to_ascii_uppercase(),
            value: line[colon + 1..].to_string(),
        })
    }
}

fn find<'a>(props: &'a [ContentLine], name: &str) -> Option<&'a str> {
    props.iter().find(|p| p.name == name).map(|p| p.value.as_str())
}

fn event_from_block(props: &[ContentLine]) -> Option<Event> {
    let (start_date, start_time) = parse_ics_datetime(find(props, "DTSTART")?)?;

    let name = find(props, "SUMMARY")
        .map(unescape_text)
        .unwrap_or_else(|| "(No title)".to_string());

    let duration = find(props, "DTEND")
        .and_then(parse_ics_datetime)
        .and_then(|(end_date, end_time)| same_day_minutes(start_date, start_time, end_date, end_time));

    let repeat = find(props, "RRULE")
        .map(unescape_text)
        .and_then(|rule| decode_rrule(&rule))
        .unwrap_or(Repeat::No);

    let note = find(props, "DESCRIPTION").map(unescape_text).unwrap_or_default();

    Some(Event {
        name,
        start_date,
        start_time,
        duration,
        repeat,
        note,
    })
}

/// `YYYYMMDD`, `YYYYMMDDTHHMM[SS][Z]`. The time is `00:00` when absent.
fn parse_ics_datetime(value: &str) -> Option<(NaiveDate, NaiveTime)> {
    let value = value.trim();
    let date = parse_yyyymmdd(value.get(0..8)?).ok()?;

    let midnight = NaiveTime::from_hms_opt(0, 0, 0)?;
    if value.as_bytes().get(8) != Some(&b'T') {
        return Some((date, midnight));
    }

    let hour: u32 = value.get(9..11)?.parse().ok()?;
    let minute: u32 = value.get(11..13)?.parse().ok()?;
    Some((date, NaiveTime::from_hms_opt(hour, minute, 0)?))
}

/// Minutes between start and end on the same day. Ends on another day, or
/// before the start, have no duration.
fn same_day_minutes(
    start_date: NaiveDate,
    start_time: NaiveTime,
    end_date: NaiveDate,
    end_time: NaiveTime,
) -> Option<u32> {
    if start_date != end_date || end_time < start_time {
        return None;
    }
    u32::try_from((end_time - start_time).num_minutes()).ok()
}

/// Undo RFC 5545 TEXT escaping.
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
