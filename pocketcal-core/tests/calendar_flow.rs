//! End-to-end runs of the calendar against a real events directory.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use pocketcal_core::hal::{DrawCall, FixedClock, Key, RecordingDisplay, ScriptedKeyboard};
use pocketcal_core::ics::parse_ics;
use pocketcal_core::nav::Screen;
use pocketcal_core::{Calendar, EngineConfig, Event, EventStore, FsStorage, Repeat};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(day: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    day.and_hms_opt(h, m, 0).unwrap()
}

/// Tick until the keyboard is drained, spacing ticks past every cadence.
fn run(
    cal: &mut Calendar<FsStorage>,
    kb: &mut ScriptedKeyboard,
    display: &mut RecordingDisplay,
    clock: &FixedClock,
    start_ms: u64,
) -> u64 {
    let mut now = start_ms;
    while !kb.is_empty() {
        cal.tick(now, kb, display, clock);
        now += 300;
    }
    // Let held messages expire and the last frame draw.
    now += 6_000;
    cal.tick(now, kb, display, clock);
    now
}

#[test]
fn test_standup_scenario() {
    let tmp = tempfile::tempdir().unwrap();
    let store = EventStore::new(FsStorage, tmp.path(), "calendar.ics");
    let today = date(2025, 6, 1);
    let mut cal = Calendar::new(store, &EngineConfig::default(), today);
    cal.activate(today);

    let mut standup = Event::new("Standup", today, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    standup.duration = Some(30);
    standup.repeat = "WEEKLY MO".parse::<Repeat>().unwrap();
    cal.add_event(standup).unwrap();

    assert_eq!(cal.query(date(2025, 6, 2)), 1);
    assert_eq!(cal.day_events().get(0).unwrap().name, "Standup");
    assert_eq!(cal.query(date(2025, 6, 3)), 0);
}

#[test]
fn test_add_then_delete_regenerates_canonical_file() {
    let tmp = tempfile::tempdir().unwrap();
    let canonical = tmp.path().join("calendar.ics");
    let today = date(2025, 6, 1);
    let clock = FixedClock::new(at(today, 8, 0));
    let store = EventStore::new(FsStorage, tmp.path(), "calendar.ics");
    let mut cal = Calendar::new(store, &EngineConfig::default(), today);
    cal.activate(today);

    let mut display = RecordingDisplay::new();
    let mut kb = ScriptedKeyboard::new()
        .line("n")
        .line("Dentist")
        .line("20250610")
        .line("14:00")
        .line("1:00")
        .line("NO")
        .line("Bring x-rays");
    let now = run(&mut cal, &mut kb, &mut display, &clock, 0);

    assert!(display.messages().contains(&"New Event \"Dentist\" Created"));
    let written = std::fs::read_to_string(&canonical).unwrap();
    let on_disk = parse_ics(&written);
    assert_eq!(on_disk.len(), 1);
    assert_eq!(on_disk[0].note, "Bring x-rays");
    assert_eq!(on_disk[0].duration, Some(60));

    let mut kb = ScriptedKeyboard::new().line("20250610").line("1").line("d");
    run(&mut cal, &mut kb, &mut display, &clock, now);

    assert!(display.messages().contains(&"Event : \"Dentist\" Deleted"));
    assert_eq!(cal.query(date(2025, 6, 10)), 0);
    let written = std::fs::read_to_string(&canonical).unwrap();
    assert!(written.starts_with("BEGIN:VCALENDAR"));
    assert!(!written.contains("Dentist"));
    assert!(parse_ics(&written).is_empty());
}

#[test]
fn test_short_date_rejected_without_advancing() {
    let tmp = tempfile::tempdir().unwrap();
    let today = date(2025, 6, 1);
    let clock = FixedClock::new(at(today, 8, 0));
    let store = EventStore::new(FsStorage, tmp.path(), "calendar.ics");
    let mut cal = Calendar::new(store, &EngineConfig::default(), today);
    cal.activate(today);

    let mut display = RecordingDisplay::new();
    let mut kb = ScriptedKeyboard::new().line("n").line("Dentist").line("2025131");
    run(&mut cal, &mut kb, &mut display, &clock, 0);

    assert_eq!(cal.screen(), Screen::NewEvent);
    assert_eq!(cal.line(), "2025131");
    assert!(display.messages().contains(&"Error: Invalid date (YYYYMMDD)"));
    assert!(display.calls.iter().any(|c| matches!(
        c,
        DrawCall::Echo { prompt: Some(p), .. } if p == "Enter the Start Date (YYYYMMDD)"
    )));
    assert!(!tmp.path().join("calendar.ics").exists());
}

#[test]
fn test_imported_files_are_read_but_never_rewritten() {
    let tmp = tempfile::tempdir().unwrap();
    let imported = tmp.path().join("holidays.ics");
    let holidays = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nBEGIN:VEVENT\r\nSUMMARY:New Year\r\n\
DTSTART;VALUE=DATE:20250101\r\nRRULE:FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=1\r\nEND:VEVENT\r\n\
END:VCALENDAR\r\n";
    std::fs::write(&imported, holidays).unwrap();

    let today = date(2026, 1, 1);
    let store = EventStore::new(FsStorage, tmp.path(), "calendar.ics");
    let mut cal = Calendar::new(store, &EngineConfig::default(), today);
    cal.activate(today);
    assert_eq!(cal.query(today), 1);

    cal.add_event(Event::new("Brunch", today, NaiveTime::from_hms_opt(11, 0, 0).unwrap()))
        .unwrap();
    assert_eq!(cal.query(today), 2);
    assert_eq!(std::fs::read_to_string(&imported).unwrap(), holidays);
}

#[test]
fn test_month_view_marks_today_bold() {
    let tmp = tempfile::tempdir().unwrap();
    let today = date(2025, 4, 10);
    let clock = FixedClock::new(at(today, 8, 0));
    let store = EventStore::new(FsStorage, tmp.path(), "calendar.ics");
    let mut cal = Calendar::new(store, &EngineConfig::default(), today);
    cal.activate(today);

    let mut display = RecordingDisplay::new();
    let mut kb = ScriptedKeyboard::new();
    cal.tick(0, &mut kb, &mut display, &clock);

    let bold: Vec<&str> = display
        .calls
        .iter()
        .filter_map(|c| match c {
            DrawCall::Text { text, font: pocketcal_core::hal::Font::Bold, .. } => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(bold, ["10"]);

    // Left then right lands back on the same month without today marked twice.
    let mut kb = ScriptedKeyboard::new().key(Key::Left).key(Key::Right);
    run(&mut cal, &mut kb, &mut display, &clock, 1_000);
    assert_eq!(display.last_status(), Some("Apr 2025 | Type a Date:"));
}
