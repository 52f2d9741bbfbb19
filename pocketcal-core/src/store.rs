//! The file-backed event store.
//!
//! All `.ics` files in the events directory are read on first use. Writes
//! always go to the single canonical file, which holds the whole store.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};

use crate::error::CalResult;
use crate::event::Event;
use crate::ics::{generate_ics, parse_ics};
use crate::storage::Storage;

pub struct EventStore<S: Storage> {
    storage: S,
    events_dir: PathBuf,
    canonical_file: String,
    events: Vec<Event>,
    loaded: bool,
}

impl<S: Storage> EventStore<S> {
    pub fn new(storage: S, events_dir: impl Into<PathBuf>, canonical_file: &str) -> Self {
        EventStore {
            storage,
            events_dir: events_dir.into(),
            canonical_file: canonical_file.to_string(),
            events: Vec::new(),
            loaded: false,
        }
    }

    pub fn events_dir(&self) -> &Path {
        &self.events_dir
    }

    pub fn canonical_path(&self) -> PathBuf {
        self.events_dir.join(&self.canonical_file)
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Stored events, ascending by start date. Empty until `load`.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Read every `.ics` file once. Later calls are no-ops.
    pub fn load(&mut self) {
        if self.loaded {
            return;
        }
        self.reload();
    }

    /// Drop the cache and read the events directory again.
    ///
    /// A missing directory or unreadable file is logged and contributes no
    /// events. The canonical file is read first; events in other files that
    /// already appear there are not loaded twice.
    pub fn reload(&mut self) {
        self.events.clear();
        self.loaded = true;

        let files = match self.storage.list(&self.events_dir) {
            Ok(files) => files,
            Err(e) => {
                warn!("Cannot open events directory {}: {}", self.events_dir.display(), e);
                return;
            }
        };

        let canonical = self.canonical_path();
        let mut ics_files: Vec<PathBuf> = files
            .into_iter()
            .filter(|path| path.extension().is_some_and(|e| e.eq_ignore_ascii_case("ics")))
            .collect();
        ics_files.sort_by_key(|path| *path != canonical);

        let mut from_canonical: HashSet<usize> = HashSet::new();
        for path in ics_files {
            let lines = match self.storage.read_lines(&path) {
                Ok(lines) => lines,
                Err(e) => {
                    error!("Failed to open ICS file {}: {}", path.display(), e);
                    continue;
                }
            };

            let parsed = parse_ics(&lines.join("\r\n"));
            info!("Parsed {} events from {}", parsed.len(), path.display());

            if path == canonical {
                from_canonical.extend(self.events.len()..self.events.len() + parsed.len());
                self.events.extend(parsed);
                continue;
            }

            for event in parsed {
                let duplicate = from_canonical.iter().any(|&i| self.events[i] == event);
                if !duplicate {
                    self.events.push(event);
                }
            }
        }

        sort_by_start_date(&mut self.events);
        info!("Loaded {} events", self.events.len());
    }

    /// Insert, re-sort and persist.
    pub fn add(&mut self, event: Event) -> CalResult<()> {
        self.load();
        self.events.push(event);
        sort_by_start_date(&mut self.events);
        self.persist()
    }

    /// Remove the first entry equal to `target`, then persist.
    ///
    /// Returns `Ok(false)` and writes nothing when no entry matches.
    pub fn delete(&mut self, target: &Event) -> CalResult<bool> {
        self.load();
        let Some(pos) = self.events.iter().position(|e| e == target) else {
            return Ok(false);
        };
        self.events.remove(pos);
        self.persist()?;
        Ok(true)
    }

    /// Replace the first entry equal to `target` with `updated`, then persist.
    pub fn update(&mut self, target: &Event, updated: Event) -> CalResult<bool> {
        self.load();
        let Some(slot) = self.events.iter_mut().find(|e| *e == target) else {
            return Ok(false);
        };
        *slot = updated;
        sort_by_start_date(&mut self.events);
        self.persist()?;
        Ok(true)
    }

    /// Rewrite the canonical file from the in-memory store.
    ///
    /// On failure the in-memory store keeps the change but the file does not.
    pub fn persist(&mut self) -> CalResult<()> {
        let path = self.canonical_path();
        let result = generate_ics(&self.events, Utc::now()).and_then(|ics| {
            let lines: Vec<String> = ics.lines().map(String::from).collect();
            self.storage.create_dir_all(&self.events_dir)?;
            self.storage.write_lines(&path, &lines)
        });

        match &result {
            Ok(()) => info!("Wrote {} events to {}", self.events.len(), path.display()),
            Err(e) => error!("Failed to open {} for writing: {}", path.display(), e),
        }
        result
    }
}

/// Stable sort, so same-day events keep insertion order.
fn sort_by_start_date(events: &mut [Event]) {
    events.sort_by_key(|e| e.start_date);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Repeat;
    use crate::ics::parse_ics;
    use crate::storage::MemoryStorage;
    use chrono::{NaiveDate, NaiveTime};

    const DIR: &str = "/sys/events";

    fn event(name: &str, y: i32, m: u32, d: u32) -> Event {
        Event::new(
            name,
            NaiveDate::from_ymd_opt(y, m, d).unwrap(),
            NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
        )
    }

    fn store(storage: MemoryStorage) -> EventStore<MemoryStorage> {
        EventStore::new(storage, DIR, "calendar.ics")
    }

    #[test]
    fn test_missing_directory_is_empty_store() {
        let mut store = store(MemoryStorage::new());
        store.load();
        assert!(store.is_loaded());
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_load_reads_only_ics_files_and_sorts() {
        let storage = MemoryStorage::new()
            .with_file(
                "/sys/events/b.ics",
                "BEGIN:VEVENT\nSUMMARY:Late\nDTSTART:20250901\nEND:VEVENT",
            )
            .with_file(
                "/sys/events/a.ics",
                "BEGIN:VEVENT\nSUMMARY:Early\nDTSTART:20250101\nEND:VEVENT",
            )
            .with_file("/sys/events/notes.txt", "BEGIN:VEVENT\nDTSTART:20250101\nEND:VEVENT");
        let mut store = store(storage);
        store.load();

        let names: Vec<&str> = store.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Early", "Late"]);
    }

    #[test]
    fn test_load_is_idempotent() {
        let storage = MemoryStorage::new().with_file(
            "/sys/events/a.ics",
            "BEGIN:VEVENT\nSUMMARY:A\nDTSTART:20250101\nEND:VEVENT",
        );
        let mut store = store(storage);
        store.load();
        store.load();
        assert_eq!(store.events().len(), 1);
    }

    #[test]
    fn test_add_sorts_and_persists_canonical_file() {
        let mut store = store(MemoryStorage::new());
        store.add(event("Second", 2025, 6, 10)).unwrap();
        store.add(event("First", 2025, 6, 1)).unwrap();

        assert_eq!(store.events()[0].name, "First");
        let written = store.storage().contents(&store.canonical_path()).unwrap();
        let reparsed = parse_ics(&written);
        assert_eq!(reparsed, store.events());
    }

    #[test]
    fn test_delete_removes_first_equal_entry_only() {
        let mut store = store(MemoryStorage::new());
        store.add(event("Twin", 2025, 6, 1)).unwrap();
        store.add(event("Twin", 2025, 6, 1)).unwrap();

        assert!(store.delete(&event("Twin", 2025, 6, 1)).unwrap());
        assert_eq!(store.events().len(), 1);
        assert!(!store.delete(&event("Ghost", 2025, 6, 1)).unwrap());
    }

    #[test]
    fn test_update_replaces_and_resorts() {
        let mut store = store(MemoryStorage::new());
        store.add(event("A", 2025, 6, 1)).unwrap();
        store.add(event("B", 2025, 6, 5)).unwrap();

        let mut moved = event("A", 2025, 6, 9);
        moved.repeat = Repeat::Daily;
        assert!(store.update(&event("A", 2025, 6, 1), moved.clone()).unwrap());

        assert_eq!(store.events()[1], moved);
        let written = store.storage().contents(&store.canonical_path()).unwrap();
        assert!(written.contains("RRULE:FREQ=DAILY"));
    }

    #[test]
    fn test_failed_persist_keeps_memory_change() {
        let mut storage = MemoryStorage::new();
        storage.read_only = true;
        let mut store = store(storage);

        assert!(store.add(event("Volatile", 2025, 6, 1)).is_err());
        assert_eq!(store.events().len(), 1);
        assert!(store.storage().contents(&store.canonical_path()).is_none());
    }

    #[test]
    fn test_imported_file_not_duplicated_after_persist() {
        let storage = MemoryStorage::new().with_file(
            "/sys/events/import.ics",
            "BEGIN:VEVENT\nSUMMARY:Imported\nDTSTART:20250301T100000\nEND:VEVENT",
        );
        let mut store = store(storage);
        store.add(event("Mine", 2025, 3, 2)).unwrap();

        store.reload();
        let names: Vec<&str> = store.events().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["Imported", "Mine"]);
    }

    #[test]
    fn test_multiline_import_stays_single_across_sessions() {
        let storage = MemoryStorage::new().with_file(
            "/sys/events/import.ics",
            "BEGIN:VEVENT\r\nSUMMARY:Imported\\nfrom Outlook\r\nDTSTART:20250301T100000\r\n\
DESCRIPTION:line one\\nline two\r\nEND:VEVENT",
        );
        let mut store = store(storage);

        for day in 2..5 {
            store.add(event(&format!("Mine{day}"), 2025, 3, day)).unwrap();
            store.reload();
        }

        let imported: Vec<&Event> = store
            .events()
            .iter()
            .filter(|e| e.name.starts_with("Imported"))
            .collect();
        assert_eq!(imported.len(), 1);
        assert_eq!(imported[0].name, "Imported\nfrom Outlook");
        assert_eq!(imported[0].note, "line one\nline two");
        assert_eq!(store.events().len(), 4);
    }
}
