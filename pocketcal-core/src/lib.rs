//! Calendar engine for the PocketCal e-paper handheld.
//!
//! This crate holds everything below the hardware:
//! - `date` and `event` for the data model and its text forms
//! - `ics` for reading and writing `.ics` files
//! - `store` and `query` for the file-backed event list and recurrence matching
//! - `view`, `nav` and `editor` for the screens and their state machines
//! - `engine` for the `Calendar` controller driven by `tick`
//! - `hal` and `storage` for the keyboard, display, clock and SD card seams

pub mod config;
pub mod constants;
pub mod date;
pub mod editor;
pub mod engine;
pub mod error;
pub mod event;
pub mod hal;
pub mod ics;
pub mod input;
pub mod nav;
pub mod query;
pub mod storage;
pub mod store;
pub mod view;

pub use config::EngineConfig;
pub use engine::{Calendar, Tick};
pub use error::{CalError, CalResult};
pub use event::{Event, MonthlyRule, Repeat};
pub use storage::{FsStorage, MemoryStorage, Storage};
pub use store::EventStore;
