/// Upper bound on the query result for a single date.
pub const MAX_DAY_EVENTS: usize = 7;

/// Events drawn per day column in the week view.
pub const WEEK_VIEW_MAX_EVENTS: usize = 6;

/// Characters of the event name shown in a week view column.
pub const WEEK_VIEW_NAME_CHARS: usize = 6;

/// Supported year range for typed date commands.
pub const MIN_YEAR: i32 = 1970;
pub const MAX_YEAR: i32 = 2200;

pub const DEFAULT_CANONICAL_FILE: &str = "calendar.ics";

pub const PRODID: &str = "-//PocketCal//CalendarApp//EN";
