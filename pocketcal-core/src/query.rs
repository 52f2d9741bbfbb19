//! Which stored events fall on a given date.
//!
//! One recurrence algorithm serves every view: an event never matches before
//! its start date, always matches on it, and afterwards matches according to
//! its repeat rule.

use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::constants::MAX_DAY_EVENTS;
use crate::date::{WEEKDAYS, day_of_week};
use crate::event::{Event, Repeat};

/// Whether `event` occurs on `date`.
pub fn occurs_on(event: &Event, date: NaiveDate) -> bool {
    if date < event.start_date {
        return false;
    }
    if date == event.start_date {
        return true;
    }

    match &event.repeat {
        Repeat::No => false,
        Repeat::Daily => true,
        Repeat::Weekly(_) => {
            let dow = day_of_week(date.year(), date.month(), date.day());
            event.repeat.is_weekly_on(WEEKDAYS[dow as usize])
        }
        Repeat::Monthly(rule) => rule.matches(date),
        Repeat::Yearly { month, day } => date.month() == *month && date.day() == *day,
    }
}

/// Events occurring on `date`, in store order, at most `MAX_DAY_EVENTS`.
pub fn query(events: &[Event], date: NaiveDate) -> Vec<Event> {
    events
        .iter()
        .filter(|e| occurs_on(e, date))
        .take(MAX_DAY_EVENTS)
        .cloned()
        .collect()
}

/// The query result backing the current view and edit target.
#[derive(Debug, Default, Clone)]
pub struct DayEvents {
    date: Option<NaiveDate>,
    events: Vec<Event>,
}

impl DayEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear and recompute for `date`. Returns the match count.
    pub fn refresh(&mut self, events: &[Event], date: NaiveDate) -> usize {
        self.events = query(events, date);
        self.date = Some(date);
        debug!("{} events on {}", self.events.len(), date.format("%Y%m%d"));
        self.events.len()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    pub fn remove(&mut self, index: usize) -> Option<Event> {
        (index < self.events.len()).then(|| self.events.remove(index))
    }

    /// Swap in `event` at `index`, returning the previous entry.
    pub fn replace(&mut self, index: usize, event: Event) -> Option<Event> {
        let slot = self.events.get_mut(index)?;
        Some(std::mem::replace(slot, event))
    }
}
