//! ICS file generation and parsing.
//!
//! Only the properties the handheld understands are read or written:
//! SUMMARY, DTSTART, DTEND, RRULE, DESCRIPTION, UID and DTSTAMP.

mod generate;
mod parse;
mod rrule;

pub use generate::generate_ics;
pub use parse::{parse_ics, parse_lines};
pub use rrule::{decode_rrule, encode_rrule};
