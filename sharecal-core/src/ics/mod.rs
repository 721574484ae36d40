//! ICS generation and parsing.
//!
//! The store keeps one VEVENT per file and carries sharecal-specific fields as
//! `X-SHARECAL-*` properties; exports are a single VCALENDAR meant for other
//! calendar apps.

mod generate;
mod parse;

pub use generate::{export_calendar, generate_ics};
pub use parse::{parse_calendar, parse_event};

pub(crate) const PROP_COST: &str = "X-SHARECAL-COST";
pub(crate) const PROP_CREATOR: &str = "X-SHARECAL-CREATOR";
pub(crate) const PROP_ACCESS: &str = "X-SHARECAL-ACCESS";
pub(crate) const PROP_ATTACHMENT_PATH: &str = "X-SHARECAL-ATTACHMENT-PATH";
pub(crate) const PROP_ATTACHMENT_NAME: &str = "X-SHARECAL-ATTACHMENT-NAME";
