//! Parsing of dates and times typed on the command line.
//!
//! Strict ISO forms are tried first so scripts get exact behavior; anything
//! else goes through fuzzydate ("friday 6pm", "dec 24").

use anyhow::{Result, anyhow};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

const STRICT_DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

/// A point in time as the user wrote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    /// A whole day, e.g. "2024-12-24" or "friday".
    Day(NaiveDate),
    /// Wall-clock time in the local zone.
    Local(NaiveDateTime),
    /// An exact instant (RFC 3339 with an offset).
    Instant(DateTime<Utc>),
}

impl When {
    pub fn is_all_day(&self) -> bool {
        matches!(self, When::Day(_))
    }

    /// Earliest instant covered. Midnight for whole days.
    pub fn start<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>> {
        match self {
            When::Day(date) => {
                let midnight = date
                    .and_hms_opt(0, 0, 0)
                    .ok_or_else(|| anyhow!("Invalid date: {}", date))?;
                to_utc(midnight, tz)
            }
            When::Local(dt) => to_utc(*dt, tz),
            When::Instant(dt) => Ok(*dt),
        }
    }

    /// Latest instant covered. The last second for whole days.
    pub fn end<Tz: TimeZone>(&self, tz: &Tz) -> Result<DateTime<Utc>> {
        match self {
            When::Day(date) => {
                let last_second = date
                    .and_hms_opt(23, 59, 59)
                    .ok_or_else(|| anyhow!("Invalid date: {}", date))?;
                to_utc(last_second, tz)
            }
            When::Local(dt) => to_utc(*dt, tz),
            When::Instant(dt) => Ok(*dt),
        }
    }
}

fn to_utc<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz) -> Result<DateTime<Utc>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| anyhow!("{} does not exist in the local time zone", naive))
}

/// Parse a date or date/time.
/// Input with a time (am/pm, HH:MM, noon, midnight, "at 3") becomes
/// `When::Local`, anything else a whole day.
pub fn parse_when(input: &str) -> Result<When> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(When::Instant(dt.with_timezone(&Utc)));
    }
    for format in STRICT_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(When::Local(dt));
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(When::Day(date));
    }

    let expanded = expand_abbreviations(input);
    let dt = fuzzydate::parse(&expanded)
        .map_err(|_| anyhow!("Could not parse date/time: \"{}\"", input))?;

    if has_time_component(input) {
        Ok(When::Local(dt))
    } else {
        Ok(When::Day(dt.date()))
    }
}

/// Start and end instants of an event.
/// Without an explicit end a timed event lasts an hour and an all-day event
/// covers its own day.
pub fn event_bounds<Tz: TimeZone>(
    start: &str,
    end: Option<&str>,
    tz: &Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    let start_when = parse_when(start)?;
    let start = start_when.start(tz)?;

    let end = match end {
        Some(end) => parse_when(end)?.end(tz)?,
        None if start_when.is_all_day() => start_when.end(tz)?,
        None => start + Duration::hours(1),
    };

    Ok((start, end))
}

/// Expand common abbreviations that fuzzydate doesn't handle.
fn expand_abbreviations(input: &str) -> String {
    let abbrevs = [
        ("mon", "monday"),
        ("tue", "tuesday"),
        ("tues", "tuesday"),
        ("wed", "wednesday"),
        ("thu", "thursday"),
        ("thur", "thursday"),
        ("thurs", "thursday"),
        ("fri", "friday"),
        ("sat", "saturday"),
        ("sun", "sunday"),
        ("jan", "january"),
        ("feb", "february"),
        ("mar", "march"),
        ("apr", "april"),
        ("jun", "june"),
        ("jul", "july"),
        ("aug", "august"),
        ("sep", "september"),
        ("sept", "september"),
        ("oct", "october"),
        ("nov", "november"),
        ("dec", "december"),
    ];

    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            abbrevs
                .iter()
                .find(|(abbr, _)| *abbr == word)
                .map(|(_, full)| *full)
                .unwrap_or(word)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Check if the input contains time-related tokens.
fn has_time_component(input: &str) -> bool {
    let lower = input.to_lowercase();

    if lower.contains("noon") || lower.contains("midnight") {
        return true;
    }

    // "6pm", "6 pm", "11am"
    let bytes = lower.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if (b == b'a' || b == b'p') && bytes.get(i + 1) == Some(&b'm') {
            if i > 0 && bytes[i - 1].is_ascii_digit() {
                return true;
            }
            if i > 1 && bytes[i - 1] == b' ' && bytes[i - 2].is_ascii_digit() {
                return true;
            }
        }
    }

    // HH:MM
    for (i, &b) in bytes.iter().enumerate() {
        if b == b':' {
            let digit_before = i > 0 && bytes[i - 1].is_ascii_digit();
            let digit_after = bytes.get(i + 1).is_some_and(|c| c.is_ascii_digit());
            if digit_before && digit_after {
                return true;
            }
        }
    }

    // "at 3", "friday at 15"
    let after_at = lower
        .find(" at ")
        .map(|pos| &lower[pos + 4..])
        .or_else(|| lower.strip_prefix("at "));
    after_at.is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
}
