//! Date range for filtering events.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::error::{SharecalError, SharecalResult};
use crate::event::Event;

/// Date range for filtering events.
/// None values mean unbounded in that direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn unbounded() -> Self {
        DateRange::default()
    }

    /// Whole calendar days `first..=last` as seen in `tz`.
    pub fn days<Tz: TimeZone>(first: NaiveDate, last: NaiveDate, tz: &Tz) -> Self {
        DateRange {
            from: start_of_day(first, tz),
            to: end_of_day(last, tz),
        }
    }

    /// Parse YYYY-MM-DD bounds into a DateRange.
    /// - `from`: "start" or missing for unbounded
    /// - `to`: missing for unbounded
    pub fn from_args<Tz: TimeZone>(from: Option<&str>, to: Option<&str>, tz: &Tz) -> SharecalResult<Self> {
        let from_dt = match from {
            None | Some("start") => None,
            Some(s) => start_of_day(parse_date(s)?, tz),
        };

        let to_dt = match to {
            None => None,
            Some(s) => end_of_day(parse_date(s)?, tz),
        };

        Ok(DateRange {
            from: from_dt,
            to: to_dt,
        })
    }

    /// Overlap test used when querying the store:
    /// `event.start <= to AND event.end >= from`.
    pub fn overlaps(&self, event: &Event) -> bool {
        let starts_in_time = self.to.is_none_or(|to| event.start <= to);
        let ends_in_time = self.from.is_none_or(|from| event.end >= from);
        starts_in_time && ends_in_time
    }
}

fn parse_date(s: &str) -> SharecalResult<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        SharecalError::InvalidInput(format!("Invalid date format '{}'. Expected YYYY-MM-DD", s))
    })
}

fn start_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_opt(0, 0, 0)?;
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

fn end_of_day<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<DateTime<Utc>> {
    let naive = date.and_hms_milli_opt(23, 59, 59, 999)?;
    tz.from_local_datetime(&naive)
        .latest()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(start: (u32, u32), end: (u32, u32)) -> Event {
        Event::new(
            "Range",
            Utc.with_ymd_and_hms(2024, start.0, start.1, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, end.0, end.1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_overlaps_month_window() {
        let march = DateRange::days(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
            &Utc,
        );

        assert!(march.overlaps(&event((3, 10), (3, 11))));
        assert!(march.overlaps(&event((2, 28), (3, 1))), "spills in from February");
        assert!(march.overlaps(&event((3, 31), (4, 2))), "spills out into April");
        assert!(march.overlaps(&event((2, 1), (4, 30))), "spans the whole month");
        assert!(!march.overlaps(&event((2, 1), (2, 29))));
        assert!(!march.overlaps(&event((4, 1), (4, 2))));
    }

    #[test]
    fn test_unbounded_overlaps_everything() {
        assert!(DateRange::unbounded().overlaps(&event((1, 1), (1, 2))));
    }

    #[test]
    fn test_from_args() {
        let range = DateRange::from_args(Some("start"), Some("2024-05-31"), &Utc).unwrap();
        assert_eq!(range.from, None);
        assert_eq!(
            range.to,
            Some(Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999))
        );

        assert!(DateRange::from_args(Some("05/01/2024"), None, &Utc).is_err());
    }
}
