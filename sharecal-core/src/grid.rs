//! Month grid computation.
//!
//! A month is rendered as whole Sunday-to-Saturday weeks: the grid starts on
//! the Sunday on or before the 1st and ends on the Saturday on or after the
//! last day, so it holds 28, 35 or 42 cells depending on the month.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::date_range::DateRange;
use crate::event::Event;

/// A calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    /// `month` is 1-based. Returns `None` for months chrono cannot represent.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|_| Month { year, month })
    }

    /// Build from a zero-based month index that may run past either end of the
    /// year: `-1` is the previous December, `12` the next January.
    pub fn from_index(year: i32, month0: i32) -> Option<Self> {
        let total = i64::from(year) * 12 + i64::from(month0);
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
        Self::new(year, month)
    }

    pub fn containing(date: NaiveDate) -> Self {
        Month {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Move by `delta` months.
    pub fn shift(&self, delta: i32) -> Option<Self> {
        let month0 = i32::try_from(self.month).ok()? - 1;
        Self::from_index(self.year, month0.checked_add(delta)?)
    }

    pub fn next(&self) -> Self {
        self.shift(1).unwrap_or(*self)
    }

    pub fn prev(&self) -> Self {
        self.shift(-1).unwrap_or(*self)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Last day, found by walking the calendar rather than from a table of
    /// month lengths.
    pub fn last_day(&self) -> NaiveDate {
        let first = self.first_day();
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .last()
            .unwrap_or(first)
    }

    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let month = self.month;
        self.first_day().iter_days().take_while(move |d| d.month() == month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// The window the store should be queried with to get every event that
    /// touches this month.
    pub fn query_range<Tz: TimeZone>(&self, tz: &Tz) -> DateRange {
        DateRange::days(self.first_day(), self.last_day(), tz)
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.first_day().format("%B %Y"))
    }
}

/// The Sunday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

/// The Saturday on or after `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    let forward = 6 - u64::from(date.weekday().num_days_from_sunday());
    date.checked_add_days(Days::new(forward)).unwrap_or(date)
}

/// One day square of the month grid.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarCell<'a> {
    pub date: NaiveDate,
    /// False for padding days from the adjacent months.
    pub in_current_month: bool,
    pub is_today: bool,
    /// Events covering this day, in input order.
    pub events: Vec<&'a Event>,
}

/// What a cell shows once the per-cell cap is applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellPreview<'c, 'a> {
    pub shown: &'c [&'a Event],
    /// Number of events behind the "N more" indicator.
    pub hidden: usize,
}

impl<'a> CalendarCell<'a> {
    /// Apply a display cap. `None` shows everything.
    pub fn preview(&self, cap: Option<usize>) -> CellPreview<'_, 'a> {
        let shown = match cap {
            Some(cap) => &self.events[..cap.min(self.events.len())],
            None => &self.events[..],
        };
        CellPreview {
            shown,
            hidden: self.events.len() - shown.len(),
        }
    }
}

/// Build the cells for the month containing `reference`.
///
/// `today` marks the current-day cell and `tz` decides which calendar days an
/// event's instants fall on.
pub fn build_month_grid<'a, Tz: TimeZone>(
    reference: NaiveDate,
    events: &'a [Event],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<CalendarCell<'a>> {
    let month = Month::containing(reference);
    let first = week_start(month.first_day());
    let last = week_end(month.last_day());

    let spans: Vec<(NaiveDate, NaiveDate, &'a Event)> = events
        .iter()
        .map(|event| {
            let (start, end) = event.date_span(tz);
            (start, end, event)
        })
        .collect();

    first
        .iter_days()
        .take_while(|date| *date <= last)
        .map(|date| CalendarCell {
            date,
            in_current_month: month.contains(date),
            is_today: date == today,
            events: spans
                .iter()
                .filter(|(start, end, _)| *start <= date && date <= *end)
                .map(|(_, _, event)| *event)
                .collect(),
        })
        .collect()
}

/// A month together with its cells.
#[derive(Debug, Clone, Serialize)]
pub struct MonthGrid<'a> {
    pub month: Month,
    pub cells: Vec<CalendarCell<'a>>,
}

impl<'a> MonthGrid<'a> {
    pub fn build<Tz: TimeZone>(month: Month, events: &'a [Event], today: NaiveDate, tz: &Tz) -> Self {
        MonthGrid {
            month,
            cells: build_month_grid(month.first_day(), events, today, tz),
        }
    }

    /// Rows of seven cells, Sunday first.
    pub fn weeks(&self) -> impl Iterator<Item = &[CalendarCell<'a>]> {
        self.cells.chunks(7)
    }
}
