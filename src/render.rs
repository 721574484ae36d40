//! TUI rendering traits for sharecal types.
//!
//! This module provides extension traits that add colored terminal rendering
//! to sharecal-core types using owo_colors.

use chrono::{Datelike, Local};
use owo_colors::OwoColorize;
use sharecal_core::access::color_for_access_level;
use sharecal_core::store::ImportSummary;
use sharecal_core::users::User;
use sharecal_core::{ColorToken, Event, MonthGrid};

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

/// Width of one day column in the month view.
const CELL_WIDTH: usize = 14;

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Colorize text according to the event's color token
fn paint(token: ColorToken, text: &str) -> String {
    match token {
        ColorToken::Danger => text.red().to_string(),
        ColorToken::Success => text.green().to_string(),
        ColorToken::Info => text.blue().to_string(),
        ColorToken::Neutral => text.to_string(),
    }
}

/// Cut `text` to `width` characters, marking the cut with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad(text: &str) -> String {
    format!("{:<width$}", truncate(text, CELL_WIDTH), width = CELL_WIDTH)
}

/// A month grid together with the per-cell cap it is shown with.
pub struct MonthView<'g, 'a> {
    pub grid: &'g MonthGrid<'a>,
    pub cap: Option<usize>,
}

impl Render for MonthView<'_, '_> {
    fn render(&self) -> String {
        let total_width = WEEKDAYS.len() * (CELL_WIDTH + 1) - 1;
        let mut lines = Vec::new();

        let title = format!("{:^width$}", self.grid.month.to_string(), width = total_width);
        lines.push(title.bold().to_string());

        let header: Vec<String> = WEEKDAYS.iter().map(|d| pad(d).dimmed().to_string()).collect();
        lines.push(header.join(" "));

        for week in self.grid.weeks() {
            lines.push("─".repeat(total_width).dimmed().to_string());

            let days: Vec<String> = week
                .iter()
                .map(|cell| {
                    let label = pad(&format!("{:>2}", cell.date.day()));
                    if cell.is_today {
                        label.reversed().bold().to_string()
                    } else if !cell.in_current_month {
                        label.dimmed().to_string()
                    } else {
                        label
                    }
                })
                .collect();
            lines.push(days.join(" "));

            let previews: Vec<_> = week.iter().map(|cell| cell.preview(self.cap)).collect();
            let rows = previews
                .iter()
                .map(|p| p.shown.len() + usize::from(p.hidden > 0))
                .max()
                .unwrap_or(0);

            for row in 0..rows {
                let line: Vec<String> = previews
                    .iter()
                    .map(|preview| match preview.shown.get(row) {
                        Some(event) => paint(color_for_access_level(event), &pad(&event.name)),
                        None if row == preview.shown.len() && preview.hidden > 0 => {
                            pad(&format!("+{} more", preview.hidden)).dimmed().to_string()
                        }
                        None => pad(""),
                    })
                    .collect();
                lines.push(line.join(" ").trim_end().to_string());
            }
        }

        lines.join("\n")
    }
}

/// Format the time span of an event in local time (e.g. "10:00-12:00" or
/// "Dec 24 10:00 → Dec 26 12:00")
fn format_span(event: &Event) -> String {
    let start = event.start.with_timezone(&Local);
    let end = event.end.with_timezone(&Local);

    if start.date_naive() == end.date_naive() {
        format!("{}-{}", start.format("%H:%M"), end.format("%H:%M"))
    } else {
        format!("{} → {}", start.format("%b %-d %H:%M"), end.format("%b %-d %H:%M"))
    }
}

impl Render for Event {
    fn render(&self) -> String {
        let name = paint(color_for_access_level(self), &self.name);
        let mut line = format!("{} {}", format_span(self).dimmed(), name);

        if let Some(level) = self.access_level {
            line.push_str(&format!(" {}", format!("[{}]", level).dimmed()));
        }
        if !self.cost.is_empty() {
            line.push_str(&format!(" · {}", self.cost));
        }
        if !self.location.is_empty() {
            line.push_str(&format!(" @ {}", self.location));
        }
        if let Some(attachment) = &self.attachment {
            line.push_str(&format!(" 📎 {}", attachment.filename));
        }
        if let Some(id) = self.id {
            line.push_str(&format!(" {}", id.to_string().dimmed()));
        }

        line
    }
}

impl Render for User {
    fn render(&self) -> String {
        let role = self.role.to_string();
        let role = if self.role == sharecal_core::Role::Admin {
            role.red().to_string()
        } else {
            role
        };

        match &self.email {
            Some(email) => format!("{} {} {}", self.id.bold(), role, email.dimmed()),
            None => format!("{} {}", self.id.bold(), role),
        }
    }
}

impl Render for ImportSummary {
    fn render(&self) -> String {
        let mut parts = Vec::new();
        if self.created > 0 {
            parts.push(format!("+ {} created", self.created).green().to_string());
        }
        if self.updated > 0 {
            parts.push(format!("~ {} updated", self.updated).yellow().to_string());
        }
        if self.skipped > 0 {
            parts.push(format!("{} skipped", self.skipped).dimmed().to_string());
        }
        if parts.is_empty() {
            return "Nothing to import".dimmed().to_string();
        }
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use sharecal_core::{AccessLevel, Month};

    fn event(name: &str, day: u32, level: Option<AccessLevel>) -> Event {
        let mut event = Event::new(
            name,
            Utc.with_ymd_and_hms(2024, 12, day, 12, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 12, day, 12, 30, 0).unwrap(),
        );
        event.access_level = level;
        event
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 14), "short");
        assert_eq!(truncate("a very long event name", 8), "a very …");
    }

    #[test]
    fn test_month_view_shows_cap_and_overflow() {
        let events = vec![
            event("Breakfast", 10, Some(AccessLevel::Edit)),
            event("Lunch", 10, Some(AccessLevel::Admin)),
            event("Dinner", 10, None),
        ];
        let month = Month::new(2024, 12).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 12, 10).unwrap();
        let grid = MonthGrid::build(month, &events, today, &Utc);

        let out = MonthView { grid: &grid, cap: Some(2) }.render();

        assert!(out.contains("December 2024"));
        assert!(out.contains("Breakfast"));
        assert!(out.contains("Lunch"));
        assert!(!out.contains("Dinner"));
        assert!(out.contains("+1 more"));

        let out = MonthView { grid: &grid, cap: None }.render();
        assert!(out.contains("Dinner"));
        assert!(!out.contains("more"));
    }

    #[test]
    fn test_event_line() {
        let mut e = event("Open House", 24, Some(AccessLevel::ReadOnly));
        e.cost = "$5".into();
        e.location = "Hall".into();

        let line = e.render();
        assert!(line.contains("Open House"));
        assert!(line.contains("[readonly]"));
        assert!(line.contains("$5"));
        assert!(line.contains("@ Hall"));
    }

    #[test]
    fn test_import_summary() {
        let summary = ImportSummary {
            created: 2,
            updated: 0,
            skipped: 1,
        };
        let out = summary.render();
        assert!(out.contains("2 created"));
        assert!(out.contains("1 skipped"));
        assert!(!out.contains("updated"));
    }
}
