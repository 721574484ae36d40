use anyhow::Result;
use chrono::{Local, NaiveDate};
use owo_colors::OwoColorize;
use serde::Serialize;
use sharecal_core::access::color_for_access_level;
use sharecal_core::{ColorToken, Event, Month, Permissions, Viewer};

use crate::commands::visible_events;
use crate::context::Context;
use crate::render::Render;

/// An event with the decisions made for the current viewer, as printed by
/// `--json`.
#[derive(Serialize)]
struct EventRow<'a> {
    #[serde(flatten)]
    event: &'a Event,
    permissions: Permissions,
    color: ColorToken,
}

pub fn run(ctx: &Context, month: Month, json: bool) -> Result<()> {
    let viewer = ctx.viewer();
    let events = visible_events(ctx, &viewer, month)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&rows(ctx, &viewer, &events))?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    // Group events by start day and print
    let mut current_date: Option<NaiveDate> = None;

    for event in &events {
        let date = event.start.with_timezone(&Local).date_naive();

        if current_date != Some(date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(date).bold());
            current_date = Some(date);
        }

        println!("  {}", event.render());
    }

    Ok(())
}

fn rows<'a>(ctx: &Context, viewer: &Viewer, events: &'a [Event]) -> Vec<EventRow<'a>> {
    events
        .iter()
        .map(|event| EventRow {
            event,
            permissions: Permissions::evaluate(viewer, event, ctx.config.edit_policy),
            color: color_for_access_level(event),
        })
        .collect()
}

/// Format a date as a human-readable label (e.g. "Today", "Tomorrow", "Wed Feb 25")
fn format_date_label(date: NaiveDate) -> String {
    let today = Local::now().date_naive();

    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::TestContext;
    use sharecal_core::AccessLevel;

    #[test]
    fn test_rows_carry_permissions_and_color() {
        let t = TestContext::new();
        t.seed("Open House", Some(AccessLevel::Admin), "admin");
        t.seed("Potluck", Some(AccessLevel::Edit), "bob");

        let month = Month::new(2024, 12).unwrap();
        let bob = t.ctx.users.viewer_for(Some("bob"));
        let events = visible_events(&t.ctx, &bob, month).unwrap();
        let rows = rows(&t.ctx, &bob, &events);

        let json = serde_json::to_value(&rows).unwrap();
        let open_house = &json[0];
        assert_eq!(open_house["name"], "Open House");
        assert_eq!(open_house["color"], "danger");
        assert_eq!(open_house["permissions"]["can_edit"], false);

        let potluck = &json[1];
        assert_eq!(potluck["color"], "success");
        assert_eq!(potluck["permissions"]["can_edit"], true);
        assert_eq!(potluck["permissions"]["can_delete"], false);
    }

    #[test]
    fn test_format_date_label() {
        let today = Local::now().date_naive();
        assert_eq!(format_date_label(today), "Today");
        assert_eq!(format_date_label(today.succ_opt().unwrap()), "Tomorrow");

        let date = NaiveDate::from_ymd_opt(2025, 2, 26).unwrap();
        assert_eq!(format_date_label(date), "Wed Feb 26");
    }
}
