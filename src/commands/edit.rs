use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use sharecal_core::access::{can_assign_level, can_edit};
use sharecal_core::Event;

use crate::commands::{Details, find_visible, parse_access};
use crate::context::Context;
use crate::utils::datetime::parse_when;

/// Change the given fields of an event. Moving the start keeps the duration
/// unless a new end is given too.
pub fn run(
    ctx: &Context,
    id: &str,
    name: Option<String>,
    start: Option<&str>,
    details: Details,
) -> Result<Event> {
    let viewer = ctx.require_viewer()?;
    let mut event = find_visible(ctx, &viewer, id)?;

    if !can_edit(&viewer, &event, ctx.config.edit_policy) {
        anyhow::bail!("{} may not edit '{}'", viewer, event.name);
    }

    if let Some(name) = name {
        event.name = name;
    }

    match (start, details.end.as_deref()) {
        (Some(start), end) => {
            let duration = event.end - event.start;
            event.start = parse_when(start)?.start(&Local)?;
            event.end = match end {
                Some(end) => parse_when(end)?.end(&Local)?,
                None => event.start + duration,
            };
        }
        (None, Some(end)) => event.end = parse_when(end)?.end(&Local)?,
        (None, None) => {}
    }

    if let Some(cost) = details.cost {
        event.cost = cost;
    }
    if let Some(location) = details.location {
        event.location = location;
    }
    if let Some(access) = details.access.as_deref() {
        let level = parse_access(access)?;
        if !can_assign_level(&viewer, level) {
            anyhow::bail!("Only admins may assign the admin access level");
        }
        event.access_level = level;
    }

    let event = ctx.store.update(event)?;

    println!("{}", format!("  Updated: {}", event.name).yellow());
    Ok(event)
}
