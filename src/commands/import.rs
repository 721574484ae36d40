use std::path::Path;

use anyhow::{Context as _, Result};
use sharecal_core::ics::parse_calendar;
use sharecal_core::store::ImportSummary;

use crate::commands::parse_access;
use crate::context::Context;
use crate::render::Render;

/// Import the VEVENTs of an ICS file. `access` tags events that carry no
/// access level of their own.
pub fn run(ctx: &Context, file: &Path, access: Option<&str>) -> Result<ImportSummary> {
    let viewer = ctx.require_viewer()?;
    let default_level = match access {
        Some(input) => parse_access(input)?,
        None => None,
    };

    let content =
        std::fs::read_to_string(file).with_context(|| format!("Could not read {}", file.display()))?;
    let mut events = parse_calendar(&content)?;

    if default_level.is_some() {
        for event in events.iter_mut().filter(|e| e.access_level.is_none()) {
            event.access_level = default_level;
        }
    }

    let summary = ctx.store.import(events, &viewer, ctx.config.edit_policy)?;

    println!("  {}", summary.render());
    Ok(summary)
}
