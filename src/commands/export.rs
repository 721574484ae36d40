use std::path::Path;

use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use sharecal_core::access::can_view;
use sharecal_core::ics::export_calendar;
use sharecal_core::{Event, Viewer};

use crate::context::Context;

/// Write every event the signed-in user may see as one ICS file, or print it
/// when no output path is given.
pub fn run(ctx: &Context, output: Option<&Path>) -> Result<()> {
    let viewer = ctx.require_viewer()?;
    let (ics, count) = export_ics(ctx, &viewer)?;

    match output {
        Some(path) => {
            std::fs::write(path, ics).with_context(|| format!("Could not write {}", path.display()))?;
            println!(
                "{}",
                format!("  Exported {} events to {}", count, path.display()).green()
            );
        }
        None => print!("{}", ics),
    }

    Ok(())
}

fn export_ics(ctx: &Context, viewer: &Viewer) -> Result<(String, usize)> {
    let events: Vec<Event> = ctx
        .store
        .events()?
        .into_iter()
        .filter(|event| can_view(viewer, event))
        .collect();

    let attachments = ctx.store.attachments();
    let ics = export_calendar(&events, |a| Some(attachments.public_url(&a.path)))?;

    Ok((ics, events.len()))
}
