use std::path::Path;

use anyhow::{Context as _, Result};
use owo_colors::OwoColorize;
use sharecal_core::access::can_edit;
use sharecal_core::Event;

use crate::commands::find_visible;
use crate::context::Context;

/// Upload `file` and attach it to the event, replacing any earlier attachment.
pub fn run(ctx: &Context, id: &str, file: &Path) -> Result<Event> {
    let viewer = ctx.require_viewer()?;
    let event = find_visible(ctx, &viewer, id)?;

    if !can_edit(&viewer, &event, ctx.config.edit_policy) {
        anyhow::bail!("{} may not edit '{}'", viewer, event.name);
    }

    let bytes = std::fs::read(file).with_context(|| format!("Could not read {}", file.display()))?;
    if bytes.is_empty() {
        anyhow::bail!("{} is empty", file.display());
    }

    let filename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "attachment".to_string());

    let event = ctx.store.attach(event, &filename, &bytes)?;

    if let Some(attachment) = &event.attachment {
        println!(
            "{}",
            format!("  Attached {} to {}", attachment.filename, event.name).green()
        );
        if let Some(url) = &attachment.public_url {
            println!("  {}", url.dimmed());
        }
    }

    Ok(event)
}
