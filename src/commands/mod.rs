pub mod attach;
pub mod delete;
pub mod edit;
pub mod events;
pub mod export;
pub mod import;
pub mod month;
pub mod new;
pub mod session;
pub mod users;

use anyhow::{Result, anyhow};
use chrono::{Datelike, Local};
use clap::Args;
use sharecal_core::access::can_view;
use sharecal_core::{AccessLevel, Event, EventId, Month, SharecalError, Viewer};

use crate::context::Context;

/// Optional event details shared by `new` and `edit`.
#[derive(Args, Debug, Default, Clone)]
pub struct Details {
    /// End date/time (default: one hour after a timed start, end of day otherwise)
    #[arg(short, long)]
    pub end: Option<String>,

    /// Free-form cost (e.g. "$5", "free")
    #[arg(long)]
    pub cost: Option<String>,

    #[arg(short, long)]
    pub location: Option<String>,

    /// Access level: admin, edit, readonly or none
    #[arg(short, long)]
    pub access: Option<String>,
}

/// Parse an `--access` value. "none" clears the level.
pub fn parse_access(input: &str) -> Result<Option<AccessLevel>> {
    match input.trim().to_ascii_lowercase().as_str() {
        "none" | "" => Ok(None),
        other => Ok(Some(other.parse()?)),
    }
}

/// The month to show; missing parts default to the current month.
pub fn resolve_month(year: Option<i32>, month: Option<u32>) -> Result<Month> {
    let current = Month::containing(Local::now().date_naive());
    let year = year.unwrap_or(current.year());
    let month = month.unwrap_or(current.month());

    Month::new(year, month).ok_or_else(|| anyhow!("Invalid month: {}-{:02}", year, month))
}

/// Events touching `month` that `viewer` may see.
pub fn visible_events(ctx: &Context, viewer: &Viewer, month: Month) -> Result<Vec<Event>> {
    let events = ctx.store.events_in(&month.query_range(&Local))?;
    Ok(events.into_iter().filter(|e| can_view(viewer, e)).collect())
}

/// Look up an event by id. Events the viewer may not see are reported as
/// missing.
pub fn find_visible(ctx: &Context, viewer: &Viewer, id: &str) -> Result<Event> {
    let id: EventId = id.parse()?;
    let event = ctx.store.get(id)?;

    if !can_view(viewer, &event) {
        return Err(SharecalError::EventNotFound(id.to_string()).into());
    }

    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::TestContext;

    #[test]
    fn test_parse_access() {
        assert_eq!(parse_access("Edit").unwrap(), Some(AccessLevel::Edit));
        assert_eq!(parse_access("read-only").unwrap(), Some(AccessLevel::ReadOnly));
        assert_eq!(parse_access("none").unwrap(), None);
        assert!(parse_access("owner").is_err());
    }

    #[test]
    fn test_resolve_month() {
        let month = resolve_month(Some(2024), Some(2)).unwrap();
        assert_eq!((month.year(), month.month()), (2024, 2));
        assert!(resolve_month(Some(2024), Some(13)).is_err());
    }

    #[test]
    fn test_visible_events_hide_untagged_from_anonymous() {
        let t = TestContext::new();
        t.seed("Open House", Some(AccessLevel::ReadOnly), "alice");
        t.seed("Board meeting", None, "admin");

        let december = Month::new(2024, 12).unwrap();
        let anonymous = visible_events(&t.ctx, &Viewer::anonymous(), december).unwrap();
        assert_eq!(anonymous.len(), 1);
        assert_eq!(anonymous[0].name, "Open House");

        let bob = t.ctx.users.viewer_for(Some("bob"));
        assert_eq!(visible_events(&t.ctx, &bob, december).unwrap().len(), 2);
    }

    #[test]
    fn test_find_visible() {
        let t = TestContext::new();
        let event = t.seed("Board meeting", None, "admin");
        let id = event.id.unwrap().to_string();

        let err = find_visible(&t.ctx, &Viewer::anonymous(), &id).unwrap_err();
        assert!(err.to_string().contains("not found"));

        let bob = t.ctx.users.viewer_for(Some("bob"));
        assert_eq!(find_visible(&t.ctx, &bob, &id).unwrap().name, "Board meeting");

        assert!(find_visible(&t.ctx, &bob, "not-an-id").is_err());
    }
}
