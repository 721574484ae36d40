use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use sharecal_core::access::{can_assign_level, can_create};
use sharecal_core::Event;

use crate::commands::{Details, parse_access};
use crate::context::Context;
use crate::utils::datetime::event_bounds;

pub fn run(ctx: &Context, name: String, start: &str, details: Details) -> Result<Event> {
    let viewer = ctx.require_viewer()?;
    if !can_create(&viewer) {
        anyhow::bail!("{} may not create events", viewer);
    }

    let access_level = match details.access.as_deref() {
        Some(input) => parse_access(input)?,
        None => None,
    };
    if !can_assign_level(&viewer, access_level) {
        anyhow::bail!("Only admins may create events with the admin access level");
    }

    let (start, end) = event_bounds(start, details.end.as_deref(), &Local)?;

    let mut event = Event::new(name, start, end);
    event.cost = details.cost.unwrap_or_default();
    event.location = details.location.unwrap_or_default();
    event.access_level = access_level;
    event.created_by = viewer.identity.clone();

    let event = ctx.store.create(event)?;

    println!("{}", format!("  Created: {}", event.name).green());
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::TestContext;
    use chrono::{TimeZone, Utc};
    use sharecal_core::AccessLevel;

    fn details(access: Option<&str>) -> Details {
        Details {
            end: Some("2024-12-24T22:00:00Z".into()),
            cost: Some("$10".into()),
            location: Some("Community hall".into()),
            access: access.map(str::to_string),
        }
    }

    #[test]
    fn test_requires_sign_in() {
        let t = TestContext::new();

        let result = run(&t.ctx, "Party".into(), "2024-12-24T18:00:00Z", details(None));
        assert!(result.is_err());
        assert!(t.ctx.store.events().unwrap().is_empty());
    }

    #[test]
    fn test_creates_event_owned_by_viewer() {
        let mut t = TestContext::new();
        t.sign_in("bob");

        let event = run(&t.ctx, "Party".into(), "2024-12-24T18:00:00Z", details(Some("edit"))).unwrap();

        assert!(event.id.is_some());
        assert_eq!(event.created_by.as_deref(), Some("bob"));
        assert_eq!(event.access_level, Some(AccessLevel::Edit));
        assert_eq!(event.start, Utc.with_ymd_and_hms(2024, 12, 24, 18, 0, 0).unwrap());
        assert_eq!(event.end, Utc.with_ymd_and_hms(2024, 12, 24, 22, 0, 0).unwrap());
        assert_eq!(event.cost, "$10");

        let stored = t.ctx.store.get(event.id.unwrap()).unwrap();
        assert_eq!(stored.location, "Community hall");
    }

    #[test]
    fn test_admin_level_needs_admin() {
        let mut t = TestContext::new();

        t.sign_in("bob");
        assert!(run(&t.ctx, "Board".into(), "2024-12-24T18:00:00Z", details(Some("admin"))).is_err());

        t.sign_in("admin");
        let event = run(&t.ctx, "Board".into(), "2024-12-24T18:00:00Z", details(Some("admin"))).unwrap();
        assert_eq!(event.access_level, Some(AccessLevel::Admin));
    }

    #[test]
    fn test_end_before_start_is_rejected() {
        let mut t = TestContext::new();
        t.sign_in("bob");

        let mut backwards = details(None);
        backwards.end = Some("2024-12-23T10:00:00Z".into());
        assert!(run(&t.ctx, "Oops".into(), "2024-12-24T18:00:00Z", backwards).is_err());
    }
}
