use anyhow::Result;
use owo_colors::OwoColorize;
use sharecal_core::access::can_delete;
use sharecal_core::Event;

use crate::commands::find_visible;
use crate::context::Context;

pub fn run(ctx: &Context, id: &str) -> Result<Event> {
    let viewer = ctx.require_viewer()?;
    let event = find_visible(ctx, &viewer, id)?;

    if !can_delete(&viewer) {
        anyhow::bail!("Only admins may delete events");
    }

    let id = event.id.ok_or(sharecal_core::SharecalError::MissingId)?;
    let deleted = ctx.store.delete(id)?;

    println!("{}", format!("  Deleted: {}", deleted.name).red());
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::TestContext;
    use sharecal_core::AccessLevel;

    #[test]
    fn test_only_admin_deletes() {
        let mut t = TestContext::new();
        let event = t.seed("Potluck", Some(AccessLevel::Edit), "bob");
        let id = event.id.unwrap().to_string();

        // Even the creator may not delete
        t.sign_in("bob");
        assert!(run(&t.ctx, &id).is_err());
        assert!(t.ctx.store.get(event.id.unwrap()).is_ok());

        t.sign_in("admin");
        let deleted = run(&t.ctx, &id).unwrap();
        assert_eq!(deleted.name, "Potluck");
        assert!(t.ctx.store.get(event.id.unwrap()).is_err());
    }
}
