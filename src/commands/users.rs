use anyhow::Result;
use owo_colors::OwoColorize;
use sharecal_core::access::can_manage_users;
use sharecal_core::Role;

use crate::context::Context;
use crate::render::Render;

pub fn list(ctx: &Context) -> Result<()> {
    let viewer = ctx.require_viewer()?;
    if !can_manage_users(&viewer) {
        anyhow::bail!("Only admins may list users");
    }

    for user in ctx.users.users() {
        println!("  {}", user.render());
    }
    Ok(())
}

pub fn set_role(ctx: &mut Context, id: &str, role: &str) -> Result<()> {
    let viewer = ctx.require_viewer()?;
    let role: Role = role.parse()?;

    ctx.users.set_role(&viewer, id, role)?;

    println!("{}", format!("  {} is now {}", id, role).green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::TestContext;

    #[test]
    fn test_list_is_admin_only() {
        let mut t = TestContext::new();

        t.sign_in("bob");
        assert!(list(&t.ctx).is_err());

        t.sign_in("admin");
        assert!(list(&t.ctx).is_ok());
    }

    #[test]
    fn test_set_role() {
        let mut t = TestContext::new();

        t.sign_in("alice");
        assert!(set_role(&mut t.ctx, "bob", "admin").is_err());

        t.sign_in("admin");
        set_role(&mut t.ctx, "bob", "admin").unwrap();
        assert_eq!(t.ctx.users.role_of("bob"), Some(Role::Admin));

        assert!(set_role(&mut t.ctx, "bob", "owner").is_err());
        assert!(set_role(&mut t.ctx, "nobody", "user").is_err());
    }
}
