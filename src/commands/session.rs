use anyhow::Result;
use owo_colors::OwoColorize;

use crate::context::Context;

/// Sign in as `user`, registering them on first use.
pub fn login(ctx: &mut Context, user: &str, email: Option<&str>) -> Result<()> {
    let user = ctx.users.register(user, email)?.clone();
    ctx.session.sign_in(&user.id)?;

    println!("{}", format!("Signed in as {} ({})", user.id, user.role).green());
    Ok(())
}

pub fn logout(ctx: &mut Context) -> Result<()> {
    match ctx.session.user_id().map(str::to_string) {
        Some(user) => {
            ctx.session.sign_out()?;
            println!("Signed out {}", user);
        }
        None => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    println!("{}", ctx.viewer());
    Ok(())
}
