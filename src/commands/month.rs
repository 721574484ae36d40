use anyhow::Result;
use chrono::Local;
use sharecal_core::{Month, MonthGrid};

use crate::commands::visible_events;
use crate::context::Context;
use crate::render::{MonthView, Render};

pub fn run(ctx: &Context, month: Month) -> Result<()> {
    let viewer = ctx.viewer();
    let events = visible_events(ctx, &viewer, month)?;
    let today = Local::now().date_naive();

    let grid = MonthGrid::build(month, &events, today, &Local);
    let view = MonthView {
        grid: &grid,
        cap: ctx.config.cell_cap(),
    };

    println!("{}", view.render());
    Ok(())
}
