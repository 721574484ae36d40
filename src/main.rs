mod commands;
mod context;
mod render;
mod utils;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use sharecal_core::config::SharecalConfig;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{Details, resolve_month};
use crate::context::Context;

#[derive(Parser)]
#[command(name = "sharecal")]
#[command(about = "Shared calendar with per-event access control")]
struct Cli {
    /// Log at the configured level instead of warnings only
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in, registering the user on first use
    Login {
        user: String,

        #[arg(long)]
        email: Option<String>,
    },
    Logout,
    Whoami,
    /// Show the month grid
    Month {
        #[arg(long)]
        year: Option<i32>,

        /// Month number, 1-12
        #[arg(long)]
        month: Option<u32>,
    },
    /// List the events of a month
    Events {
        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        month: Option<u32>,

        /// Print events with permissions and colors as JSON
        #[arg(long)]
        json: bool,
    },
    New {
        name: String,

        /// Start date/time (e.g., "2025-03-20T15:00", "friday 6pm")
        #[arg(short, long)]
        start: String,

        #[command(flatten)]
        details: Details,
    },
    Edit {
        id: String,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[command(flatten)]
        details: Details,
    },
    Delete {
        id: String,
    },
    /// Attach a file to an event
    Attach {
        id: String,
        file: PathBuf,
    },
    /// Export visible events as ICS
    Export {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Import events from an ICS file
    Import {
        file: PathBuf,

        /// Access level for events that don't carry one
        #[arg(short, long)]
        access: Option<String>,
    },
    Users {
        #[command(subcommand)]
        command: UsersCommand,
    },
}

#[derive(Subcommand)]
enum UsersCommand {
    List,
    SetRole { id: String, role: String },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SharecalConfig::load()?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if cli.verbose {
                EnvFilter::try_new(&config.log_level)
            } else {
                EnvFilter::try_new("warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    let mut ctx = Context::load(config)?;

    match cli.command {
        Commands::Login { user, email } => commands::session::login(&mut ctx, &user, email.as_deref()),
        Commands::Logout => commands::session::logout(&mut ctx),
        Commands::Whoami => commands::session::whoami(&ctx),
        Commands::Month { year, month } => commands::month::run(&ctx, resolve_month(year, month)?),
        Commands::Events { year, month, json } => {
            commands::events::run(&ctx, resolve_month(year, month)?, json)
        }
        Commands::New { name, start, details } => {
            commands::new::run(&ctx, name, &start, details).map(|_| ())
        }
        Commands::Edit {
            id,
            name,
            start,
            details,
        } => commands::edit::run(&ctx, &id, name, start.as_deref(), details).map(|_| ()),
        Commands::Delete { id } => commands::delete::run(&ctx, &id).map(|_| ()),
        Commands::Attach { id, file } => commands::attach::run(&ctx, &id, &file).map(|_| ()),
        Commands::Export { output } => commands::export::run(&ctx, output.as_deref()),
        Commands::Import { file, access } => {
            commands::import::run(&ctx, &file, access.as_deref()).map(|_| ())
        }
        Commands::Users { command } => match command {
            UsersCommand::List => commands::users::list(&ctx),
            UsersCommand::SetRole { id, role } => commands::users::set_role(&mut ctx, &id, &role),
        },
    }
}
