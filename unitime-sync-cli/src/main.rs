//! UniTime schedule extraction and calendar sync CLI.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "unitime-sync")]
#[command(about = "Extract a class timetable and sync it to a calendar")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract schedule entries from a saved timetable page
    Extract {
        /// Saved schedule page (HTML) or an entries JSON file
        #[arg(short, long)]
        input: String,

        /// Output JSON file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Sync schedule entries into the remote calendar
    Sync {
        /// Saved schedule page (HTML) or an entries JSON file
        #[arg(short, long)]
        input: String,

        /// OAuth bearer token for the calendar API
        #[arg(short, long)]
        token: String,

        /// Target calendar identifier
        #[arg(short, long, default_value = "primary")]
        calendar: String,

        /// Event time zone
        #[arg(long, default_value = "America/Indiana/Indianapolis")]
        timezone: String,
    },

    /// Export schedule entries as an ICS calendar file
    Export {
        /// Saved schedule page (HTML) or an entries JSON file
        #[arg(short, long)]
        input: String,

        /// Output ICS file path
        #[arg(short, long)]
        output: Option<String>,

        /// Calendar display name
        #[arg(long)]
        calendar_name: Option<String>,

        /// Event time zone
        #[arg(long, default_value = "America/Indiana/Indianapolis")]
        timezone: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    format!("unitime_sync_core={log_level},unitime_sync_cli={log_level}").into()
                }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Extract { input, output } => commands::extract_command(&input, output),

        Commands::Sync {
            input,
            token,
            calendar,
            timezone,
        } => commands::sync_command(&input, &token, calendar, timezone).await,

        Commands::Export {
            input,
            output,
            calendar_name,
            timezone,
        } => commands::export_command(&input, output, calendar_name, timezone),
    }
}
