mod clock;
mod commands;
mod render;
mod terminal;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "pocketcal")]
#[command(about = "Run the PocketCal calendar in a terminal and manage its event files")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the calendar (the default)
    Run {
        /// Set the clock to this time of day (HH:MM or HHMM)
        #[arg(long)]
        time: Option<String>,
    },
    /// List stored events, or the events falling on one date
    Events {
        /// Only show events occurring on this date (YYYYMMDD)
        #[arg(short, long)]
        date: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Add an event to the calendar file
    Add {
        #[arg(short, long)]
        name: String,

        /// Start date (YYYYMMDD)
        #[arg(short, long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(short, long)]
        time: String,

        /// Duration (H:MM)
        #[arg(long, default_value = "")]
        duration: String,

        /// Repeat code: NO, DAILY, WEEKLY MO,WE, MONTHLY 10, YEARLY JAN05
        #[arg(short, long, default_value = "NO")]
        repeat: String,

        #[arg(long, default_value = "")]
        note: String,
    },
    /// Copy an .ics file into the events directory
    Import {
        file: std::path::PathBuf,
    },
    /// Show config paths and settings
    Config,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // stderr keeps log lines out of the raw-mode screen.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Run { time: None }) {
        Commands::Run { time } => commands::run::run(time.as_deref()).await,
        Commands::Events { date, json } => commands::events::run(date.as_deref(), json),
        Commands::Add {
            name,
            date,
            time,
            duration,
            repeat,
            note,
        } => commands::add::run([name, date, time, duration, repeat, note]),
        Commands::Import { file } => commands::import::run(&file),
        Commands::Config => commands::config::run(),
    }
}
