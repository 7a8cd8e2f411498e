mod commands;
mod fetch;
mod publish;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::publish::Publisher;

#[derive(Parser)]
#[command(name = "calmerge")]
#[command(about = "Aggregate remote .ics feeds into pruned and merged calendars")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download each enabled source, prune it to the last week, save locally
    Refresh {
        /// Path to the sources JSON file
        #[arg(long, default_value = "calendar_sources.json")]
        json: PathBuf,

        /// Local folder for the pruned calendars
        #[arg(long, default_value = "calendars")]
        folder: PathBuf,

        /// Also upload each pruned calendar
        #[arg(long)]
        push: bool,

        /// Path to the publish settings (used with --push)
        #[arg(long, default_value = "publish.json")]
        config: PathBuf,
    },
    /// Merge all enabled sources into one deduplicated calendar
    Merge {
        /// Path to the sources JSON file
        #[arg(long, default_value = "calendar_sources.json")]
        json: PathBuf,

        /// Output .ics path
        #[arg(long, default_value = "combined.ics")]
        output: PathBuf,

        /// Also upload the merged calendar
        #[arg(long)]
        push: bool,

        /// Path to the publish settings (used with --push)
        #[arg(long, default_value = "publish.json")]
        config: PathBuf,
    },
    /// Refresh, merge and publish everything (the scheduled-job entry point)
    Run {
        /// Path to the sources JSON file
        #[arg(long, default_value = "calendar_sources.json")]
        json: PathBuf,

        /// Local folder for the pruned calendars
        #[arg(long, default_value = "calendars")]
        folder: PathBuf,

        /// Path to the publish settings
        #[arg(long, default_value = "publish.json")]
        config: PathBuf,
    },
    /// Interactively edit the source list
    Sources {
        /// Path to the sources JSON file
        #[arg(long, default_value = "calendar_sources.json")]
        json: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Refresh {
            json,
            folder,
            push,
            config,
        } => {
            let publisher = if push {
                Some(Publisher::from_file(&config)?)
            } else {
                None
            };
            commands::refresh::run(&json, &folder, publisher.as_ref()).await
        }
        Commands::Merge {
            json,
            output,
            push,
            config,
        } => {
            let publisher = if push {
                Some(Publisher::from_file(&config)?)
            } else {
                None
            };
            commands::merge::run(&json, &output, publisher.as_ref()).await
        }
        Commands::Run {
            json,
            folder,
            config,
        } => {
            let publisher = Publisher::from_file(&config)?;
            commands::run::run(&json, &folder, &publisher).await
        }
        Commands::Sources { json } => commands::sources::run(&json),
    }
}
