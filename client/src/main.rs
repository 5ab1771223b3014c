// Docspace - terminal client for a remote document workspace
// Entry point and application setup

use anyhow::Context;
use clap::Parser;
use docspace::commands::{self, Command};
use docspace::config::DEFAULT_SETTINGS_FILE;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "docspace", version, about = "Browse, edit and search documents in a remote store")]
struct Args {
    /// Settings file, created with defaults when missing
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    settings: PathBuf,

    /// Store base URL for this run, overriding the settings file
    #[arg(long)]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logs go to stderr so command output stays on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docspace=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting docspace {}", env!("CARGO_PKG_VERSION"));

    let state = docspace::app::setup(args.settings, args.api_url)
        .await
        .context("failed to start workspace")?;

    println!("Type 'help' for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("failed to read input")? {
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                eprintln!("{}", e);
                continue;
            }
        };
        if command == Command::Quit {
            break;
        }

        match commands::execute(&state.workspace, command).await {
            Ok(output) if output.is_empty() => {}
            Ok(output) => println!("{}", output),
            Err(e) => eprintln!("{}", e),
        }
    }

    tracing::info!("Shutting down");
    Ok(())
}
