mod commands;
mod error;

use crate::commands::{CategoryCommand, VideoCommand};
use crate::error::{ErrorKind, Result};
use clap::{Parser, Subcommand};
use exn::ResultExt;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use videostream_config::{Config, player_display_size};
use videostream_library::{Library, Router};
use videostream_storage::backend::LocalBackend;
use videostream_store::{Database, SqliteStore};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
    /// Manage videos
    #[command(subcommand)]
    Video(VideoCommand),
    /// Print the player style for the configured size
    PlayerSize,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err:?}");
            ExitCode::FAILURE
        },
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    let command = match cli.command {
        Command::PlayerSize => {
            println!("{}", player_display_size(&config));
            return Ok(());
        },
        command => command,
    };

    debug!(database = %config.database.display(), media = %config.storage.root.display(), "opening library");
    let database = Database::connect(&config.database).await.or_raise(|| ErrorKind::Store)?;
    let storage = LocalBackend::new("media", &config.storage.root).or_raise(|| ErrorKind::Storage)?;
    let router = Router::new(&config.routes).or_raise(|| ErrorKind::Config)?;
    let library = Library::new(Arc::new(SqliteStore::from(&database)), Arc::new(storage), router);

    let result = match command {
        Command::Category(command) => command.run(&library).await,
        Command::Video(command) => command.run(&library, &config).await,
        Command::PlayerSize => Ok(()),
    };
    database.close().await;
    result
}
