//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use threadhub_bot::config::{self, Config};

mod commands;

#[derive(Parser)]
#[command(name = "threadhub")]
#[command(version)]
#[command(about = "Keeps an auto-updated thread list in Discord hub channels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file to use instead of ${THREADHUB_HOME}/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Connect to Discord and serve hub channels
    Run,
    /// Publish the /hub and /thread slash commands globally
    RegisterCommands,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Print the config file path
    Path,
    /// Write a commented default config file
    Init,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; DISCORD_TOKEN may come from the environment.
    let _ = dotenvy::dotenv();

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;

    rt.block_on(async move { dispatch(cli).await })
}

async fn dispatch(cli: Cli) -> Result<()> {
    let config_path = cli.config.unwrap_or_else(config::paths::config_path);

    match cli.command {
        Commands::Config { command } => match command {
            ConfigCommands::Path => {
                commands::config::path(&config_path);
                Ok(())
            }
            ConfigCommands::Init => commands::config::init(&config_path),
        },
        Commands::Run => {
            let config = load(&config_path)?;
            commands::bot::run(config).await
        }
        Commands::RegisterCommands => {
            let config = load(&config_path)?;
            commands::bot::register(&config).await
        }
    }
}

fn load(path: &std::path::Path) -> Result<Config> {
    let config = Config::load_from(path).context("load config")?;
    threadhub_bot::init_tracing(&config);
    Ok(config)
}
