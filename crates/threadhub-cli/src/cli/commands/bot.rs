//! Bot command handlers.

use anyhow::Result;
use threadhub_bot::Config;

pub async fn run(config: Config) -> Result<()> {
    threadhub_bot::run(config).await
}

pub async fn register(config: &Config) -> Result<()> {
    let count = threadhub_bot::register_commands(config).await?;
    println!("Registered {count} slash command(s).");
    Ok(())
}
