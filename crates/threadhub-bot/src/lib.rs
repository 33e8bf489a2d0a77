use std::sync::Arc;

use anyhow::{Context as _, Result};
use serenity::Client;
use serenity::all::{Command, GatewayIntents};
use serenity::http::Http;
use threadhub_core::{HubService, UserId};
use tracing::info;
use tracing_subscriber::EnvFilter;

pub mod config;

mod commands;
mod discord;
mod handler;
mod presence;

pub use config::{Config, DiscordSettings};
pub use discord::DiscordPlatform;

use crate::handler::Handler;

/// Installs the fmt subscriber; `RUST_LOG` wins over `[log] filter`.
pub fn init_tracing(config: &Config) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.filter)),
        )
        .with_target(true)
        .init();
}

/// Connects to the gateway and serves hub channels until shutdown.
pub async fn run(config: Config) -> Result<()> {
    let settings = DiscordSettings::from_config(&config)?;
    let hub_settings = config.hub_settings()?;

    let http = Arc::new(Http::new(&settings.token));
    let me = http
        .get_current_user()
        .await
        .context("Failed to authenticate with Discord")?;
    info!(user = %me.name, id = %me.id, "authenticated");

    let platform = Arc::new(DiscordPlatform::new(Arc::clone(&http)));
    let hub = Arc::new(HubService::new(platform, UserId(me.id.get()), hub_settings));
    let handler = Handler::new(hub, config.presence_interval());

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES;
    let mut client = Client::builder(&settings.token, intents)
        .event_handler(handler)
        .await
        .context("Failed to build Discord client")?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("Discord client stopped")
}

/// Publishes the global slash-command set.
pub async fn register_commands(config: &Config) -> Result<usize> {
    let settings = DiscordSettings::from_config(config)?;
    let http = Http::new(&settings.token);
    let app = http
        .get_current_application_info()
        .await
        .context("Failed to look up the application")?;
    http.set_application_id(app.id);

    let registered = Command::set_global_commands(&http, commands::create_commands())
        .await
        .context("Failed to register slash commands")?;
    info!(count = registered.len(), "registered global commands");
    Ok(registered.len())
}
