use std::sync::Arc;
use std::time::Duration;

use serenity::all::{ActivityData, Context};
use threadhub_core::HubService;
use tracing::debug;

use crate::discord::DiscordPlatform;

pub(crate) fn presence_text(servers: usize, hubs: usize) -> String {
    format!("{servers} servers, {hubs} hubs")
}

fn update(ctx: &Context, hub: &HubService<DiscordPlatform>) {
    let text = presence_text(ctx.cache.guild_count(), hub.registry().size());
    debug!(presence = %text, "updating presence");
    ctx.set_activity(Some(ActivityData::watching(text)));
}

/// Sets "Watching N servers, M hubs" now and then every `every`.
pub(crate) fn start(ctx: Context, hub: Arc<HubService<DiscordPlatform>>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            // The first tick completes immediately.
            ticker.tick().await;
            update(&ctx, &hub);
        }
    });
}
