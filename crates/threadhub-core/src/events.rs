//! Platform events routed into the hub engine.

use std::collections::BTreeSet;

use tracing::{debug, error, warn};

use crate::hub::HubService;
use crate::provider::Platform;
use crate::types::{ChannelId, ChannelMessage, GuildId, ThreadDescriptor};

#[derive(Debug, Clone)]
pub enum HubEvent {
    /// Startup: every guild the bot is in.
    Ready { guilds: Vec<GuildId> },
    GuildJoined(GuildId),
    /// `newly_created` is false when the event only reports a thread the bot
    /// was added to.
    ThreadCreated {
        thread: ThreadDescriptor,
        newly_created: bool,
    },
    ThreadDeleted { parent: Option<ChannelId> },
    ThreadUpdated { parent: Option<ChannelId> },
    /// Bulk thread-list sync; one entry per thread synced.
    ThreadListSync { parents: Vec<ChannelId> },
    MessagePosted(ChannelMessage),
}

impl<P: Platform> HubService<P> {
    pub async fn handle_event(&self, event: HubEvent) {
        match event {
            HubEvent::Ready { guilds } => {
                for guild in guilds {
                    self.reconcile_logged(guild).await;
                }
            }
            HubEvent::GuildJoined(guild) => self.reconcile_logged(guild).await,
            HubEvent::ThreadCreated {
                thread,
                newly_created,
            } => {
                // Threads created through our own command are synced by that command.
                if !newly_created || thread.owner_id == Some(self.bot_id()) {
                    return;
                }
                self.sync_if_active(thread.parent_id).await;
            }
            HubEvent::ThreadDeleted { parent } | HubEvent::ThreadUpdated { parent } => {
                self.sync_if_active(parent).await;
            }
            HubEvent::ThreadListSync { parents } => {
                let parents: BTreeSet<ChannelId> = parents.into_iter().collect();
                for parent in parents {
                    self.sync_if_active(Some(parent)).await;
                }
            }
            HubEvent::MessagePosted(message) => self.sweep_message(&message).await,
        }
    }

    /// Keeps active hub channels free of anything but bot embeds.
    async fn sweep_message(&self, message: &ChannelMessage) {
        if message.author_is_bot && message.embed.is_some() {
            return;
        }
        let channel = message.channel_id;
        if !self.registry().is_active(channel) {
            return;
        }
        if let Err(err) = self.platform().delete_message(channel, message.id).await {
            warn!(
                %channel,
                message = %message.id,
                error = %err,
                "failed to delete a message in hub"
            );
        }
    }

    async fn sync_if_active(&self, parent: Option<ChannelId>) {
        let Some(parent) = parent else {
            return;
        };
        if !self.registry().is_active(parent) {
            debug!(channel = %parent, "not an active hub, ignoring thread event");
            return;
        }
        self.sync_channel(parent).await;
    }

    async fn reconcile_logged(&self, guild: GuildId) {
        if let Err(err) = self.reconcile_guild(guild).await {
            error!(%guild, error = %err, "could not list channels for hub rediscovery");
        }
    }
}
