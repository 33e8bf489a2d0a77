//! Hub lifecycle: `absent -> active <-> inactive -> absent`.

use tracing::{info, warn};

use crate::command::{CommandContext, Reply};
use crate::error::{HubResult, ProviderError, Rejection};
use crate::hub::HubService;
use crate::provider::{Action, Platform};
use crate::registry::{HubRecord, IndexMessage};
use crate::render::{IndexEmbed, render_index, restyle};
use crate::types::{ChannelId, ChannelKind, MessageId};

/// Messages fetched when checking that a channel is empty enough to activate.
const ACTIVATION_PROBE: usize = 2;

impl<P: Platform> HubService<P> {
    /// Turns the invoking channel into an active hub.
    ///
    /// A tracked hub is restyled in place. An untracked channel must be empty
    /// or hold only an index message, which is then reused.
    pub async fn activate(&self, ctx: &CommandContext) -> HubResult<Reply> {
        ensure_hub_command(ctx)?;
        let channel = ctx.channel.id;
        let _guard = self.registry().lock_channel(channel).await;

        if let Some(record) = self.registry().get(channel) {
            let embed = restyle(record.index.embed.as_ref(), true);
            match self.write_index(channel, record.index.id, &embed).await {
                Ok(()) => {
                    self.registry().set(
                        channel,
                        HubRecord::new(
                            ctx.channel.guild_id,
                            IndexMessage {
                                id: record.index.id,
                                embed: Some(embed),
                            },
                            true,
                        ),
                    );
                    info!(%channel, was_active = record.active, "hub reactivated");
                    self.refresh(channel).await;
                    return Ok(Reply::text(if record.active {
                        "✅ Hub is already active. The thread list has been refreshed."
                    } else {
                        "✅ Hub reactivated. The thread list will update again."
                    }));
                }
                // The record was dropped; activate as if the channel were new.
                Err(err) if err.is_gone() => {}
                Err(err) => return Err(err.into()),
            }
        }

        let mut messages = self
            .platform()
            .recent_messages(channel, ACTIVATION_PROBE)
            .await?;
        if messages.len() > 1 {
            return Err(Rejection::ChannelNotEmpty.into());
        }
        let existing = messages.pop();
        if let Some(message) = &existing
            && !message.is_hub_index_of(self.bot_id())
        {
            return Err(Rejection::ForeignMessage.into());
        }

        let suffix = &self.settings().suffix;
        if !ctx.channel.name.ends_with(suffix.as_str()) {
            let name = format!("{}{suffix}", ctx.channel.name);
            if let Err(err) = self.platform().rename_channel(channel, &name).await {
                warn!(%channel, error = %err, "could not rename hub channel");
                return Err(Rejection::RenameFailed {
                    suffix: suffix.clone(),
                }
                .into());
            }
        }

        let fresh = existing.is_none();
        let index = match existing {
            Some(message) => {
                let embed = restyle(message.embed.as_ref(), true);
                self.platform()
                    .edit_index(channel, message.id, &embed)
                    .await?;
                IndexMessage {
                    id: message.id,
                    embed: Some(embed),
                }
            }
            None => {
                let embed = render_index(None, &[], true);
                let message = self.platform().send_index(channel, &embed).await?;
                IndexMessage {
                    id: message.id,
                    embed: Some(embed),
                }
            }
        };
        let message = index.id;

        self.registry()
            .set(channel, HubRecord::new(ctx.channel.guild_id, index, true));
        info!(%channel, "hub activated");

        // Pinned only once the hub is active, so the platform's pin notice is swept.
        if fresh && let Err(err) = self.platform().pin_message(channel, message).await {
            warn!(%channel, error = %err, "could not pin thread list message");
        }
        self.refresh(channel).await;

        Ok(Reply::text(
            "✅ This channel is now a hub. Use /thread commands to manage threads.",
        ))
    }

    /// Freezes the thread list; the record is kept for reactivation.
    pub async fn deactivate(&self, ctx: &CommandContext) -> HubResult<Reply> {
        ensure_hub_command(ctx)?;
        let channel = ctx.channel.id;
        let _guard = self.registry().lock_channel(channel).await;

        let (index, text) = match self.registry().get(channel) {
            Some(record) if record.active => (
                record.index,
                "✅ Hub deactivated. (Thread list frozen until you activate again.)",
            ),
            Some(_) => return Err(Rejection::AlreadyInactive.into()),
            None => {
                let Some(message) = self.find_index(channel).await? else {
                    return Err(Rejection::NotActiveHub.into());
                };
                (
                    IndexMessage {
                        id: message.id,
                        embed: message.embed,
                    },
                    "ℹ️ Hub is now inactive. The thread list will not update until reactivated.",
                )
            }
        };

        let embed = restyle(index.embed.as_ref(), false);
        self.write_index(channel, index.id, &embed).await?;
        self.registry().set(
            channel,
            HubRecord::new(
                ctx.channel.guild_id,
                IndexMessage {
                    id: index.id,
                    embed: Some(embed),
                },
                false,
            ),
        );
        info!(%channel, "hub deactivated");
        Ok(Reply::text(text))
    }

    /// Removes the index message and forgets the hub.
    pub async fn disable(&self, ctx: &CommandContext) -> HubResult<Reply> {
        ensure_hub_command(ctx)?;
        let channel = ctx.channel.id;
        let _guard = self.registry().lock_channel(channel).await;

        let message = match self.registry().get(channel) {
            Some(record) => record.index.id,
            None => match self.find_index(channel).await? {
                Some(message) => message.id,
                None => return Err(Rejection::NotHub.into()),
            },
        };

        if let Err(err) = self.platform().unpin_message(channel, message).await {
            warn!(%channel, error = %err, "could not unpin thread list message");
        }
        let removed = match self.platform().delete_message(channel, message).await {
            Ok(()) => true,
            Err(err) if err.is_gone() => true,
            Err(err) => {
                warn!(%channel, error = %err, "failed to delete hub message");
                false
            }
        };
        self.registry().delete(channel);
        info!(%channel, "hub disabled");

        Ok(Reply::text(if removed {
            "✅ Hub disabled and thread list message removed. This channel is no longer a hub."
        } else {
            "⚠️ Hub disabled, but the thread list message could not be removed. You may delete it manually."
        }))
    }

    /// Edits the index in place, dropping the record when the message is gone.
    async fn write_index(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &IndexEmbed,
    ) -> Result<(), ProviderError> {
        let result = self.platform().edit_index(channel, message, embed).await;
        if let Err(err) = &result
            && err.is_gone()
        {
            warn!(%channel, %message, "index message vanished, dropping hub");
            self.registry().delete(channel);
        }
        result
    }
}

fn ensure_hub_command(ctx: &CommandContext) -> Result<(), Rejection> {
    if ctx.channel.kind != ChannelKind::Text {
        return Err(Rejection::NotTextChannel);
    }
    if !ctx.invoker.may(Action::ManageHub) {
        return Err(Rejection::MissingPermission);
    }
    Ok(())
}
