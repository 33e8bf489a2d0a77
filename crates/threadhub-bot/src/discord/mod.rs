//! Provider implementation over serenity's REST client.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    AutoArchiveDuration, ChannelType, CreateMessage, CreateThread, EditChannel, EditMessage,
    EditThread, GetMessages,
};
use serenity::http::Http;
use threadhub_core::{
    ArchivedPage, ChannelId, ChannelInfo, ChannelMessage, ChannelProvider, GuildId, IndexEmbed,
    MessageId, ProviderError, ProviderResult, ThreadDescriptor, ThreadProvider,
};

pub(crate) mod convert;

use convert::{
    channel_info, channel_message, create_embed, dc_channel, dc_guild, dc_message,
    provider_error, thread_descriptor, to_timestamp,
};

/// Discord returns at most this many messages per history request.
const MAX_MESSAGES_PER_REQUEST: usize = 100;

#[derive(Clone)]
pub struct DiscordPlatform {
    http: Arc<Http>,
}

impl DiscordPlatform {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn http(&self) -> &Http {
        self.http.as_ref()
    }

    async fn guild_channel(&self, id: ChannelId) -> ProviderResult<serenity::all::GuildChannel> {
        let channel = dc_channel(id)
            .to_channel(self.http())
            .await
            .map_err(provider_error)?;
        channel
            .guild()
            .ok_or_else(|| ProviderError::Other(format!("channel {id} is not a guild channel")))
    }
}

#[async_trait]
impl ChannelProvider for DiscordPlatform {
    async fn text_channels(&self, guild: GuildId) -> ProviderResult<Vec<ChannelInfo>> {
        let channels = dc_guild(guild)
            .channels(self.http())
            .await
            .map_err(provider_error)?;
        Ok(channels
            .values()
            .filter(|channel| channel.kind == ChannelType::Text)
            .map(channel_info)
            .collect())
    }

    async fn channel(&self, channel: ChannelId) -> ProviderResult<ChannelInfo> {
        Ok(channel_info(&self.guild_channel(channel).await?))
    }

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> ProviderResult<()> {
        dc_channel(channel)
            .edit(self.http(), EditChannel::new().name(name))
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> ProviderResult<Vec<ChannelMessage>> {
        let limit = u8::try_from(limit.min(MAX_MESSAGES_PER_REQUEST)).unwrap_or(u8::MAX);
        let messages = dc_channel(channel)
            .messages(self.http(), GetMessages::new().limit(limit))
            .await
            .map_err(provider_error)?;
        Ok(messages.iter().map(channel_message).collect())
    }

    async fn send_index(
        &self,
        channel: ChannelId,
        embed: &IndexEmbed,
    ) -> ProviderResult<ChannelMessage> {
        let message = dc_channel(channel)
            .send_message(self.http(), CreateMessage::new().embed(create_embed(embed)))
            .await
            .map_err(provider_error)?;
        Ok(channel_message(&message))
    }

    async fn edit_index(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &IndexEmbed,
    ) -> ProviderResult<()> {
        dc_channel(channel)
            .edit_message(
                self.http(),
                dc_message(message),
                EditMessage::new().embed(create_embed(embed)),
            )
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        dc_channel(channel)
            .delete_message(self.http(), dc_message(message))
            .await
            .map_err(provider_error)
    }

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        dc_channel(channel)
            .pin(self.http(), dc_message(message))
            .await
            .map_err(provider_error)
    }

    async fn unpin_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        dc_channel(channel)
            .unpin(self.http(), dc_message(message))
            .await
            .map_err(provider_error)
    }

    async fn send_text(&self, channel: ChannelId, content: &str) -> ProviderResult<()> {
        dc_channel(channel)
            .say(self.http(), content)
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}

#[async_trait]
impl ThreadProvider for DiscordPlatform {
    async fn create_thread(
        &self,
        parent: ChannelId,
        name: &str,
        reason: &str,
    ) -> ProviderResult<ThreadDescriptor> {
        let builder = CreateThread::new(name)
            .kind(ChannelType::PublicThread)
            .auto_archive_duration(AutoArchiveDuration::OneDay)
            .audit_log_reason(reason);
        let thread = dc_channel(parent)
            .create_thread(self.http(), builder)
            .await
            .map_err(provider_error)?;
        Ok(thread_descriptor(&thread))
    }

    async fn active_threads(&self, guild: GuildId) -> ProviderResult<Vec<ThreadDescriptor>> {
        let data = dc_guild(guild)
            .get_active_threads(self.http())
            .await
            .map_err(provider_error)?;
        Ok(data.threads.iter().map(thread_descriptor).collect())
    }

    async fn archived_threads(
        &self,
        parent: ChannelId,
        before: Option<DateTime<Utc>>,
    ) -> ProviderResult<ArchivedPage> {
        let data = dc_channel(parent)
            .get_archived_public_threads(self.http(), before.and_then(to_timestamp), None)
            .await
            .map_err(provider_error)?;
        Ok(ArchivedPage {
            threads: data.threads.iter().map(thread_descriptor).collect(),
            has_more: data.has_more,
        })
    }

    async fn thread(&self, thread: ChannelId) -> ProviderResult<ThreadDescriptor> {
        let channel = self.guild_channel(thread).await?;
        if channel.thread_metadata.is_none() {
            return Err(ProviderError::NotFound(format!("{thread} is not a thread")));
        }
        Ok(thread_descriptor(&channel))
    }

    async fn delete_thread(&self, thread: ChannelId, reason: &str) -> ProviderResult<()> {
        self.http
            .delete_channel(dc_channel(thread), Some(reason))
            .await
            .map_err(provider_error)?;
        Ok(())
    }

    async fn close_thread(&self, thread: ChannelId, reason: &str) -> ProviderResult<()> {
        let builder = EditThread::new()
            .archived(true)
            .locked(true)
            .audit_log_reason(reason);
        dc_channel(thread)
            .edit_thread(self.http(), builder)
            .await
            .map_err(provider_error)?;
        Ok(())
    }
}
