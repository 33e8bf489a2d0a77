//! Capabilities the hub engine consumes from the chat platform.
//!
//! Every call may suspend on the network and is bounded by the platform
//! client's own request timeout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ProviderError;
use crate::render::IndexEmbed;
use crate::types::{
    ChannelId, ChannelInfo, ChannelMessage, GuildId, MessageId, ThreadDescriptor, UserId,
};

pub type ProviderResult<T> = Result<T, ProviderError>;

/// One page of archived threads.
#[derive(Debug, Clone, Default)]
pub struct ArchivedPage {
    pub threads: Vec<ThreadDescriptor>,
    pub has_more: bool,
}

#[async_trait]
pub trait ChannelProvider: Send + Sync {
    /// Plain text channels of a guild.
    async fn text_channels(&self, guild: GuildId) -> ProviderResult<Vec<ChannelInfo>>;

    async fn channel(&self, channel: ChannelId) -> ProviderResult<ChannelInfo>;

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> ProviderResult<()>;

    /// Up to `limit` of the most recent messages, in no particular order.
    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> ProviderResult<Vec<ChannelMessage>>;

    async fn send_index(
        &self,
        channel: ChannelId,
        embed: &IndexEmbed,
    ) -> ProviderResult<ChannelMessage>;

    async fn edit_index(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &IndexEmbed,
    ) -> ProviderResult<()>;

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()>;

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()>;

    async fn unpin_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()>;

    async fn send_text(&self, channel: ChannelId, content: &str) -> ProviderResult<()>;
}

#[async_trait]
pub trait ThreadProvider: Send + Sync {
    async fn create_thread(
        &self,
        parent: ChannelId,
        name: &str,
        reason: &str,
    ) -> ProviderResult<ThreadDescriptor>;

    /// Every open thread in the guild, across all parents.
    async fn active_threads(&self, guild: GuildId) -> ProviderResult<Vec<ThreadDescriptor>>;

    /// Public archived threads of `parent` archived before `before`, newest first.
    async fn archived_threads(
        &self,
        parent: ChannelId,
        before: Option<DateTime<Utc>>,
    ) -> ProviderResult<ArchivedPage>;

    async fn thread(&self, thread: ChannelId) -> ProviderResult<ThreadDescriptor>;

    async fn delete_thread(&self, thread: ChannelId, reason: &str) -> ProviderResult<()>;

    /// Archives and locks a thread.
    async fn close_thread(&self, thread: ChannelId, reason: &str) -> ProviderResult<()>;
}

pub trait Platform: ChannelProvider + ThreadProvider {}

impl<T: ChannelProvider + ThreadProvider> Platform for T {}

/// Member permissions relevant to hub commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub manage_channels: bool,
    pub manage_threads: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ManageHub,
    /// Delete or close a thread owned by `owner`.
    ModerateThread { owner: Option<UserId> },
}

/// The user behind a command or selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invoker {
    pub user_id: UserId,
    pub permissions: Permissions,
}

impl Invoker {
    pub fn may(&self, action: Action) -> bool {
        match action {
            Action::ManageHub => self.permissions.manage_channels,
            Action::ModerateThread { owner } => {
                owner == Some(self.user_id) || self.permissions.manage_threads
            }
        }
    }
}
