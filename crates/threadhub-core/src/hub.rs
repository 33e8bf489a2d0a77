use std::sync::Arc;

use crate::enumerate::enumerate_threads;
use crate::provider::{Platform, ProviderResult};
use crate::registry::HubRegistry;
use crate::types::{ChannelId, ChannelMessage, GuildId, ThreadDescriptor, UserId};

/// Tunables for rediscovery and bounded platform scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubSettings {
    /// Channel-name suffix marking a hub for rediscovery.
    pub suffix: String,
    /// Messages inspected when rediscovering an index message.
    pub history_window: usize,
    /// Archived-thread pages requested per enumeration.
    pub archive_page_limit: usize,
    /// Most options a selection menu may carry.
    pub select_menu_limit: usize,
}

impl HubSettings {
    pub const DEFAULT_SUFFIX: &str = "-hub";
    pub const DEFAULT_HISTORY_WINDOW: usize = 50;
    pub const DEFAULT_ARCHIVE_PAGE_LIMIT: usize = 5;
    pub const DEFAULT_SELECT_MENU_LIMIT: usize = 25;
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            suffix: Self::DEFAULT_SUFFIX.to_string(),
            history_window: Self::DEFAULT_HISTORY_WINDOW,
            archive_page_limit: Self::DEFAULT_ARCHIVE_PAGE_LIMIT,
            select_menu_limit: Self::DEFAULT_SELECT_MENU_LIMIT,
        }
    }
}

/// The hub engine: registry plus the platform it keeps in sync with.
///
/// Constructed once at startup and shared as `Arc<HubService<_>>` by every
/// event and command handler.
pub struct HubService<P> {
    platform: Arc<P>,
    registry: HubRegistry,
    bot_id: UserId,
    settings: HubSettings,
}

impl<P: Platform> HubService<P> {
    pub fn new(platform: Arc<P>, bot_id: UserId, settings: HubSettings) -> Self {
        Self {
            platform,
            registry: HubRegistry::new(),
            bot_id,
            settings,
        }
    }

    pub fn registry(&self) -> &HubRegistry {
        &self.registry
    }

    pub fn platform(&self) -> &P {
        self.platform.as_ref()
    }

    pub fn bot_id(&self) -> UserId {
        self.bot_id
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    pub(crate) async fn threads_of(
        &self,
        guild: GuildId,
        parent: ChannelId,
    ) -> ProviderResult<Vec<ThreadDescriptor>> {
        enumerate_threads(
            self.platform.as_ref(),
            guild,
            parent,
            self.settings.archive_page_limit,
        )
        .await
    }

    /// Recent history of `channel`, earliest first.
    pub(crate) async fn history(&self, channel: ChannelId) -> ProviderResult<Vec<ChannelMessage>> {
        let mut messages = self
            .platform
            .recent_messages(channel, self.settings.history_window)
            .await?;
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(messages)
    }

    /// The channel's first message when it is a bot hub index, active or not.
    pub(crate) async fn find_index(
        &self,
        channel: ChannelId,
    ) -> ProviderResult<Option<ChannelMessage>> {
        let first = self.history(channel).await?.into_iter().next();
        Ok(first.filter(|message| message.is_hub_index_of(self.bot_id)))
    }
}
