//! Platform-neutral identities and snapshots the hub engine reads.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::render::IndexEmbed;

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub u64);

        impl $name {
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

snowflake_id!(
    /// A guild (server) the bot is a member of.
    GuildId
);
snowflake_id!(
    /// A channel. Threads are channels too, so thread ids use this type.
    ChannelId
);
snowflake_id!(MessageId);
snowflake_id!(UserId);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    Text,
    PublicThread,
    PrivateThread,
    AnnouncementThread,
    Other,
}

impl ChannelKind {
    pub fn is_thread(self) -> bool {
        matches!(
            self,
            ChannelKind::PublicThread | ChannelKind::PrivateThread | ChannelKind::AnnouncementThread
        )
    }

    /// Thread kinds every member of the parent channel can see.
    pub fn is_public_thread(self) -> bool {
        matches!(
            self,
            ChannelKind::PublicThread | ChannelKind::AnnouncementThread
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub guild_id: GuildId,
    pub name: String,
    pub kind: ChannelKind,
    pub parent_id: Option<ChannelId>,
}

/// A message as seen in channel history.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelMessage {
    pub id: MessageId,
    pub channel_id: ChannelId,
    pub author_id: UserId,
    pub author_is_bot: bool,
    pub created_at: DateTime<Utc>,
    /// First embed of the message, if it carries any.
    pub embed: Option<IndexEmbed>,
}

impl ChannelMessage {
    /// Authored by `bot_id` and titled like a hub index.
    pub fn is_hub_index_of(&self, bot_id: UserId) -> bool {
        self.author_id == bot_id && self.embed.as_ref().is_some_and(IndexEmbed::is_hub_index)
    }

    /// Authored by `bot_id` and footed with the active marker.
    pub fn is_active_index_of(&self, bot_id: UserId) -> bool {
        self.author_id == bot_id && self.embed.as_ref().is_some_and(IndexEmbed::is_active_index)
    }
}

/// Ephemeral snapshot of a thread, re-derived from the platform on every render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadDescriptor {
    pub id: ChannelId,
    pub name: String,
    pub parent_id: Option<ChannelId>,
    pub owner_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub kind: ChannelKind,
    pub archived: bool,
    pub locked: bool,
    /// When the thread was archived; the cursor for archived-thread paging.
    pub archived_at: Option<DateTime<Utc>>,
}

impl ThreadDescriptor {
    pub fn is_closed(&self) -> bool {
        self.archived && self.locked
    }
}
