//! Mapping between serenity models and the engine's platform-neutral types.

use chrono::{DateTime, SecondsFormat, Utc};
use serenity::all::{
    ChannelType, CreateEmbed, CreateEmbedFooter, Embed, GuildChannel, Message, Timestamp,
};
use serenity::http::HttpError;
use serenity::model::id as dc;
use threadhub_core::{
    ChannelId, ChannelInfo, ChannelKind, ChannelMessage, GuildId, IndexEmbed, MessageId,
    ProviderError, ThreadDescriptor, UserId,
};

/// Milliseconds between the Unix epoch and the first Discord snowflake.
const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

const UNKNOWN_CHANNEL: isize = 10003;
const UNKNOWN_MESSAGE: isize = 10008;
const MISSING_ACCESS: isize = 50001;
const MISSING_PERMISSIONS: isize = 50013;

pub(crate) fn dc_guild(id: GuildId) -> dc::GuildId {
    dc::GuildId::new(id.get())
}

pub(crate) fn dc_channel(id: ChannelId) -> dc::ChannelId {
    dc::ChannelId::new(id.get())
}

pub(crate) fn dc_message(id: MessageId) -> dc::MessageId {
    dc::MessageId::new(id.get())
}

pub(crate) fn guild_id(id: dc::GuildId) -> GuildId {
    GuildId(id.get())
}

pub(crate) fn channel_id(id: dc::ChannelId) -> ChannelId {
    ChannelId(id.get())
}

pub(crate) fn user_id(id: dc::UserId) -> UserId {
    UserId(id.get())
}

pub(crate) fn channel_kind(kind: ChannelType) -> ChannelKind {
    match kind {
        ChannelType::Text => ChannelKind::Text,
        ChannelType::PublicThread => ChannelKind::PublicThread,
        ChannelType::PrivateThread => ChannelKind::PrivateThread,
        ChannelType::NewsThread => ChannelKind::AnnouncementThread,
        _ => ChannelKind::Other,
    }
}

/// Creation time encoded in a snowflake id.
pub(crate) fn snowflake_time(id: u64) -> DateTime<Utc> {
    let millis = (id >> 22) + DISCORD_EPOCH_MS;
    i64::try_from(millis)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .unwrap_or_default()
}

pub(crate) fn from_timestamp(ts: Timestamp) -> DateTime<Utc> {
    ts.to_string()
        .parse::<DateTime<Utc>>()
        .ok()
        .or_else(|| DateTime::from_timestamp(ts.unix_timestamp(), 0))
        .unwrap_or_default()
}

pub(crate) fn to_timestamp(at: DateTime<Utc>) -> Option<Timestamp> {
    Timestamp::parse(&at.to_rfc3339_opts(SecondsFormat::Millis, true)).ok()
}

pub(crate) fn index_embed(embed: &Embed) -> IndexEmbed {
    IndexEmbed {
        title: embed.title.clone(),
        description: embed.description.clone(),
        color: embed.colour.map(|colour| colour.0),
        footer: embed.footer.as_ref().map(|footer| footer.text.clone()),
    }
}

pub(crate) fn create_embed(embed: &IndexEmbed) -> CreateEmbed {
    let mut builder = CreateEmbed::new();
    if let Some(title) = &embed.title {
        builder = builder.title(title);
    }
    if let Some(description) = &embed.description {
        builder = builder.description(description);
    }
    if let Some(color) = embed.color {
        builder = builder.color(color);
    }
    if let Some(footer) = &embed.footer {
        builder = builder.footer(CreateEmbedFooter::new(footer));
    }
    builder
}

pub(crate) fn channel_message(message: &Message) -> ChannelMessage {
    ChannelMessage {
        id: MessageId(message.id.get()),
        channel_id: channel_id(message.channel_id),
        author_id: user_id(message.author.id),
        author_is_bot: message.author.bot,
        created_at: from_timestamp(message.timestamp),
        embed: message.embeds.first().map(index_embed),
    }
}

pub(crate) fn channel_info(channel: &GuildChannel) -> ChannelInfo {
    ChannelInfo {
        id: channel_id(channel.id),
        guild_id: guild_id(channel.guild_id),
        name: channel.name.clone(),
        kind: channel_kind(channel.kind),
        parent_id: channel.parent_id.map(channel_id),
    }
}

pub(crate) fn thread_descriptor(thread: &GuildChannel) -> ThreadDescriptor {
    let metadata = thread.thread_metadata.as_ref();
    ThreadDescriptor {
        id: channel_id(thread.id),
        name: thread.name.clone(),
        parent_id: thread.parent_id.map(channel_id),
        owner_id: thread.owner_id.map(user_id),
        created_at: snowflake_time(thread.id.get()),
        kind: channel_kind(thread.kind),
        archived: metadata.is_some_and(|m| m.archived),
        locked: metadata.is_some_and(|m| m.locked),
        archived_at: metadata
            .and_then(|m| m.archive_timestamp)
            .map(from_timestamp),
    }
}

pub(crate) fn provider_error(err: serenity::Error) -> ProviderError {
    match &err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(response)) => classify(
            response.error.code,
            response.status_code.as_u16(),
            response.error.message.clone(),
        ),
        other => ProviderError::Other(other.to_string()),
    }
}

fn classify(code: isize, status: u16, message: String) -> ProviderError {
    match (code, status) {
        (UNKNOWN_CHANNEL | UNKNOWN_MESSAGE, _) | (_, 404) => ProviderError::NotFound(message),
        (MISSING_ACCESS | MISSING_PERMISSIONS, _) | (_, 403) => ProviderError::Forbidden(message),
        _ => ProviderError::Other(format!("{message} (code {code}, status {status})")),
    }
}
