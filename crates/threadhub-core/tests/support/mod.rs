#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use threadhub_core::{
    ArchivedPage, ChannelId, ChannelInfo, ChannelKind, ChannelMessage, ChannelProvider,
    CommandContext, GuildId, HubService, HubSettings, IndexEmbed, Invoker, MessageId,
    Permissions, ProviderError, ProviderResult, ThreadDescriptor, ThreadProvider, UserId,
};

pub const BOT: UserId = UserId(1000);
pub const ALICE: UserId = UserId(42);
pub const BOB: UserId = UserId(43);
pub const GUILD: GuildId = GuildId(1);

/// In-memory stand-in for the chat platform with failure injection.
pub struct MockPlatform {
    state: Mutex<MockState>,
}

#[derive(Default)]
pub struct MockState {
    pub channels: BTreeMap<ChannelId, ChannelInfo>,
    pub messages: BTreeMap<ChannelId, Vec<ChannelMessage>>,
    pub threads: Vec<ThreadDescriptor>,
    pub pinned: HashSet<MessageId>,
    pub mentions: Vec<(ChannelId, String)>,
    /// Notices posted in reply to pins, when `pin_notice` is set.
    pub pin_notices: Vec<ChannelMessage>,
    pub edits: usize,
    pub archived_requests: usize,
    pub archived_page_size: usize,
    next_id: u64,
    clock: i64,

    pub fail_channel_list: bool,
    pub fail_history: HashSet<ChannelId>,
    pub fail_enumeration: bool,
    pub fail_rename: bool,
    pub fail_edit: Option<ProviderError>,
    pub fail_thread_ops: bool,
    pub undeletable: HashSet<MessageId>,
    /// Post a bot notice without an embed for every pin, like Discord does.
    pub pin_notice: bool,
    pub pin_delay: Option<Duration>,
}

impl MockState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn tick(&mut self) -> DateTime<Utc> {
        self.clock += 1;
        Utc.timestamp_opt(1_700_000_000 + self.clock, 0).unwrap()
    }
}

impl MockPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                next_id: 5000,
                archived_page_size: 50,
                ..MockState::default()
            }),
        })
    }

    pub fn with_state<T>(&self, f: impl FnOnce(&mut MockState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    pub fn add_text_channel(&self, name: &str) -> ChannelInfo {
        self.with_state(|state| {
            let info = ChannelInfo {
                id: ChannelId(state.next_id()),
                guild_id: GUILD,
                name: name.to_string(),
                kind: ChannelKind::Text,
                parent_id: None,
            };
            state.channels.insert(info.id, info.clone());
            state.messages.insert(info.id, Vec::new());
            info
        })
    }

    pub fn post(
        &self,
        channel: ChannelId,
        author: UserId,
        embed: Option<IndexEmbed>,
    ) -> ChannelMessage {
        self.with_state(|state| {
            let message = ChannelMessage {
                id: MessageId(state.next_id()),
                channel_id: channel,
                author_id: author,
                author_is_bot: author == BOT,
                created_at: state.tick(),
                embed,
            };
            state
                .messages
                .entry(channel)
                .or_default()
                .push(message.clone());
            message
        })
    }

    /// A thread created outside the bot, e.g. from the platform's own UI.
    pub fn add_thread(&self, parent: ChannelId, name: &str, owner: UserId) -> ThreadDescriptor {
        self.with_state(|state| {
            let thread = ThreadDescriptor {
                id: ChannelId(state.next_id()),
                name: name.to_string(),
                parent_id: Some(parent),
                owner_id: Some(owner),
                created_at: state.tick(),
                kind: ChannelKind::PublicThread,
                archived: false,
                locked: false,
                archived_at: None,
            };
            state.threads.push(thread.clone());
            thread
        })
    }

    pub fn archive_thread(&self, thread: ChannelId) {
        self.with_state(|state| {
            let now = state.tick();
            if let Some(entry) = state.threads.iter_mut().find(|t| t.id == thread) {
                entry.archived = true;
                entry.archived_at = Some(now);
            }
        });
    }

    pub fn remove_thread(&self, thread: ChannelId) {
        self.with_state(|state| state.threads.retain(|t| t.id != thread));
    }

    pub fn messages(&self, channel: ChannelId) -> Vec<ChannelMessage> {
        self.with_state(|state| state.messages.get(&channel).cloned().unwrap_or_default())
    }

    pub fn remove_message(&self, channel: ChannelId, message: MessageId) {
        self.with_state(|state| {
            if let Some(messages) = state.messages.get_mut(&channel) {
                messages.retain(|m| m.id != message);
            }
        });
    }

    pub fn embed(&self, channel: ChannelId, message: MessageId) -> IndexEmbed {
        self.messages(channel)
            .into_iter()
            .find(|m| m.id == message)
            .and_then(|m| m.embed)
            .expect("message with embed")
    }

    pub fn edits(&self) -> usize {
        self.with_state(|state| state.edits)
    }

    pub fn thread_ids(&self) -> Vec<ChannelId> {
        self.with_state(|state| state.threads.iter().map(|t| t.id).collect())
    }
}

fn not_found(what: impl std::fmt::Display) -> ProviderError {
    ProviderError::NotFound(what.to_string())
}

#[async_trait]
impl ChannelProvider for MockPlatform {
    async fn text_channels(&self, guild: GuildId) -> ProviderResult<Vec<ChannelInfo>> {
        self.with_state(|state| {
            if state.fail_channel_list {
                return Err(ProviderError::Other("channel list unavailable".into()));
            }
            Ok(state
                .channels
                .values()
                .filter(|c| c.guild_id == guild && c.kind == ChannelKind::Text)
                .cloned()
                .collect())
        })
    }

    async fn channel(&self, channel: ChannelId) -> ProviderResult<ChannelInfo> {
        self.with_state(|state| {
            if let Some(info) = state.channels.get(&channel) {
                return Ok(info.clone());
            }
            state
                .threads
                .iter()
                .find(|t| t.id == channel)
                .map(|t| ChannelInfo {
                    id: t.id,
                    guild_id: GUILD,
                    name: t.name.clone(),
                    kind: t.kind,
                    parent_id: t.parent_id,
                })
                .ok_or_else(|| not_found(channel))
        })
    }

    async fn rename_channel(&self, channel: ChannelId, name: &str) -> ProviderResult<()> {
        self.with_state(|state| {
            if state.fail_rename {
                return Err(ProviderError::Forbidden("manage channels".into()));
            }
            let info = state
                .channels
                .get_mut(&channel)
                .ok_or_else(|| not_found(channel))?;
            info.name = name.to_string();
            Ok(())
        })
    }

    async fn recent_messages(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> ProviderResult<Vec<ChannelMessage>> {
        self.with_state(|state| {
            if state.fail_history.contains(&channel) {
                return Err(ProviderError::Other("history unavailable".into()));
            }
            let messages = state.messages.get(&channel).cloned().unwrap_or_default();
            // Newest first, like the real API.
            Ok(messages.into_iter().rev().take(limit).collect())
        })
    }

    async fn send_index(
        &self,
        channel: ChannelId,
        embed: &IndexEmbed,
    ) -> ProviderResult<ChannelMessage> {
        Ok(self.post(channel, BOT, Some(embed.clone())))
    }

    async fn edit_index(
        &self,
        channel: ChannelId,
        message: MessageId,
        embed: &IndexEmbed,
    ) -> ProviderResult<()> {
        self.with_state(|state| {
            if let Some(err) = &state.fail_edit {
                return Err(err.clone());
            }
            let entry = state
                .messages
                .get_mut(&channel)
                .and_then(|messages| messages.iter_mut().find(|m| m.id == message))
                .ok_or_else(|| not_found(message))?;
            entry.embed = Some(embed.clone());
            state.edits += 1;
            Ok(())
        })
    }

    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        self.with_state(|state| {
            if state.undeletable.contains(&message) {
                return Err(ProviderError::Other("delete refused".into()));
            }
            let messages = state
                .messages
                .get_mut(&channel)
                .ok_or_else(|| not_found(channel))?;
            let before = messages.len();
            messages.retain(|m| m.id != message);
            if messages.len() == before {
                return Err(not_found(message));
            }
            state.pinned.remove(&message);
            Ok(())
        })
    }

    async fn pin_message(&self, channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        let (notice, delay) = self.with_state(|state| {
            state.pinned.insert(message);
            (state.pin_notice, state.pin_delay)
        });
        if notice {
            let posted = self.post(channel, BOT, None);
            self.with_state(|state| state.pin_notices.push(posted));
        }
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }

    async fn unpin_message(&self, _channel: ChannelId, message: MessageId) -> ProviderResult<()> {
        self.with_state(|state| state.pinned.remove(&message));
        Ok(())
    }

    async fn send_text(&self, channel: ChannelId, content: &str) -> ProviderResult<()> {
        self.with_state(|state| state.mentions.push((channel, content.to_string())));
        Ok(())
    }
}

#[async_trait]
impl ThreadProvider for MockPlatform {
    async fn create_thread(
        &self,
        parent: ChannelId,
        name: &str,
        _reason: &str,
    ) -> ProviderResult<ThreadDescriptor> {
        if self.with_state(|state| state.fail_thread_ops) {
            return Err(ProviderError::Forbidden("create threads".into()));
        }
        Ok(self.add_thread(parent, name, BOT))
    }

    async fn active_threads(&self, _guild: GuildId) -> ProviderResult<Vec<ThreadDescriptor>> {
        self.with_state(|state| {
            if state.fail_enumeration {
                return Err(ProviderError::Other("thread listing unavailable".into()));
            }
            // Reverse creation order so callers must sort.
            Ok(state
                .threads
                .iter()
                .rev()
                .filter(|t| !t.archived)
                .cloned()
                .collect())
        })
    }

    async fn archived_threads(
        &self,
        parent: ChannelId,
        before: Option<DateTime<Utc>>,
    ) -> ProviderResult<ArchivedPage> {
        self.with_state(|state| {
            state.archived_requests += 1;
            if state.fail_enumeration {
                return Err(ProviderError::Other("thread listing unavailable".into()));
            }
            let mut archived: Vec<ThreadDescriptor> = state
                .threads
                .iter()
                .filter(|t| t.archived && t.parent_id == Some(parent))
                .filter(|t| match (before, t.archived_at) {
                    (Some(before), Some(at)) => at < before,
                    _ => true,
                })
                .cloned()
                .collect();
            archived.sort_by(|a, b| b.archived_at.cmp(&a.archived_at));
            let has_more = archived.len() > state.archived_page_size;
            archived.truncate(state.archived_page_size);
            Ok(ArchivedPage {
                threads: archived,
                has_more,
            })
        })
    }

    async fn thread(&self, thread: ChannelId) -> ProviderResult<ThreadDescriptor> {
        self.with_state(|state| {
            state
                .threads
                .iter()
                .find(|t| t.id == thread)
                .cloned()
                .ok_or_else(|| not_found(thread))
        })
    }

    async fn delete_thread(&self, thread: ChannelId, _reason: &str) -> ProviderResult<()> {
        self.with_state(|state| {
            if state.fail_thread_ops {
                return Err(ProviderError::Forbidden("manage threads".into()));
            }
            let before = state.threads.len();
            state.threads.retain(|t| t.id != thread);
            if state.threads.len() == before {
                return Err(not_found(thread));
            }
            Ok(())
        })
    }

    async fn close_thread(&self, thread: ChannelId, _reason: &str) -> ProviderResult<()> {
        self.with_state(|state| {
            if state.fail_thread_ops {
                return Err(ProviderError::Forbidden("manage threads".into()));
            }
            let now = state.tick();
            let entry = state
                .threads
                .iter_mut()
                .find(|t| t.id == thread)
                .ok_or_else(|| not_found(thread))?;
            entry.archived = true;
            entry.locked = true;
            entry.archived_at = Some(now);
            Ok(())
        })
    }
}

pub fn service(platform: &Arc<MockPlatform>) -> HubService<MockPlatform> {
    HubService::new(Arc::clone(platform), BOT, HubSettings::default())
}

pub fn moderator_ctx(channel: &ChannelInfo) -> CommandContext {
    CommandContext {
        channel: channel.clone(),
        invoker: Invoker {
            user_id: ALICE,
            permissions: Permissions {
                manage_channels: true,
                manage_threads: true,
            },
        },
    }
}

pub fn member_ctx(channel: &ChannelInfo, user: UserId) -> CommandContext {
    CommandContext {
        channel: channel.clone(),
        invoker: Invoker {
            user_id: user,
            permissions: Permissions::default(),
        },
    }
}

/// The `<#id>` references of a rendered list, in order.
pub fn listed(embed: &IndexEmbed) -> Vec<String> {
    embed
        .description
        .as_deref()
        .unwrap_or_default()
        .lines()
        .filter_map(|line| line.strip_prefix("• "))
        .map(|rest| rest.split(' ').next().unwrap_or_default().to_string())
        .collect()
}

pub fn mention(thread: &ThreadDescriptor) -> String {
    format!("<#{}>", thread.id)
}
