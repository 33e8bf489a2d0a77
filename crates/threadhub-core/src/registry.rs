//! Process-wide map from hub channel to its index message.
//!
//! The registry is authoritative for hub behavior. Naming conventions and
//! message markers are only used to rediscover entries after a restart.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::render::IndexEmbed;
use crate::types::{ChannelId, GuildId, MessageId};

/// The single message a hub renders into, with the last embed written to it.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexMessage {
    pub id: MessageId,
    pub embed: Option<IndexEmbed>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HubRecord {
    /// Guild owning the channel; thread enumeration is guild-scoped.
    pub guild_id: GuildId,
    pub index: IndexMessage,
    /// `false` freezes the list; the record is kept.
    pub active: bool,
}

impl HubRecord {
    pub fn new(guild_id: GuildId, index: IndexMessage, active: bool) -> Self {
        Self {
            guild_id,
            index,
            active,
        }
    }
}

/// Guard serializing read-modify-write work on one channel's record.
pub type ChannelGuard = OwnedMutexGuard<()>;

#[derive(Debug, Default)]
pub struct HubRegistry {
    records: Mutex<HashMap<ChannelId, HubRecord>>,
    locks: Mutex<HashMap<ChannelId, Arc<AsyncMutex<()>>>>,
}

impl HubRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, channel: ChannelId) -> Option<HubRecord> {
        self.records().get(&channel).cloned()
    }

    /// Installs or replaces the record for `channel`, returning the previous one.
    pub fn set(&self, channel: ChannelId, record: HubRecord) -> Option<HubRecord> {
        self.records().insert(channel, record)
    }

    pub fn delete(&self, channel: ChannelId) -> Option<HubRecord> {
        self.records().remove(&channel)
    }

    pub fn size(&self) -> usize {
        self.records().len()
    }

    pub fn is_active(&self, channel: ChannelId) -> bool {
        self.records()
            .get(&channel)
            .is_some_and(|record| record.active)
    }

    /// Records the embed last written to `message`, if it is still the tracked index.
    pub fn remember_embed(&self, channel: ChannelId, message: MessageId, embed: IndexEmbed) {
        if let Some(record) = self.records().get_mut(&channel)
            && record.index.id == message
        {
            record.index.embed = Some(embed);
        }
    }

    /// Waits for exclusive access to `channel`.
    ///
    /// Held for a whole synchronizer pass or lifecycle transition; never
    /// re-entered while held. Guards nobody holds or awaits are dropped for
    /// channels without a record, so untracked channels leave nothing behind.
    pub async fn lock_channel(&self, channel: ChannelId) -> ChannelGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            let records = self.records();
            locks.retain(|id, lock| Arc::strong_count(lock) > 1 || records.contains_key(id));
            drop(records);
            Arc::clone(locks.entry(channel).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn lock_count(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<ChannelId, HubRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn record(message: u64, active: bool) -> HubRecord {
        HubRecord::new(
            GuildId(1),
            IndexMessage {
                id: MessageId(message),
                embed: None,
            },
            active,
        )
    }

    #[test]
    fn set_replaces_instead_of_duplicating() {
        let registry = HubRegistry::new();
        assert!(registry.set(ChannelId(1), record(10, true)).is_none());
        let previous = registry.set(ChannelId(1), record(11, false));

        assert_eq!(previous, Some(record(10, true)));
        assert_eq!(registry.size(), 1);
        assert_eq!(registry.get(ChannelId(1)), Some(record(11, false)));
    }

    #[test]
    fn delete_and_activity() {
        let registry = HubRegistry::new();
        registry.set(ChannelId(1), record(10, true));
        registry.set(ChannelId(2), record(20, false));

        assert!(registry.is_active(ChannelId(1)));
        assert!(!registry.is_active(ChannelId(2)));
        assert!(!registry.is_active(ChannelId(3)));

        assert!(registry.delete(ChannelId(1)).is_some());
        assert!(registry.delete(ChannelId(1)).is_none());
        assert_eq!(registry.size(), 1);
    }

    #[test]
    fn remember_embed_ignores_stale_message() {
        let registry = HubRegistry::new();
        registry.set(ChannelId(1), record(10, true));
        let embed = IndexEmbed {
            footer: Some("Hub Active – 0 threads".into()),
            ..IndexEmbed::default()
        };

        registry.remember_embed(ChannelId(1), MessageId(99), embed.clone());
        assert_eq!(registry.get(ChannelId(1)).unwrap().index.embed, None);

        registry.remember_embed(ChannelId(1), MessageId(10), embed.clone());
        assert_eq!(registry.get(ChannelId(1)).unwrap().index.embed, Some(embed));
    }

    #[tokio::test]
    async fn idle_locks_of_untracked_channels_are_dropped() {
        let registry = HubRegistry::new();
        registry.set(ChannelId(1), record(10, true));

        drop(registry.lock_channel(ChannelId(1)).await);
        drop(registry.lock_channel(ChannelId(2)).await);
        assert_eq!(registry.lock_count(), 2);

        // Disabling a hub deletes its record; its guard goes on the next lock.
        registry.delete(ChannelId(1));
        let held = registry.lock_channel(ChannelId(3)).await;
        assert_eq!(registry.lock_count(), 1);

        // A held guard survives pruning even without a record.
        drop(registry.lock_channel(ChannelId(4)).await);
        assert_eq!(registry.lock_count(), 2);
        drop(held);
        drop(registry.lock_channel(ChannelId(4)).await);
        assert_eq!(registry.lock_count(), 1);
    }

    #[tokio::test]
    async fn channel_lock_is_exclusive_per_channel() {
        let registry = Arc::new(HubRegistry::new());
        let guard = registry.lock_channel(ChannelId(1)).await;

        // Other channels are not blocked.
        let _other = registry.lock_channel(ChannelId(2)).await;

        let contender = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let _guard = registry.lock_channel(ChannelId(1)).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        contender.await.unwrap();
    }
}
