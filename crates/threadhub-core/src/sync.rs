//! The synchronizer: re-renders a hub's index message from live thread state.

use tracing::{debug, error, warn};

use crate::hub::HubService;
use crate::provider::Platform;
use crate::render::render_index;
use crate::types::ChannelId;

/// What a synchronizer pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No record for the channel.
    Untracked,
    /// Record present but inactive; the list stays as it is.
    Frozen,
    /// Index message rewritten with `threads` entries.
    Updated { threads: usize },
    /// Enumeration failed; nothing was touched.
    EnumerationFailed,
    /// The index message is gone and the record was purged.
    Purged,
    /// The edit failed for another reason; the record is kept for the next trigger.
    WriteFailed,
}

impl<P: Platform> HubService<P> {
    /// Brings the index message of `channel` in line with its current threads.
    ///
    /// Idempotent: with no intervening thread changes a second pass writes an
    /// identical body.
    pub async fn sync_channel(&self, channel: ChannelId) -> SyncOutcome {
        if self.registry().get(channel).is_none() {
            return SyncOutcome::Untracked;
        }
        let _guard = self.registry().lock_channel(channel).await;
        self.refresh(channel).await
    }

    /// Synchronizer pass for callers already holding the channel guard.
    pub(crate) async fn refresh(&self, channel: ChannelId) -> SyncOutcome {
        let Some(record) = self.registry().get(channel) else {
            return SyncOutcome::Untracked;
        };
        if !record.active {
            debug!(%channel, "hub inactive, leaving list frozen");
            return SyncOutcome::Frozen;
        }

        let threads = match self.threads_of(record.guild_id, channel).await {
            Ok(threads) => threads,
            Err(err) => {
                error!(%channel, error = %err, "could not enumerate threads");
                return SyncOutcome::EnumerationFailed;
            }
        };

        let embed = render_index(record.index.embed.as_ref(), &threads, true);
        match self
            .platform()
            .edit_index(channel, record.index.id, &embed)
            .await
        {
            Ok(()) => {
                self.registry()
                    .remember_embed(channel, record.index.id, embed);
                SyncOutcome::Updated {
                    threads: threads.len(),
                }
            }
            Err(err) if err.is_gone() => {
                warn!(%channel, message = %record.index.id, "index message vanished, dropping hub");
                self.registry().delete(channel);
                SyncOutcome::Purged
            }
            Err(err) => {
                error!(%channel, error = %err, "failed to update thread list message");
                SyncOutcome::WriteFailed
            }
        }
    }
}
