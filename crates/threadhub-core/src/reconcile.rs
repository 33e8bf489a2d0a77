//! Rebuilds the registry from channel content after a restart or guild join.
//!
//! A hub's durable form is the earliest message in a suffixed channel,
//! authored by the bot, whose footer carries the active marker. This is a
//! content heuristic, not a versioned schema: changing the footer wording
//! stops older hubs from being rediscovered.

use tracing::{debug, info, warn};

use crate::hub::HubService;
use crate::provider::{Platform, ProviderResult};
use crate::registry::{HubRecord, IndexMessage};
use crate::types::{ChannelInfo, GuildId};

/// Per-guild reconciliation tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Suffixed channels inspected.
    pub scanned: usize,
    /// Hubs reinstalled as active.
    pub restored: usize,
    /// Channels whose scan failed.
    pub failed: usize,
}

impl<P: Platform> HubService<P> {
    /// Scans every suffixed text channel of `guild` for a live index message.
    ///
    /// Fails only when the channel list itself cannot be fetched; each
    /// channel's failure is contained to that channel.
    pub async fn reconcile_guild(&self, guild: GuildId) -> ProviderResult<ReconcileReport> {
        let channels = self.platform().text_channels(guild).await?;
        let mut report = ReconcileReport::default();

        for channel in channels
            .iter()
            .filter(|channel| channel.name.ends_with(&self.settings().suffix))
        {
            report.scanned += 1;
            match self.reconcile_channel(channel).await {
                Ok(true) => report.restored += 1,
                Ok(false) => {}
                Err(err) => {
                    report.failed += 1;
                    warn!(channel = %channel.id, error = %err, "hub rediscovery failed");
                }
            }
        }

        info!(
            %guild,
            scanned = report.scanned,
            restored = report.restored,
            failed = report.failed,
            "reconciled hubs"
        );
        Ok(report)
    }

    /// Returns whether a hub was reinstalled for `channel`.
    async fn reconcile_channel(&self, channel: &ChannelInfo) -> ProviderResult<bool> {
        let _guard = self.registry().lock_channel(channel.id).await;
        if self.registry().get(channel.id).is_some() {
            debug!(channel = %channel.id, "already tracked, skipping rediscovery");
            return Ok(false);
        }

        let mut history = self.history(channel.id).await?.into_iter();
        let Some(first) = history.next() else {
            return Ok(false);
        };
        if !first.is_active_index_of(self.bot_id()) {
            return Ok(false);
        }

        for stray in history {
            if let Err(err) = self.platform().delete_message(channel.id, stray.id).await {
                warn!(
                    channel = %channel.id,
                    message = %stray.id,
                    error = %err,
                    "failed to clear hub history"
                );
            }
        }

        self.registry().set(
            channel.id,
            HubRecord::new(
                channel.guild_id,
                IndexMessage {
                    id: first.id,
                    embed: first.embed,
                },
                true,
            ),
        );
        info!(channel = %channel.id, message = %first.id, "restored hub");
        self.refresh(channel.id).await;
        Ok(true)
    }
}
