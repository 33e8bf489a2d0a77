//! Thread hub engine.
//!
//! Keeps one auto-maintained index message per hub channel in sync with the
//! channel's threads, and rebuilds that mapping from channel history after a
//! restart. The chat platform is reached only through the traits in
//! [`provider`].

pub mod command;
pub mod enumerate;
pub mod error;
pub mod events;
pub mod hub;
pub mod lifecycle;
pub mod provider;
pub mod reconcile;
pub mod registry;
pub mod render;
pub mod sync;
pub mod threads;
pub mod types;

pub use command::{CommandContext, MenuOption, Reply, SelectMenu};
pub use error::{HubError, HubResult, ProviderError, Rejection};
pub use events::HubEvent;
pub use hub::{HubService, HubSettings};
pub use provider::{
    Action, ArchivedPage, ChannelProvider, Invoker, Permissions, Platform, ProviderResult,
    ThreadProvider,
};
pub use reconcile::ReconcileReport;
pub use registry::{HubRecord, HubRegistry, IndexMessage};
pub use render::IndexEmbed;
pub use sync::SyncOutcome;
pub use threads::ThreadAction;
pub use types::{
    ChannelId, ChannelInfo, ChannelKind, ChannelMessage, GuildId, MessageId, ThreadDescriptor,
    UserId,
};
