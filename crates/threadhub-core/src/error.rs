use thiserror::Error;

/// Failure reported by a platform provider call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The referenced message, channel or thread no longer exists.
    #[error("unknown target: {0}")]
    NotFound(String),

    #[error("missing permission: {0}")]
    Forbidden(String),

    #[error("{0}")]
    Other(String),
}

impl ProviderError {
    /// Target is confirmed gone; the only failure that mutates hub state.
    pub fn is_gone(&self) -> bool {
        matches!(self, ProviderError::NotFound(_))
    }
}

/// Precondition rejections surfaced to the invoking user.
///
/// Each variant maps to exactly one ephemeral reply and leaves state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("❌ This command can only be used in a server text channel.")]
    NotTextChannel,

    #[error("❌ Use `/thread create` in the hub channel, not inside a thread.")]
    InsideThread,

    #[error(
        "⚠️ The channel is not empty. Please clear messages or disable the existing hub before activating."
    )]
    ChannelNotEmpty,

    #[error(
        "⚠️ There is already a non-hub message in this channel. Please clear it before activating the hub."
    )]
    ForeignMessage,

    #[error("❌ Thread hub channel names must end with the suffix \"{suffix}\".")]
    RenameFailed { suffix: String },

    #[error("❌ This channel is not set up as an active hub.")]
    NotActiveHub,

    #[error("❌ This channel is not a hub (nothing to change).")]
    NotHub,

    #[error("ℹ️ Hub is already inactive. The thread list will not update until reactivated.")]
    AlreadyInactive,

    #[error("❌ You don't have permission to do that here.")]
    MissingPermission,

    #[error("❌ Please provide a valid thread name (1-{max} characters).")]
    InvalidName { max: usize },

    #[error(
        "❌ Failed to create thread. Make sure I have permission to Create Threads in this channel."
    )]
    ThreadCreateFailed,

    #[error("❌ Failed to {verb} the thread. I might lack permission.")]
    ThreadActionFailed { verb: &'static str },

    #[error("ℹ️ There are no threads to {verb} in this channel.")]
    NoThreads { verb: &'static str },

    #[error(
        "⚠️ Too many threads to list. Run `/thread {verb}` from inside the thread you want to {verb}."
    )]
    TooManyThreads { verb: &'static str },

    #[error("❌ Could not find the selected thread (maybe it was removed already).")]
    UnknownThread,

    #[error("❌ That selection is no longer valid.")]
    InvalidSelection,

    #[error("❌ Unknown command. Try `/hub` or `/thread`.")]
    UnknownCommand,
}

/// Outcome of a command that did not succeed.
#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Rejected(#[from] Rejection),

    #[error("platform call failed: {0}")]
    Provider(#[from] ProviderError),
}

pub type HubResult<T> = Result<T, HubError>;
