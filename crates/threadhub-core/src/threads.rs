//! Thread commands and the selection menus they offer.
//!
//! Every successful mutation ends with exactly one synchronizer pass for the
//! owning hub; a failed mutation runs none.

use tracing::{info, warn};

use crate::command::{CommandContext, MenuOption, Reply, SelectMenu};
use crate::error::{HubError, HubResult, Rejection};
use crate::hub::HubService;
use crate::provider::{Action, Invoker, Platform};
use crate::types::{ChannelId, ChannelKind, ThreadDescriptor};

pub const MAX_THREAD_NAME_LEN: usize = 100;
pub const DELETE_MENU_ID: &str = "threadhub:delete";
pub const CLOSE_MENU_ID: &str = "threadhub:close";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadAction {
    Delete,
    /// Archive and lock; the thread stays listed as closed.
    Close,
}

impl ThreadAction {
    pub fn verb(self) -> &'static str {
        match self {
            ThreadAction::Delete => "delete",
            ThreadAction::Close => "close",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            ThreadAction::Delete => "Deleted",
            ThreadAction::Close => "Closed",
        }
    }

    pub fn menu_id(self) -> &'static str {
        match self {
            ThreadAction::Delete => DELETE_MENU_ID,
            ThreadAction::Close => CLOSE_MENU_ID,
        }
    }

    pub fn from_menu_id(custom_id: &str) -> Option<Self> {
        match custom_id {
            DELETE_MENU_ID => Some(ThreadAction::Delete),
            CLOSE_MENU_ID => Some(ThreadAction::Close),
            _ => None,
        }
    }
}

impl<P: Platform> HubService<P> {
    /// Creates a public thread under the invoking hub channel.
    pub async fn create_thread(&self, ctx: &CommandContext, name: &str) -> HubResult<Reply> {
        let channel = ctx.channel.id;
        if ctx.channel.kind.is_thread() {
            return Err(Rejection::InsideThread.into());
        }
        if ctx.channel.kind != ChannelKind::Text {
            return Err(Rejection::NotTextChannel.into());
        }
        if !self.registry().is_active(channel) {
            return Err(Rejection::NotActiveHub.into());
        }
        let name = name.trim();
        if name.is_empty() || name.chars().count() > MAX_THREAD_NAME_LEN {
            return Err(Rejection::InvalidName {
                max: MAX_THREAD_NAME_LEN,
            }
            .into());
        }

        let reason = format!("Thread created by user {}", ctx.invoker.user_id);
        let thread = match self.platform().create_thread(channel, name, &reason).await {
            Ok(thread) => thread,
            Err(err) => {
                warn!(%channel, error = %err, "thread creation failed");
                return Err(Rejection::ThreadCreateFailed.into());
            }
        };
        info!(%channel, thread = %thread.id, "thread created");

        let mention = format!("<@{}>", ctx.invoker.user_id);
        if let Err(err) = self.platform().send_text(thread.id, &mention).await {
            warn!(thread = %thread.id, error = %err, "could not mention thread creator");
        }

        self.sync_channel(channel).await;
        Ok(Reply::text(format!(
            "✅ Thread **{name}** created! (See the thread list above.)"
        )))
    }

    /// Deletes or closes a thread.
    ///
    /// Inside a thread the action applies to that thread. In a hub channel a
    /// selection menu of its threads is offered instead.
    pub async fn thread_action(
        &self,
        ctx: &CommandContext,
        action: ThreadAction,
    ) -> HubResult<Reply> {
        if ctx.channel.kind.is_thread() {
            let thread = self.platform().thread(ctx.channel.id).await?;
            return self.apply_thread_action(ctx.invoker, thread, action).await;
        }
        if ctx.channel.kind != ChannelKind::Text {
            return Err(Rejection::NotTextChannel.into());
        }

        let channel = ctx.channel.id;
        if !self.registry().is_active(channel) {
            return Err(Rejection::NotActiveHub.into());
        }

        let verb = action.verb();
        let candidates: Vec<ThreadDescriptor> = self
            .threads_of(ctx.channel.guild_id, channel)
            .await?
            .into_iter()
            .filter(|thread| action != ThreadAction::Close || !thread.is_closed())
            .collect();
        if candidates.is_empty() {
            return Err(Rejection::NoThreads { verb }.into());
        }
        if candidates.len() > self.settings().select_menu_limit {
            return Err(Rejection::TooManyThreads { verb }.into());
        }

        Ok(Reply::Menu(SelectMenu {
            custom_id: action.menu_id(),
            prompt: format!("Select a thread to {verb}:"),
            placeholder: format!("Select a thread to {verb}…"),
            options: candidates
                .into_iter()
                .map(|thread| MenuOption {
                    label: thread.name,
                    value: thread.id.to_string(),
                })
                .collect(),
        }))
    }

    /// Handles a choice made in one of the thread selection menus.
    pub async fn select_thread(
        &self,
        custom_id: &str,
        invoker: Invoker,
        value: &str,
    ) -> HubResult<Reply> {
        let action = ThreadAction::from_menu_id(custom_id).ok_or(Rejection::InvalidSelection)?;
        let id = value
            .parse::<u64>()
            .ok()
            .map(ChannelId)
            .ok_or(Rejection::InvalidSelection)?;

        let thread = match self.platform().thread(id).await {
            Ok(thread) => thread,
            Err(err) if err.is_gone() => return Err(Rejection::UnknownThread.into()),
            Err(err) => return Err(err.into()),
        };
        self.apply_thread_action(invoker, thread, action).await
    }

    async fn apply_thread_action(
        &self,
        invoker: Invoker,
        thread: ThreadDescriptor,
        action: ThreadAction,
    ) -> HubResult<Reply> {
        if !invoker.may(Action::ModerateThread {
            owner: thread.owner_id,
        }) {
            return Err(Rejection::MissingPermission.into());
        }

        let reason = format!("{} by user {}", action.past_tense(), invoker.user_id);
        let result = match action {
            ThreadAction::Delete => self.platform().delete_thread(thread.id, &reason).await,
            ThreadAction::Close => self.platform().close_thread(thread.id, &reason).await,
        };
        if let Err(err) = result {
            warn!(thread = %thread.id, error = %err, "failed to {} thread", action.verb());
            return Err(HubError::Rejected(Rejection::ThreadActionFailed {
                verb: action.verb(),
            }));
        }
        info!(thread = %thread.id, action = action.verb(), "thread action applied");

        if let Some(parent) = thread.parent_id {
            self.sync_channel(parent).await;
        }
        Ok(Reply::text(format!(
            "✅ {} thread **{}**.",
            action.past_tense(),
            thread.name
        )))
    }
}
