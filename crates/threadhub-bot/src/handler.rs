//! Gateway events and interactions, translated for the hub engine.
//!
//! Every interaction gets exactly one response: commands are deferred and then
//! edited with their outcome, menu selections are acknowledged and the menu
//! message is replaced with the outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serenity::all::{
    CommandDataOption, CommandInteraction, ComponentInteraction, ComponentInteractionDataKind,
    Context, CreateActionRow, CreateInteractionResponse, CreateInteractionResponseMessage,
    CreateSelectMenu, CreateSelectMenuKind, CreateSelectMenuOption, EditInteractionResponse,
    EventHandler, Guild, GuildChannel, Interaction, Member, Message, PartialGuildChannel, Ready,
    ThreadListSyncEvent, User,
};
use threadhub_core::{
    ChannelProvider, CommandContext, HubError, HubEvent, HubResult, HubService, Invoker, Permissions, Rejection,
    Reply,
};
use tracing::{debug, error, info, warn};

use crate::commands::{HubCommand, parse_command};
use crate::discord::DiscordPlatform;
use crate::discord::convert::{
    channel_id, channel_message, guild_id, snowflake_time, thread_descriptor, user_id,
};
use crate::presence;

const GENERIC_ERROR: &str = "⚠️ An error occurred while executing that command. I might lack permission for that command, or for this channel.";

/// A thread-create event for a thread older than this reports a join, not a
/// creation.
const NEW_THREAD_WINDOW_SECS: i64 = 60;

pub(crate) struct Handler {
    hub: Arc<HubService<DiscordPlatform>>,
    presence_every: Option<Duration>,
    presence_started: AtomicBool,
}

impl Handler {
    pub(crate) fn new(
        hub: Arc<HubService<DiscordPlatform>>,
        presence_every: Option<Duration>,
    ) -> Self {
        Self {
            hub,
            presence_every,
            presence_started: AtomicBool::new(false),
        }
    }

    async fn on_command(&self, ctx: &Context, command: &CommandInteraction) {
        let defer = CreateInteractionResponse::Defer(
            CreateInteractionResponseMessage::new().ephemeral(true),
        );
        if let Err(err) = command.create_response(&ctx.http, defer).await {
            warn!(command = %command.data.name, error = %err, "failed to defer command");
            return;
        }

        let result = self.run_command(command).await;
        let response = edit_for(outcome(result, &command.data.name));
        if let Err(err) = command.edit_response(&ctx.http, response).await {
            warn!(command = %command.data.name, error = %err, "failed to send command reply");
        }
    }

    async fn run_command(&self, command: &CommandInteraction) -> HubResult<Reply> {
        let parsed = recognize(&command.data.name, &command.data.options)?;
        if command.guild_id.is_none() {
            return Err(Rejection::NotTextChannel.into());
        }

        let channel = self
            .hub
            .platform()
            .channel(channel_id(command.channel_id))
            .await?;
        let ctx = CommandContext {
            channel,
            invoker: invoker(&command.user, command.member.as_deref()),
        };
        info!(
            channel = %ctx.channel.id,
            user = %ctx.invoker.user_id,
            command = ?parsed,
            "command invoked"
        );

        match parsed {
            HubCommand::Activate => self.hub.activate(&ctx).await,
            HubCommand::Deactivate => self.hub.deactivate(&ctx).await,
            HubCommand::Disable => self.hub.disable(&ctx).await,
            HubCommand::CreateThread { name } => self.hub.create_thread(&ctx, &name).await,
            HubCommand::Thread(action) => self.hub.thread_action(&ctx, action).await,
        }
    }

    async fn on_component(&self, ctx: &Context, component: &ComponentInteraction) {
        let custom_id = component.data.custom_id.as_str();
        if let Err(err) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            warn!(menu = custom_id, error = %err, "failed to acknowledge selection");
            return;
        }

        let selected = match &component.data.kind {
            ComponentInteractionDataKind::StringSelect { values } => values.first(),
            _ => None,
        };
        let result = match selected {
            Some(value) => {
                let invoker = invoker(&component.user, component.member.as_ref());
                self.hub.select_thread(custom_id, invoker, value).await
            }
            None => Err(Rejection::InvalidSelection.into()),
        };

        let response = edit_for(outcome(result, custom_id)).components(Vec::new());
        if let Err(err) = component.edit_response(&ctx.http, response).await {
            warn!(menu = custom_id, error = %err, "failed to send selection reply");
        }
    }
}

fn recognize(name: &str, options: &[CommandDataOption]) -> HubResult<HubCommand> {
    parse_command(name, options).ok_or_else(|| {
        warn!(command = name, "unrecognized command invocation");
        Rejection::UnknownCommand.into()
    })
}

fn invoker(user: &User, member: Option<&Member>) -> Invoker {
    let granted = member
        .and_then(|member| member.permissions)
        .unwrap_or(serenity::all::Permissions::empty());
    Invoker {
        user_id: user_id(user.id),
        permissions: Permissions {
            manage_channels: granted.manage_channels(),
            manage_threads: granted.manage_threads(),
        },
    }
}

/// Collapses a command result into the one reply the user sees.
fn outcome(result: HubResult<Reply>, source: &str) -> Reply {
    match result {
        Ok(reply) => reply,
        Err(HubError::Rejected(rejection)) => Reply::text(rejection.to_string()),
        Err(HubError::Provider(err)) => {
            error!(source, error = %err, "command failed");
            Reply::text(GENERIC_ERROR)
        }
    }
}

fn edit_for(reply: Reply) -> EditInteractionResponse {
    match reply {
        Reply::Text(text) => EditInteractionResponse::new().content(text),
        Reply::Menu(menu) => {
            let options = menu
                .options
                .into_iter()
                .map(|option| CreateSelectMenuOption::new(option.label, option.value))
                .collect();
            let select =
                CreateSelectMenu::new(menu.custom_id, CreateSelectMenuKind::String { options })
                    .placeholder(menu.placeholder);
            EditInteractionResponse::new()
                .content(menu.prompt)
                .components(vec![CreateActionRow::SelectMenu(select)])
        }
    }
}

/// True when a thread-create event reports a creation rather than the bot
/// being added to an existing thread.
fn is_newly_created(created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    (now - created_at).num_seconds() <= NEW_THREAD_WINDOW_SECS
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(user = %ready.user.name, guilds = ready.guilds.len(), "logged in");

        if let Some(every) = self.presence_every
            && !self.presence_started.swap(true, Ordering::SeqCst)
        {
            presence::start(ctx, Arc::clone(&self.hub), every);
        }

        let guilds = ready.guilds.iter().map(|guild| guild_id(guild.id)).collect();
        self.hub.handle_event(HubEvent::Ready { guilds }).await;
    }

    async fn guild_create(&self, _ctx: Context, guild: Guild, is_new: Option<bool>) {
        if is_new != Some(true) {
            return;
        }
        info!(guild = %guild.id, name = %guild.name, "joined guild");
        self.hub
            .handle_event(HubEvent::GuildJoined(guild_id(guild.id)))
            .await;
    }

    async fn message(&self, _ctx: Context, message: Message) {
        if message.guild_id.is_none() {
            return;
        }
        self.hub
            .handle_event(HubEvent::MessagePosted(channel_message(&message)))
            .await;
    }

    async fn thread_create(&self, _ctx: Context, thread: GuildChannel) {
        let newly_created = is_newly_created(snowflake_time(thread.id.get()), Utc::now());
        debug!(thread = %thread.id, newly_created, "thread created");
        self.hub
            .handle_event(HubEvent::ThreadCreated {
                thread: thread_descriptor(&thread),
                newly_created,
            })
            .await;
    }

    async fn thread_update(&self, _ctx: Context, _old: Option<GuildChannel>, new: GuildChannel) {
        self.hub
            .handle_event(HubEvent::ThreadUpdated {
                parent: new.parent_id.map(channel_id),
            })
            .await;
    }

    async fn thread_delete(
        &self,
        _ctx: Context,
        thread: PartialGuildChannel,
        _full_thread_data: Option<GuildChannel>,
    ) {
        self.hub
            .handle_event(HubEvent::ThreadDeleted {
                parent: Some(channel_id(thread.parent_id)),
            })
            .await;
    }

    async fn thread_list_sync(&self, _ctx: Context, sync: ThreadListSyncEvent) {
        let parents = sync
            .threads
            .iter()
            .filter_map(|thread| thread.parent_id.map(channel_id))
            .collect();
        self.hub
            .handle_event(HubEvent::ThreadListSync { parents })
            .await;
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => self.on_command(&ctx, &command).await,
            Interaction::Component(component) => self.on_component(&ctx, &component).await,
            _ => {}
        }
    }
}
