use serenity::all::{
    CommandDataOption, CommandDataOptionValue, CommandOptionType, CreateCommand,
    CreateCommandOption, Permissions,
};
use threadhub_core::ThreadAction;
use threadhub_core::threads::MAX_THREAD_NAME_LEN;

const NAME_OPTION: &str = "name";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum HubCommand {
    Activate,
    Deactivate,
    Disable,
    CreateThread { name: String },
    Thread(ThreadAction),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Activate,
    Deactivate,
    Disable,
    Create,
    Delete,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SubcommandDef {
    kind: CommandKind,
    name: &'static str,
    description: &'static str,
    takes_name: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CommandDef {
    name: &'static str,
    description: &'static str,
    /// Hidden from members without Manage Channels by default.
    moderators_only: bool,
    subcommands: &'static [SubcommandDef],
}

const COMMAND_DEFS: &[CommandDef] = &[
    CommandDef {
        name: "hub",
        description: "Manage thread hub channels and their thread list",
        moderators_only: true,
        subcommands: &[
            SubcommandDef {
                kind: CommandKind::Activate,
                name: "activate",
                description: "Activate this channel as a thread hub (create or refresh list)",
                takes_name: false,
            },
            SubcommandDef {
                kind: CommandKind::Deactivate,
                name: "deactivate",
                description: "Stop updating the thread list in this channel (keeps the list)",
                takes_name: false,
            },
            SubcommandDef {
                kind: CommandKind::Disable,
                name: "disable",
                description: "Disable hub functionality and remove the thread list message",
                takes_name: false,
            },
        ],
    },
    CommandDef {
        name: "thread",
        description: "Create or manage discussion threads in a hub channel",
        moderators_only: false,
        subcommands: &[
            SubcommandDef {
                kind: CommandKind::Create,
                name: "create",
                description: "Create a new thread in this hub channel",
                takes_name: true,
            },
            SubcommandDef {
                kind: CommandKind::Delete,
                name: "delete",
                description: "Delete a thread",
                takes_name: false,
            },
            SubcommandDef {
                kind: CommandKind::Close,
                name: "close",
                description: "Close (archive and lock) a thread",
                takes_name: false,
            },
        ],
    },
];

/// Slash-command definitions published by `register-commands`.
pub(crate) fn create_commands() -> Vec<CreateCommand> {
    COMMAND_DEFS.iter().map(create_command).collect()
}

fn create_command(def: &CommandDef) -> CreateCommand {
    let mut command = CreateCommand::new(def.name)
        .description(def.description)
        .dm_permission(false);
    if def.moderators_only {
        command = command.default_member_permissions(Permissions::MANAGE_CHANNELS);
    }
    for sub in def.subcommands {
        let mut option =
            CreateCommandOption::new(CommandOptionType::SubCommand, sub.name, sub.description);
        if sub.takes_name {
            option = option.add_sub_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    NAME_OPTION,
                    "Thread topic/title",
                )
                .required(true)
                .max_length(MAX_THREAD_NAME_LEN as u16),
            );
        }
        command = command.add_option(option);
    }
    command
}

/// Resolves an invoked `/<command> <subcommand>` against the command table.
pub(crate) fn parse_command(command: &str, options: &[CommandDataOption]) -> Option<HubCommand> {
    let invoked = options.first()?;
    let CommandDataOptionValue::SubCommand(args) = &invoked.value else {
        return None;
    };
    let name_arg = args
        .iter()
        .find(|arg| arg.name == NAME_OPTION)
        .and_then(|arg| arg.value.as_str());
    resolve(command, &invoked.name, name_arg)
}

fn resolve(command: &str, subcommand: &str, name_arg: Option<&str>) -> Option<HubCommand> {
    let sub = COMMAND_DEFS
        .iter()
        .find(|def| def.name == command)?
        .subcommands
        .iter()
        .find(|sub| sub.name == subcommand)?;

    Some(match sub.kind {
        CommandKind::Activate => HubCommand::Activate,
        CommandKind::Deactivate => HubCommand::Deactivate,
        CommandKind::Disable => HubCommand::Disable,
        CommandKind::Create => HubCommand::CreateThread {
            name: name_arg?.to_string(),
        },
        CommandKind::Delete => HubCommand::Thread(ThreadAction::Delete),
        CommandKind::Close => HubCommand::Thread(ThreadAction::Close),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{COMMAND_DEFS, HubCommand, create_commands, resolve};
    use threadhub_core::ThreadAction;

    #[test]
    fn resolves_hub_subcommands() {
        assert_eq!(resolve("hub", "activate", None), Some(HubCommand::Activate));
        assert_eq!(resolve("hub", "deactivate", None), Some(HubCommand::Deactivate));
        assert_eq!(resolve("hub", "disable", None), Some(HubCommand::Disable));
    }

    #[test]
    fn resolves_thread_subcommands() {
        assert_eq!(
            resolve("thread", "create", Some("Release notes")),
            Some(HubCommand::CreateThread {
                name: "Release notes".to_string()
            })
        );
        assert_eq!(
            resolve("thread", "delete", None),
            Some(HubCommand::Thread(ThreadAction::Delete))
        );
        assert_eq!(
            resolve("thread", "close", None),
            Some(HubCommand::Thread(ThreadAction::Close))
        );
    }

    #[test]
    fn rejects_unknown_or_incomplete_invocations() {
        assert_eq!(resolve("thread", "create", None), None);
        assert_eq!(resolve("hub", "create", Some("x")), None);
        assert_eq!(resolve("thread", "activate", None), None);
        assert_eq!(resolve("ping", "activate", None), None);
    }

    #[test]
    fn command_table_has_unique_names() {
        let mut seen = HashSet::new();
        for def in COMMAND_DEFS {
            assert!(seen.insert(def.name), "duplicate command {}", def.name);
            let subs: HashSet<_> = def.subcommands.iter().map(|sub| sub.name).collect();
            assert_eq!(subs.len(), def.subcommands.len());
        }
        assert_eq!(create_commands().len(), COMMAND_DEFS.len());
    }
}
