//! Command invocation context and replies.

use crate::provider::Invoker;
use crate::types::ChannelInfo;

/// Where and by whom a command was invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    pub channel: ChannelInfo,
    pub invoker: Invoker,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    pub value: String,
}

/// A single-choice selection menu offered in reply to a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectMenu {
    /// Fixed token routing the eventual choice back to its handler.
    pub custom_id: &'static str,
    pub prompt: String,
    pub placeholder: String,
    pub options: Vec<MenuOption>,
}

/// The one acknowledgment a successful command sends back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    Menu(SelectMenu),
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Reply::Text(text) => Some(text),
            Reply::Menu(_) => None,
        }
    }
}
