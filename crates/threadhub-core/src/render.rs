//! Index message rendering.
//!
//! Pure functions from a thread list to the embed shown in a hub channel.
//! The footer doubles as the on-channel state marker: the reconciler treats a
//! bot-authored message whose footer carries [`ACTIVE_MARKER`] as a live hub.

use crate::types::ThreadDescriptor;

pub const HUB_TITLE: &str = "📌 Thread Hub";
/// Substring of the title that identifies a hub index, regardless of emoji.
pub const HUB_TITLE_TOKEN: &str = "Thread Hub";
pub const ACTIVE_MARKER: &str = "Hub Active";
pub const INACTIVE_MARKER: &str = "Hub Inactive";
pub const ACTIVE_COLOR: u32 = 0x003b_a55d;
pub const INACTIVE_COLOR: u32 = 0x0080_8080;
pub const EMPTY_PLACEHOLDER: &str = "*No threads yet.*";

const BULLET: &str = "• ";
const FOOTER_SEPARATOR: &str = " – ";

/// Structured body of an index message.
///
/// Every field is optional so a prior embed read back from the platform can be
/// represented as-is, however it was left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<u32>,
    pub footer: Option<String>,
}

impl IndexEmbed {
    pub fn is_hub_index(&self) -> bool {
        self.title
            .as_deref()
            .is_some_and(|title| title.contains(HUB_TITLE_TOKEN))
    }

    pub fn is_active_index(&self) -> bool {
        self.footer
            .as_deref()
            .is_some_and(|footer| footer.contains(ACTIVE_MARKER))
    }
}

/// Renders the index body for `threads`, in the order given.
///
/// `template` is the embed currently on the index message; its title is kept
/// when it still identifies a hub, everything else is recomputed.
pub fn render_index(
    template: Option<&IndexEmbed>,
    threads: &[ThreadDescriptor],
    active: bool,
) -> IndexEmbed {
    let description = if threads.is_empty() {
        EMPTY_PLACEHOLDER.to_string()
    } else {
        threads
            .iter()
            .map(thread_line)
            .collect::<Vec<_>>()
            .join("\n")
    };

    IndexEmbed {
        title: Some(template_title(template)),
        description: Some(description),
        color: Some(accent(active)),
        footer: Some(footer(active, threads.len())),
    }
}

/// Switches an existing index between active and inactive styling without
/// touching the rendered list.
pub fn restyle(template: Option<&IndexEmbed>, active: bool) -> IndexEmbed {
    let description = template
        .and_then(|embed| embed.description.clone())
        .filter(|description| !description.trim().is_empty())
        .unwrap_or_else(|| EMPTY_PLACEHOLDER.to_string());
    let count = description
        .lines()
        .filter(|line| line.starts_with(BULLET))
        .count();

    IndexEmbed {
        title: Some(template_title(template)),
        description: Some(description),
        color: Some(accent(active)),
        footer: Some(footer(active, count)),
    }
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 thread".to_string()
    } else {
        format!("{count} threads")
    }
}

fn footer(active: bool, count: usize) -> String {
    let marker = if active { ACTIVE_MARKER } else { INACTIVE_MARKER };
    format!("{marker}{FOOTER_SEPARATOR}{}", count_label(count))
}

fn accent(active: bool) -> u32 {
    if active { ACTIVE_COLOR } else { INACTIVE_COLOR }
}

fn template_title(template: Option<&IndexEmbed>) -> String {
    template
        .filter(|embed| embed.is_hub_index())
        .and_then(|embed| embed.title.clone())
        .unwrap_or_else(|| HUB_TITLE.to_string())
}

fn thread_line(thread: &ThreadDescriptor) -> String {
    let state = if thread.is_closed() {
        " · closed"
    } else if thread.archived {
        " · archived"
    } else if thread.locked {
        " · locked"
    } else {
        ""
    };
    format!("{BULLET}<#{}>{state}", thread.id)
}
