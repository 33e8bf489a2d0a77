//! Thread enumeration for a parent channel.

use std::collections::HashSet;

use crate::provider::{ProviderResult, ThreadProvider};
use crate::types::{ChannelId, GuildId, ThreadDescriptor};

/// Collects every public thread under `parent`, open and archived, ordered
/// by creation time.
///
/// Archived threads are paged newest-first and at most `page_limit` pages are
/// requested. Any provider failure aborts the whole enumeration; a partial
/// list is never returned.
pub async fn enumerate_threads<P>(
    provider: &P,
    guild: GuildId,
    parent: ChannelId,
    page_limit: usize,
) -> ProviderResult<Vec<ThreadDescriptor>>
where
    P: ThreadProvider + ?Sized,
{
    let mut seen = HashSet::new();
    let mut threads: Vec<ThreadDescriptor> = provider
        .active_threads(guild)
        .await?
        .into_iter()
        .filter(|thread| belongs_to(thread, parent))
        .filter(|thread| seen.insert(thread.id))
        .collect();

    let mut before = None;
    for _ in 0..page_limit {
        let page = provider.archived_threads(parent, before).await?;
        let cursor = page.threads.iter().filter_map(|t| t.archived_at).min();
        threads.extend(
            page.threads
                .into_iter()
                .filter(|thread| belongs_to(thread, parent))
                .filter(|thread| seen.insert(thread.id)),
        );

        match cursor {
            Some(cursor) if page.has_more => before = Some(cursor),
            _ => break,
        }
    }

    sort_by_creation(&mut threads);
    Ok(threads)
}

/// Earliest-created first; ties broken by id.
pub fn sort_by_creation(threads: &mut [ThreadDescriptor]) {
    threads.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

fn belongs_to(thread: &ThreadDescriptor, parent: ChannelId) -> bool {
    thread.parent_id == Some(parent) && thread.kind.is_public_thread()
}
