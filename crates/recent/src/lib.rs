//! Recently opened polls.
//!
//! Two implementations of [`quizpoll::RecentItemsStore`]: [`MemoryRecentStore`]
//! for tests and one-shot runs, and [`JsonFileRecentStore`] which keeps the
//! table in a single JSON file.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Storage only; the table has no behaviour beyond
//! upsert and list.

pub mod file;
pub mod memory;

pub use file::JsonFileRecentStore;
pub use memory::MemoryRecentStore;

use quizpoll::{DocumentId, RecentItem, Timestamp};

/// Inserts or refreshes `document_id` in `items`.
pub(crate) fn upsert_item(items: &mut Vec<RecentItem>, document_id: &DocumentId, title: &str) {
    let now = Timestamp::now();
    match items.iter_mut().find(|item| &item.document_id == document_id) {
        Some(item) => {
            item.title = title.to_string();
            item.last_access = now;
        }
        None => items.push(RecentItem {
            document_id: document_id.clone(),
            title: title.to_string(),
            last_access: now,
        }),
    }
}

/// Most recently accessed first.
pub(crate) fn by_recency(mut items: Vec<RecentItem>) -> Vec<RecentItem> {
    items.sort_by(|a, b| b.last_access.cmp(&a.last_access));
    items
}
