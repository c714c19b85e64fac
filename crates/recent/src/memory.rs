//! In-process table.

use async_trait::async_trait;
use quizpoll::{DocumentId, RecentItem, RecentItemsStore, StoreError};
use tokio::sync::Mutex;

use crate::{by_recency, upsert_item};

/// Recent items held in memory; lost when the process exits.
#[derive(Debug, Default)]
pub struct MemoryRecentStore {
    items: Mutex<Vec<RecentItem>>,
}

impl MemoryRecentStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecentItemsStore for MemoryRecentStore {
    async fn upsert(&self, document_id: &DocumentId, title: &str) -> Result<(), StoreError> {
        upsert_item(&mut *self.items.lock().await, document_id, title);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<RecentItem>, StoreError> {
        Ok(by_recency(self.items.lock().await.clone()))
    }
}
