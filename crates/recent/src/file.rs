//! Table persisted as one JSON array.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use quizpoll::{DocumentId, RecentItem, RecentItemsStore, StoreError};
use tokio::fs;
use tokio::sync::Mutex;

use crate::{by_recency, upsert_item};

/// Recent items stored in a JSON file.
///
/// The whole table is rewritten on every upsert through a sibling temporary
/// file and a rename, so a crash never leaves a half-written table. A missing
/// file is an empty table.
#[derive(Debug)]
pub struct JsonFileRecentStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileRecentStore {
    /// A store backed by `path`. Nothing is read until first use.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// The backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<RecentItem>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == IoErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, items: &[RecentItem]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let json =
            serde_json::to_string_pretty(items).map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl RecentItemsStore for JsonFileRecentStore {
    async fn upsert(&self, document_id: &DocumentId, title: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut items = self.load().await?;
        upsert_item(&mut items, document_id, title);
        self.save(&items).await?;
        tracing::debug!(path = %self.path.display(), %document_id, "recent poll recorded");
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<RecentItem>, StoreError> {
        Ok(by_recency(self.load().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> DocumentId {
        DocumentId::new(id).unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileRecentStore::new(dir.path().join("recent.json"));
        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn items_survive_a_new_store_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("recent.json");

        let store = JsonFileRecentStore::new(&path);
        store.upsert(&doc("a"), "Lecture 1").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.upsert(&doc("b"), "Lecture 2").await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.upsert(&doc("a"), "Lecture 1").await.unwrap();

        let reopened = JsonFileRecentStore::new(&path);
        let ids: Vec<_> = reopened
            .list_all()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.document_id)
            .collect();
        assert_eq!(ids, [doc("a"), doc("b")]);
    }

    #[tokio::test]
    async fn garbage_is_reported_as_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");
        std::fs::write(&path, "not json").unwrap();

        let store = JsonFileRecentStore::new(&path);
        assert!(matches!(store.list_all().await, Err(StoreError::Corrupt(_))));
    }
}
