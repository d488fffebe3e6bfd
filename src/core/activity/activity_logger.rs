// The activity logger: append a rendered block to the per-room log, then
// fold the entry into the JSON metadata sidecar.
//
// The store trait is the seam. The file-backed implementation lives in
// infra/; tests use an in-memory store. Appends for all rooms are
// serialized through one mutex so a pair of near-simultaneous messages
// cannot interleave their log write and metadata rewrite.

use super::activity_models::{LogEntry, LogMetadata};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, thiserror::Error)]
pub enum ActivityError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ActivityStore: Send + Sync {
    /// Create the log file (with its header) and an empty metadata sidecar
    /// if they do not exist yet. Must not touch existing files.
    async fn ensure_initialized(&self, room_id: u64) -> Result<(), ActivityError>;

    /// Append one rendered block to the log file.
    async fn append_block(&self, room_id: u64, block: &str) -> Result<(), ActivityError>;

    /// Read the current metadata, or None if the room has never logged.
    async fn read_metadata(&self, room_id: u64) -> Result<Option<LogMetadata>, ActivityError>;

    /// Replace the metadata sidecar. Implementations must make this
    /// all-or-nothing (write to a temp file, then rename).
    async fn write_metadata(&self, room_id: u64, meta: &LogMetadata) -> Result<(), ActivityError>;
}

pub struct ActivityLogger<S: ActivityStore> {
    store: S,
    write_lock: Mutex<()>,
}

impl<S: ActivityStore> ActivityLogger<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record one accepted entry. After return the log holds exactly one
    /// more block, `message_count` is one higher, and the author id is in
    /// `unique_users`.
    pub async fn record(&self, room_id: u64, entry: &LogEntry) -> Result<(), ActivityError> {
        let _guard = self.write_lock.lock().await;

        self.store.ensure_initialized(room_id).await?;
        self.store.append_block(room_id, &entry.render()).await?;

        let mut meta = self
            .store
            .read_metadata(room_id)
            .await?
            .unwrap_or_else(|| LogMetadata::new(room_id, entry.timestamp));
        meta.absorb(entry);
        self.store.write_metadata(room_id, &meta).await
    }

    /// Current aggregates for a room, or None before the first append.
    pub async fn stats(&self, room_id: u64) -> Result<Option<LogMetadata>, ActivityError> {
        self.store.read_metadata(room_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::activity_models::LogEntry;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct MemoryStore {
        logs: StdMutex<HashMap<u64, String>>,
        meta: StdMutex<HashMap<u64, LogMetadata>>,
        headers_written: StdMutex<HashMap<u64, u32>>,
    }

    #[async_trait]
    impl ActivityStore for MemoryStore {
        async fn ensure_initialized(&self, room_id: u64) -> Result<(), ActivityError> {
            let mut logs = self.logs.lock().unwrap();
            if !logs.contains_key(&room_id) {
                logs.insert(room_id, format!("=== Room {room_id} Log ===\n"));
                *self
                    .headers_written
                    .lock()
                    .unwrap()
                    .entry(room_id)
                    .or_insert(0) += 1;
            }
            Ok(())
        }

        async fn append_block(&self, room_id: u64, block: &str) -> Result<(), ActivityError> {
            self.logs
                .lock()
                .unwrap()
                .entry(room_id)
                .or_default()
                .push_str(block);
            Ok(())
        }

        async fn read_metadata(&self, room_id: u64) -> Result<Option<LogMetadata>, ActivityError> {
            Ok(self.meta.lock().unwrap().get(&room_id).cloned())
        }

        async fn write_metadata(
            &self,
            room_id: u64,
            meta: &LogMetadata,
        ) -> Result<(), ActivityError> {
            self.meta.lock().unwrap().insert(room_id, meta.clone());
            Ok(())
        }
    }

    fn entry(author_id: u64, content: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            author_id,
            author_name: format!("user{author_id}"),
            content: content.to_string(),
            attachment_urls: Vec::new(),
            reactions: Vec::new(),
            message_id: author_id * 1000,
        }
    }

    #[tokio::test]
    async fn count_matches_entries_and_users_are_distinct() {
        let logger = ActivityLogger::new(MemoryStore::default());

        // Arrival order shouldn't matter for the aggregates.
        for (author, text) in [(3, "c"), (1, "a"), (2, "b"), (1, "again"), (3, "and again")] {
            logger.record(7, &entry(author, text)).await.unwrap();
        }

        let meta = logger.stats(7).await.unwrap().unwrap();
        assert_eq!(meta.message_count, 5);
        let mut users = meta.unique_users.clone();
        users.sort_unstable();
        assert_eq!(users, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn header_is_written_once() {
        let logger = ActivityLogger::new(MemoryStore::default());
        logger.record(7, &entry(1, "first")).await.unwrap();
        logger.record(7, &entry(2, "second")).await.unwrap();

        assert_eq!(
            logger.store().headers_written.lock().unwrap().get(&7),
            Some(&1)
        );
    }

    #[tokio::test]
    async fn stats_is_none_before_first_record() {
        let logger = ActivityLogger::new(MemoryStore::default());
        assert!(logger.stats(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rooms_are_independent() {
        let logger = ActivityLogger::new(MemoryStore::default());
        logger.record(1, &entry(10, "one")).await.unwrap();
        logger.record(2, &entry(20, "two")).await.unwrap();

        assert_eq!(logger.stats(1).await.unwrap().unwrap().unique_users, vec![10]);
        assert_eq!(logger.stats(2).await.unwrap().unwrap().unique_users, vec![20]);
    }
}
