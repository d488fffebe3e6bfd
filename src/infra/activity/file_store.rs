// File-backed activity store: an append-only text log per room plus a JSON
// metadata sidecar. The sidecar is rewritten through a temp file and an
// atomic rename so a crash mid-write can never leave half a JSON document.

use crate::core::activity::{ActivityError, ActivityStore, LogMetadata};
use async_trait::async_trait;
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct FileActivityStore {
    log_dir: PathBuf,
}

impl FileActivityStore {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
        }
    }

    pub fn log_path(&self, room_id: u64) -> PathBuf {
        self.log_dir.join(format!("room_{room_id}_log.txt"))
    }

    pub fn metadata_path(&self, room_id: u64) -> PathBuf {
        self.log_dir.join(format!("room_{room_id}_metadata.json"))
    }

    fn write_metadata_atomic(&self, path: &Path, meta: &LogMetadata) -> Result<(), ActivityError> {
        let mut tmp = tempfile::NamedTempFile::new_in(&self.log_dir)?;
        serde_json::to_writer_pretty(&mut tmp, meta)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| ActivityError::Io(e.error))?;
        Ok(())
    }
}

#[async_trait]
impl ActivityStore for FileActivityStore {
    async fn ensure_initialized(&self, room_id: u64) -> Result<(), ActivityError> {
        std::fs::create_dir_all(&self.log_dir)?;

        let log_path = self.log_path(room_id);
        if !log_path.exists() {
            let mut file = std::fs::File::create(&log_path)?;
            writeln!(
                file,
                "=== Room {} Log Started at {} ===",
                room_id,
                Utc::now().format("%Y-%m-%d %H:%M:%S")
            )?;
        }

        let metadata_path = self.metadata_path(room_id);
        if !metadata_path.exists() {
            self.write_metadata_atomic(&metadata_path, &LogMetadata::new(room_id, Utc::now()))?;
        }

        Ok(())
    }

    async fn append_block(&self, room_id: u64, block: &str) -> Result<(), ActivityError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.log_path(room_id))?;
        // One write_all per entry keeps a block from interleaving with
        // whatever else lands in the file.
        file.write_all(block.as_bytes())?;
        Ok(())
    }

    async fn read_metadata(&self, room_id: u64) -> Result<Option<LogMetadata>, ActivityError> {
        let path = self.metadata_path(room_id);
        if !path.exists() {
            return Ok(None);
        }
        let file = std::fs::File::open(path)?;
        let meta: LogMetadata = serde_json::from_reader(std::io::BufReader::new(file))?;
        Ok(Some(meta))
    }

    async fn write_metadata(&self, room_id: u64, meta: &LogMetadata) -> Result<(), ActivityError> {
        std::fs::create_dir_all(&self.log_dir)?;
        self.write_metadata_atomic(&self.metadata_path(room_id), meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::activity::{ActivityLogger, LogEntry};
    use tempfile::tempdir;

    fn entry(author_id: u64, message_id: u64, content: &str) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            author_id,
            author_name: format!("user{author_id}"),
            content: content.to_string(),
            attachment_urls: Vec::new(),
            reactions: Vec::new(),
            message_id,
        }
    }

    #[tokio::test]
    async fn record_appends_and_updates_sidecar() {
        let dir = tempdir().unwrap();
        let store = FileActivityStore::new(dir.path());
        let logger = ActivityLogger::new(store);

        logger.record(42, &entry(1, 100, "hello")).await.unwrap();
        logger.record(42, &entry(2, 101, "hi there")).await.unwrap();
        logger.record(42, &entry(1, 102, "again")).await.unwrap();

        let meta = logger.stats(42).await.unwrap().unwrap();
        assert_eq!(meta.message_count, 3);
        assert_eq!(meta.unique_users, vec![1, 2]);

        let log = std::fs::read_to_string(logger.store().log_path(42)).unwrap();
        assert!(log.starts_with("=== Room 42 Log Started at"));
        assert_eq!(log.matches("hello").count(), 1);
        let hello = log.find("hello").unwrap();
        let again = log.find("again").unwrap();
        assert!(hello < again);
    }

    #[tokio::test]
    async fn initialization_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FileActivityStore::new(dir.path());

        store.ensure_initialized(7).await.unwrap();
        store.append_block(7, "some block\n").await.unwrap();
        store.ensure_initialized(7).await.unwrap();

        let log = std::fs::read_to_string(store.log_path(7)).unwrap();
        // A second init must neither truncate nor re-write the header.
        assert_eq!(log.matches("=== Room 7 Log Started at").count(), 1);
        assert!(log.contains("some block"));
    }

    #[tokio::test]
    async fn metadata_round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let store = FileActivityStore::new(dir.path());

        let mut meta = LogMetadata::new(9, Utc::now());
        meta.absorb(&entry(5, 1, "x"));
        store.write_metadata(9, &meta).await.unwrap();

        let loaded = store.read_metadata(9).await.unwrap().unwrap();
        assert_eq!(loaded.room_id, 9);
        assert_eq!(loaded.message_count, 1);
        assert_eq!(loaded.unique_users, vec![5]);
        assert_eq!(loaded.log_start_time, meta.log_start_time);
    }

    #[tokio::test]
    async fn missing_metadata_reads_as_none() {
        let dir = tempdir().unwrap();
        let store = FileActivityStore::new(dir.path());
        assert!(store.read_metadata(123).await.unwrap().is_none());
    }
}
