//! Storage adapters for the persisted message log.
//!
//! Persistence is best-effort key-value storage of one ordered message
//! sequence under a fixed key. Saves are atomic (temp file + rename) so
//! a crash mid-write never corrupts the durable copy; concurrent panels
//! get last-write-wins semantics with no merge.

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::message::Message;

/// File name holding the persisted message log inside the data directory.
const STORAGE_FILE: &str = "messages.json";

/// Error type for storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Asynchronous, best-effort persistence of the message log.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist the given ordered sequence, replacing any previous copy.
    async fn save(&self, messages: &[Message]) -> Result<(), StorageError>;

    /// Load the persisted sequence; empty if nothing was ever saved.
    async fn load(&self) -> Result<Vec<Message>, StorageError>;
}

/// File-backed store keeping the log as a JSON array of
/// `{text, sender, timestamp}` records.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given data directory.
    ///
    /// Creates the directory if it doesn't exist.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let base_path = base_path.into();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Path of the persisted log file.
    pub fn file_path(&self) -> PathBuf {
        self.base_path.join(STORAGE_FILE)
    }

    /// Delete the persisted log, if any.
    pub async fn clear(&self) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.file_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write content atomically using temp file + fsync + rename.
    async fn atomic_write(&self, content: &[u8]) -> Result<(), StorageError> {
        let path = self.file_path();
        let tmp_path = self.base_path.join(format!(
            "{}.{}.tmp",
            STORAGE_FILE,
            std::process::id()
        ));

        let result = async {
            let mut file = tokio::fs::File::create(&tmp_path).await?;
            file.write_all(content).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp_path, &path).await?;
            Ok(())
        }
        .await;

        if result.is_err() {
            // Best-effort cleanup
            let _ = tokio::fs::remove_file(&tmp_path).await;
        }

        result
    }
}

#[async_trait]
impl MessageStore for FileStore {
    async fn save(&self, messages: &[Message]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(messages)?;
        self.atomic_write(json.as_bytes()).await
    }

    async fn load(&self) -> Result<Vec<Message>, StorageError> {
        let content = match tokio::fs::read_to_string(self.file_path()).await {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn save(&self, messages: &[Message]) -> Result<(), StorageError> {
        *self.messages.lock().await = messages.to_vec();
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Message>, StorageError> {
        Ok(self.messages.lock().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_file_store() -> (TempDir, FileStore) {
        let temp = TempDir::new().expect("temp dir");
        let store = FileStore::new(temp.path().join("panel")).expect("file store");
        (temp, store)
    }

    #[test]
    fn test_new_creates_data_dir() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path().join("panel");
        let _store = FileStore::new(&dir).expect("file store");
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let (_temp, store) = setup_file_store();
        let loaded = store.load().await.expect("load");
        assert!(loaded.is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let (_temp, store) = setup_file_store();

        let messages = vec![Message::user("hello"), Message::ai("hi there")];
        store.save(&messages).await.expect("save");

        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "hello");
        assert_eq!(loaded[1].text, "hi there");
    }

    #[tokio::test]
    async fn test_save_replaces_previous_copy() {
        let (_temp, store) = setup_file_store();

        store.save(&[Message::user("old")]).await.expect("save");
        store
            .save(&[Message::user("new"), Message::ai("reply")])
            .await
            .expect("save");

        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].text, "new");
    }

    #[tokio::test]
    async fn test_clear_removes_log() {
        let (_temp, store) = setup_file_store();

        store.save(&[Message::user("hello")]).await.expect("save");
        store.clear().await.expect("clear");
        assert!(!store.file_path().exists());

        // Clearing twice is fine.
        store.clear().await.expect("clear");
        assert!(store.load().await.expect("load").is_empty());
    }

    #[tokio::test]
    async fn test_no_temp_files_left_behind() {
        let (_temp, store) = setup_file_store();
        store.save(&[Message::user("hello")]).await.expect("save");

        for entry in std::fs::read_dir(store.file_path().parent().expect("parent")).expect("dir") {
            let name = entry.expect("entry").file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "Found temp file: {name}");
        }
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let (_temp, store) = setup_file_store();
        tokio::fs::write(store.file_path(), "not valid json")
            .await
            .expect("write");

        assert!(matches!(store.load().await, Err(StorageError::Json(_))));
    }

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.load().await.expect("load").is_empty());

        store
            .save(&[Message::user("a"), Message::ai("b")])
            .await
            .expect("save");
        let loaded = store.load().await.expect("load");
        assert_eq!(loaded.len(), 2);
    }
}
