use async_trait::async_trait;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::engine::error::StoreError;
use crate::engine::game_data::Catalog;
use crate::engine::profile::UserRecord;

/// Durable key-value storage holding one serialized record per user.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// One-time setup (directories, tables). Safe to call again.
    async fn init(&self) -> Result<(), StoreError>;

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the value under `key` as a whole.
    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

// --- Flat files ---

/// One `<key>.json` file per user inside a directory.
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", escape_key(key))))
    }
}

/// Turns a user id into a file stem. Bytes outside `[A-Za-z0-9@._-]` become
/// `%XX`, which keeps distinct ids distinct and path separators out.
pub fn escape_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'@' | b'.' | b'_' | b'-' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl StorageBackend for FileBackend {
    async fn init(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");

        // Readers only ever see the old file or the complete new one.
        let result = replace_file(&tmp, &path, bytes).await;
        if result.is_err() {
            if let Err(e) = fs::remove_file(&tmp).await {
                if e.kind() != ErrorKind::NotFound {
                    warn!("Could not remove {}: {}", tmp.display(), e);
                }
            }
        }
        result.map_err(StoreError::from)
    }
}

async fn replace_file(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(tmp, path).await
}

// --- In memory ---

#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw access for tests and tooling.
    pub fn put_raw(&self, key: &str, bytes: &[u8]) {
        self.entries.lock().insert(key.to_string(), bytes.to_vec());
    }

    pub fn get_raw(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.get_raw(key))
    }

    async fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.put_raw(key, bytes);
        Ok(())
    }
}

// --- Record store ---

/// Loads and saves [`UserRecord`]s on top of any [`StorageBackend`].
pub struct UserStore {
    backend: Arc<dyn StorageBackend>,
    catalog: Arc<Catalog>,
    starting_money: u64,
}

impl UserStore {
    pub fn new(backend: Arc<dyn StorageBackend>, catalog: Arc<Catalog>, starting_money: u64) -> Self {
        Self { backend, catalog, starting_money }
    }

    pub async fn init(&self) -> Result<(), StoreError> {
        self.backend.init().await
    }

    /// Returns the stored record, or `None` for a user never seen before.
    pub async fn peek(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        match self.backend.read(user_id).await? {
            Some(bytes) => self.decode(user_id, &bytes).map(Some),
            None => Ok(None),
        }
    }

    /// Returns the stored record, creating and persisting a fresh one on
    /// first contact. Unreadable data is an error, never replaced.
    pub async fn load(&self, user_id: &str) -> Result<UserRecord, StoreError> {
        if let Some(record) = self.peek(user_id).await? {
            return Ok(record);
        }

        let record = UserRecord::new_player(&self.catalog, self.starting_money);
        self.save(user_id, &record).await?;
        info!("Created record for new player {}", user_id);
        Ok(record)
    }

    pub async fn save(&self, user_id: &str, record: &UserRecord) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(record)?;
        self.backend.write(user_id, &bytes).await?;
        debug!("Saved record for {}", user_id);
        Ok(())
    }

    fn decode(&self, user_id: &str, bytes: &[u8]) -> Result<UserRecord, StoreError> {
        let corrupt = |reason: String| StoreError::CorruptRecord {
            user_id: user_id.to_string(),
            reason,
        };
        let record: UserRecord = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
        record.validate(&self.catalog).map_err(corrupt)?;
        Ok(record)
    }
}
