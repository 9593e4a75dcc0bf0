//! Sticker collection and its persistence.
//!
//! Records are kept as a JSON array; each PNG is stored inline as a
//! `data:image/png;base64,...` URL so the file is self-contained.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::consts::MAX_STICKERS;
use crate::error::{Result, StickerError};

const DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// A finished, flattened sticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StickerRecord {
    /// Millisecond timestamp at save time, unique within a collection.
    pub id: u64,
    #[serde(rename = "dataUrl", with = "data_url")]
    pub png: Vec<u8>,
    pub saved_at: u64,
}

mod data_url {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::DATA_URL_PREFIX;

    pub fn serialize<S: Serializer>(png: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{DATA_URL_PREFIX}{}", STANDARD.encode(png)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let url = String::deserialize(deserializer)?;
        let payload = url
            .strip_prefix(DATA_URL_PREFIX)
            .ok_or_else(|| de::Error::custom("expected a base64 PNG data URL"))?;
        STANDARD.decode(payload).map_err(de::Error::custom)
    }
}

/// Where a collection is loaded from and written back to.
pub trait StickerStore {
    fn load(&self) -> Result<Vec<StickerRecord>>;
    fn persist(&mut self, records: &[StickerRecord]) -> Result<()>;
}

/// JSON file on disk. A missing file is an empty collection.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StickerStore for JsonFileStore {
    fn load(&self) -> Result<Vec<StickerRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn persist(&mut self, records: &[StickerRecord]) -> Result<()> {
        let json = serde_json::to_string(records)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// In-process store, for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub records: Vec<StickerRecord>,
}

impl StickerStore for MemoryStore {
    fn load(&self) -> Result<Vec<StickerRecord>> {
        Ok(self.records.clone())
    }

    fn persist(&mut self, records: &[StickerRecord]) -> Result<()> {
        self.records = records.to_vec();
        Ok(())
    }
}

/// File name for a single downloaded sticker.
pub fn export_file_name(millis: u64) -> String {
    format!("line-sticker-{millis}.png")
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// The saved stickers, capped at a fixed capacity and written through to a
/// [`StickerStore`] after every change.
#[derive(Debug)]
pub struct StickerCollection<S: StickerStore> {
    store: S,
    records: Vec<StickerRecord>,
    capacity: usize,
}

impl<S: StickerStore> StickerCollection<S> {
    /// Load the collection. Unreadable or corrupt data is logged and
    /// treated as empty.
    pub fn open(store: S) -> Self {
        Self::with_capacity(store, MAX_STICKERS)
    }

    pub fn with_capacity(store: S, capacity: usize) -> Self {
        let mut records = store.load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "sticker store unreadable, starting empty");
            Vec::new()
        });
        if records.len() > capacity {
            tracing::warn!(
                count = records.len(),
                capacity,
                "sticker store over capacity, dropping newest"
            );
            records.truncate(capacity);
        }
        tracing::debug!(count = records.len(), "sticker collection loaded");
        Self {
            store,
            records,
            capacity,
        }
    }

    pub fn records(&self) -> &[StickerRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    pub fn get(&self, id: u64) -> Result<&StickerRecord> {
        self.records
            .iter()
            .find(|r| r.id == id)
            .ok_or(StickerError::NotFound(id))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a PNG. Fails with [`StickerError::Capacity`] when full; on any
    /// error the collection is unchanged.
    pub fn add(&mut self, png: Vec<u8>) -> Result<&StickerRecord> {
        if self.is_full() {
            return Err(StickerError::Capacity { max: self.capacity });
        }
        let now = now_millis();
        let id = match self.records.iter().map(|r| r.id).max() {
            Some(last) if last >= now => last + 1,
            _ => now,
        };
        self.records.push(StickerRecord {
            id,
            png,
            saved_at: now,
        });
        if let Err(e) = self.store.persist(&self.records) {
            self.records.pop();
            return Err(e);
        }
        tracing::info!(id, count = self.records.len(), "sticker saved");
        self.get(id)
    }

    pub fn remove(&mut self, id: u64) -> Result<StickerRecord> {
        let idx = self
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(StickerError::NotFound(id))?;
        let removed = self.records.remove(idx);
        if let Err(e) = self.store.persist(&self.records) {
            self.records.insert(idx, removed);
            return Err(e);
        }
        tracing::info!(id, "sticker removed");
        Ok(removed)
    }

    /// Remove everything. Returns how many stickers were dropped.
    pub fn clear(&mut self) -> Result<usize> {
        if self.records.is_empty() {
            return Ok(0);
        }
        self.store.persist(&[])?;
        let count = self.records.len();
        self.records.clear();
        tracing::info!(count, "sticker collection cleared");
        Ok(count)
    }

    /// Write every sticker to `dir` as `sticker-01.png`, `sticker-02.png`, ...
    pub fn export_all(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if self.records.is_empty() {
            return Err(StickerError::validation("no stickers to export"));
        }
        std::fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(self.records.len());
        for (i, record) in self.records.iter().enumerate() {
            let path = dir.join(format!("sticker-{:02}.png", i + 1));
            std::fs::write(&path, &record.png)?;
            written.push(path);
        }
        tracing::info!(count = written.len(), dir = %dir.display(), "stickers exported");
        Ok(written)
    }
}
