//! Persistence slots for the collection
//!
//! A slot holds exactly one value: the JSON-serialized record array. It is
//! read once at startup and overwritten wholesale after every mutation.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::{db, Error, Result};

/// Settings key under which the collection is stored
pub const COLLECTION_SLOT_KEY: &str = "miniature_collection";

/// Named storage location for the serialized collection
#[async_trait]
pub trait CollectionSlot: Send + Sync {
    /// Human-readable slot name for logs
    fn name(&self) -> &str;

    /// Current contents, `None` if nothing was ever written
    async fn read(&self) -> Result<Option<String>>;

    /// Replace the contents
    async fn write(&self, contents: &str) -> Result<()>;
}

/// Slot backed by one row of the SQLite `settings` table
#[derive(Debug, Clone)]
pub struct SqliteSlot {
    pool: SqlitePool,
    key: String,
}

impl SqliteSlot {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_key(pool, COLLECTION_SLOT_KEY)
    }

    pub fn with_key(pool: SqlitePool, key: impl Into<String>) -> Self {
        Self {
            pool,
            key: key.into(),
        }
    }
}

#[async_trait]
impl CollectionSlot for SqliteSlot {
    fn name(&self) -> &str {
        &self.key
    }

    async fn read(&self) -> Result<Option<String>> {
        db::get_setting(&self.pool, &self.key).await
    }

    async fn write(&self, contents: &str) -> Result<()> {
        db::set_setting(&self.pool, &self.key, contents).await
    }
}

/// In-process slot for tests and throwaway instances.
///
/// Writes can be made to fail on demand to exercise the store's
/// all-or-nothing behaviour.
#[derive(Debug, Default)]
pub struct MemorySlot {
    contents: Mutex<Option<String>>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Mutex::new(Some(contents.into())),
            ..Self::default()
        }
    }

    /// Last successfully written value
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of successful writes
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CollectionSlot for MemorySlot {
    fn name(&self) -> &str {
        "memory"
    }

    async fn read(&self) -> Result<Option<String>> {
        Ok(self.contents())
    }

    async fn write(&self, contents: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "memory slot is read-only",
            )));
        }

        *self
            .contents
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(contents.to_string());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
