//! Collection store
//!
//! Owns the authoritative record array. Every mutation builds the next array,
//! writes it to the persistence slot, and only then replaces the in-memory
//! copy, so a failed write leaves the collection exactly as it was.

mod slot;

pub use slot::{CollectionSlot, MemorySlot, SqliteSlot, COLLECTION_SLOT_KEY};

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::model::Record;
use crate::Result;

pub struct CollectionStore {
    records: Vec<Record>,
    slot: Arc<dyn CollectionSlot>,
}

impl CollectionStore {
    /// Load the collection persisted in `slot`.
    ///
    /// Missing, unreadable or corrupt contents yield an empty collection.
    pub async fn load(slot: Arc<dyn CollectionSlot>) -> Self {
        let records = match slot.read().await {
            Ok(Some(json)) => match serde_json::from_str::<Vec<Record>>(&json) {
                Ok(records) => records,
                Err(e) => {
                    warn!(slot = slot.name(), error = %e, "Stored collection is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                debug!(slot = slot.name(), "No stored collection, starting empty");
                Vec::new()
            }
            Err(e) => {
                warn!(slot = slot.name(), error = %e, "Failed to read stored collection, starting empty");
                Vec::new()
            }
        };

        info!(slot = slot.name(), count = records.len(), "Collection loaded");
        Self { records, slot }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Prepend a batch, keeping the batch's own order. Returns the batch size.
    pub async fn add_batch(&mut self, batch: Vec<Record>) -> Result<usize> {
        if batch.is_empty() {
            return Ok(0);
        }

        let added = batch.len();
        let mut next = batch;
        next.extend(self.records.iter().cloned());
        self.commit(next).await?;

        info!(added, total = self.records.len(), "Records added");
        Ok(added)
    }

    /// Prepend a single record
    pub async fn add_one(&mut self, record: Record) -> Result<()> {
        self.add_batch(vec![record]).await.map(|_| ())
    }

    /// Replace the image of record `id`.
    ///
    /// Returns `false` without touching storage when no such record exists.
    pub async fn update_image(&mut self, id: &str, url: impl Into<String>) -> Result<bool> {
        let Some(position) = self.records.iter().position(|r| r.id == id) else {
            debug!(id, "Image update for unknown record ignored");
            return Ok(false);
        };

        let mut next = self.records.clone();
        next[position].image_url = Some(url.into());
        self.commit(next).await?;

        info!(id, "Record image updated");
        Ok(true)
    }

    /// Remove every record whose id is in `ids`, keeping the rest in order.
    /// Returns how many records were removed.
    pub async fn remove_many(&mut self, ids: &HashSet<String>) -> Result<usize> {
        let next: Vec<Record> = self
            .records
            .iter()
            .filter(|r| !ids.contains(&r.id))
            .cloned()
            .collect();

        let removed = self.records.len() - next.len();
        if removed == 0 {
            return Ok(0);
        }

        self.commit(next).await?;
        info!(removed, total = self.records.len(), "Records removed");
        Ok(removed)
    }

    /// Remove record `id`; `false` if it was not present
    pub async fn remove_one(&mut self, id: &str) -> Result<bool> {
        let ids = HashSet::from([id.to_string()]);
        Ok(self.remove_many(&ids).await? > 0)
    }

    async fn commit(&mut self, next: Vec<Record>) -> Result<()> {
        let json = serde_json::to_string(&next)?;
        self.slot.write(&json).await?;
        self.records = next;
        Ok(())
    }
}

impl std::fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionStore")
            .field("slot", &self.slot.name())
            .field("records", &self.records.len())
            .finish()
    }
}
