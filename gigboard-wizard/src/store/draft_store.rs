//! Draft slot persistence
//!
//! One serialized [`DraftRecord`] under a fixed key. Saves fully overwrite
//! the previous value. A stored value that no longer deserializes is treated
//! as absent so a stale draft never blocks the wizard from opening.

use std::sync::Arc;

use gigboard_common::config::DEFAULT_DRAFT_KEY;
use gigboard_common::Result;
use tracing::{debug, warn};

use super::kv::KeyValueStore;
use crate::models::DraftRecord;

/// Durable storage for the single in-progress draft
#[derive(Clone)]
pub struct DraftStore {
    backend: Arc<dyn KeyValueStore>,
    key: String,
}

impl DraftStore {
    /// Store under the default draft key
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(backend, DEFAULT_DRAFT_KEY)
    }

    pub fn with_key(backend: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Load the stored draft
    ///
    /// Absent or malformed values return `Ok(None)`; only backend failures
    /// are errors.
    pub async fn load(&self) -> Result<Option<DraftRecord>> {
        let Some(raw) = self.backend.get(&self.key).await? else {
            debug!(key = %self.key, "No stored draft");
            return Ok(None);
        };

        match serde_json::from_str::<DraftRecord>(&raw) {
            Ok(record) => {
                debug!(key = %self.key, step = record.step.number(), "Loaded stored draft");
                Ok(Some(record))
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding malformed stored draft");
                Ok(None)
            }
        }
    }

    /// Overwrite the stored draft
    pub async fn save(&self, record: &DraftRecord) -> Result<()> {
        let raw = serde_json::to_string(record)?;
        self.backend.set(&self.key, &raw).await?;
        debug!(key = %self.key, step = record.step.number(), "Saved draft");
        Ok(())
    }

    /// Remove the stored draft
    pub async fn clear(&self) -> Result<()> {
        self.backend.remove(&self.key).await?;
        debug!(key = %self.key, "Cleared draft");
        Ok(())
    }
}
