//! Durable draft persistence
//!
//! [`KeyValueStore`] is the storage seam; [`DraftStore`] serializes the
//! single draft slot on top of it.

pub mod draft_store;
pub mod kv;

pub use draft_store::DraftStore;
pub use kv::{KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore};
