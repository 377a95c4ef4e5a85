//! # Gigboard Common Library
//!
//! Shared code for Gigboard services including:
//! - Error type and result alias
//! - Bootstrap configuration loading and root folder resolution
//! - SQLite pool initialization (key-value and document tables)
//! - Wizard event types and the broadcast event bus
//! - SSE helpers

pub mod config;
pub mod db;
pub mod error;
pub mod events;
pub mod sse;

pub use error::{Error, Result};
pub use events::{EventBus, WizardEvent};
