//! Test Helper Utilities
//!
//! Recording collaborators and draft fixtures shared by the integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use gigboard_common::db::init_database;
use gigboard_common::events::EventBus;
use gigboard_wizard::media::{BinaryObject, MediaResolver, ObjectUploader, UploadError};
use gigboard_wizard::models::{
    Actor, CreateListingPayload, Currency, DraftRecord, ListingId, ListingType, WizardStep,
};
use gigboard_wizard::publish::{CreationError, ListingCreator, PublishCoordinator};
use gigboard_wizard::store::{DraftStore, KeyValueStore, MemoryKeyValueStore};
use sqlx::SqlitePool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::Notify;

pub const PLACEHOLDER_URL: &str = "https://cdn.test/placeholder.jpg";
pub const UPLOADED_URL_BASE: &str = "https://cdn.test/objects";

/// "hello" as an inline PNG
pub const INLINE_PNG: &str = "data:image/png;base64,aGVsbG8=";

/// Uploader that records every call
#[derive(Default)]
pub struct RecordingUploader {
    calls: AtomicUsize,
    paths: Mutex<Vec<String>>,
    objects: Mutex<Vec<BinaryObject>>,
    fail_with: Option<u16>,
}

impl RecordingUploader {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Every upload fails with a storage error carrying `status`
    pub fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(status),
            ..Self::default()
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }

    pub fn objects(&self) -> Vec<BinaryObject> {
        self.objects.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectUploader for RecordingUploader {
    async fn upload(&self, object: BinaryObject, path: &str) -> Result<String, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.paths.lock().unwrap().push(path.to_string());
        self.objects.lock().unwrap().push(object);

        match self.fail_with {
            Some(status) => Err(UploadError::Storage(status, "bucket unavailable".to_string())),
            None => Ok(format!("{}/{}", UPLOADED_URL_BASE, path)),
        }
    }
}

/// Listing creator that records every payload
pub struct RecordingCreator {
    calls: AtomicUsize,
    payloads: Mutex<Vec<CreateListingPayload>>,
    listing_id: Option<String>,
}

impl RecordingCreator {
    /// Every creation succeeds with `listing_id`
    pub fn returning(listing_id: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            listing_id: Some(listing_id.to_string()),
        })
    }

    /// Every creation fails with a connectivity error
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            payloads: Mutex::new(Vec::new()),
            listing_id: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn payloads(&self) -> Vec<CreateListingPayload> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ListingCreator for RecordingCreator {
    async fn create(&self, payload: &CreateListingPayload) -> Result<ListingId, CreationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(payload.clone());

        match &self.listing_id {
            Some(id) => Ok(ListingId(id.clone())),
            None => Err(CreationError::Connectivity("backend unreachable".to_string())),
        }
    }
}

/// Listing creator that blocks each creation until released
///
/// Lets tests act on the wizard while a publish is in flight.
pub struct GatedCreator {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
    listing_id: String,
}

impl GatedCreator {
    pub fn returning(listing_id: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
            listing_id: listing_id.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Wait until a creation is blocked on the gate
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    /// Let the blocked creation complete
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl ListingCreator for GatedCreator {
    async fn create(&self, _payload: &CreateListingPayload) -> Result<ListingId, CreationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.entered.notify_one();
        self.release.notified().await;
        Ok(ListingId(self.listing_id.clone()))
    }
}

/// Key-value store whose every operation fails
pub struct FailingKeyValueStore;

#[async_trait]
impl KeyValueStore for FailingKeyValueStore {
    async fn get(&self, _key: &str) -> gigboard_common::Result<Option<String>> {
        Err(gigboard_common::Error::Internal("storage offline".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> gigboard_common::Result<()> {
        Err(gigboard_common::Error::Internal("storage offline".to_string()))
    }

    async fn remove(&self, _key: &str) -> gigboard_common::Result<()> {
        Err(gigboard_common::Error::Internal("storage offline".to_string()))
    }
}

pub fn test_actor() -> Actor {
    Actor::new("user-42", "Jamie Organizer")
}

/// Draft store over a fresh in-memory backend
///
/// The backend is returned as well so tests can inspect raw stored values.
pub fn memory_drafts() -> (Arc<MemoryKeyValueStore>, DraftStore) {
    let backend = Arc::new(MemoryKeyValueStore::new());
    let drafts = DraftStore::new(backend.clone());
    (backend, drafts)
}

/// A draft satisfying every step predicate, sitting on the review step
pub fn complete_record() -> DraftRecord {
    DraftRecord {
        step: WizardStep::Review,
        title: "Friday Jazz Night".to_string(),
        listing_type: Some(ListingType::Gig),
        date: NaiveDate::from_ymd_opt(2026, 11, 20),
        start_time: NaiveTime::from_hms_opt(21, 30, 0),
        location: "Blue Note, 131 W 3rd St".to_string(),
        lat: Some(40.7308),
        lng: Some(-73.9973),
        artist_type: ["Saxophonist".to_string(), "Drummer".to_string()]
            .into_iter()
            .collect(),
        budget: Some(450.0),
        currency: Currency::Usd,
        negotiable: true,
        description: "Two sets of standards, house PA provided.".to_string(),
        image: None,
    }
}

pub fn coordinator(
    uploader: Arc<dyn ObjectUploader>,
    creator: Arc<dyn ListingCreator>,
    drafts: DraftStore,
    bus: &EventBus,
) -> PublishCoordinator {
    let media = MediaResolver::new(uploader, PLACEHOLDER_URL).with_event_bus(bus.clone());
    PublishCoordinator::new(media, creator, drafts).with_event_bus(bus.clone())
}

/// Temporary database with the gigboard schema
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let pool = init_database(&temp_dir.path().join("gigboard-test.db")).await?;
    Ok((temp_dir, pool))
}
