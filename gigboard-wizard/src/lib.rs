//! gigboard-wizard library
//!
//! Multi-step listing publication for the Gigboard marketplace:
//! - `models`: draft record, field updates, publish payload
//! - `store`: durable draft slot over a key-value backend
//! - `wizard`: step state machine
//! - `advisor`: contextual hints
//! - `media`: image resolution and object uploaders
//! - `publish`: commit orchestration
//! - `api`: HTTP surface hosting one wizard session

pub mod advisor;
pub mod api;
pub mod error;
pub mod listing_store;
pub mod media;
pub mod models;
pub mod publish;
pub mod store;
pub mod wizard;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use gigboard_common::config::TomlConfig;
use gigboard_common::events::EventBus;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::info;

use crate::listing_store::SqliteListingCreator;
use crate::media::{FsObjectUploader, HttpObjectUploader, MediaResolver, ObjectUploader};
use crate::publish::PublishCoordinator;
use crate::store::{DraftStore, SqliteKeyValueStore};
use crate::wizard::ListingWizard;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// The single wizard session of this service
    pub wizard: Arc<Mutex<ListingWizard>>,
    pub coordinator: PublishCoordinator,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// Directory served under `/media` (filesystem uploader only)
    pub media_root: Option<PathBuf>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(wizard: ListingWizard, coordinator: PublishCoordinator, event_bus: EventBus) -> Self {
        Self {
            wizard: Arc::new(Mutex::new(wizard)),
            coordinator,
            event_bus,
            media_root: None,
            startup_time: Utc::now(),
        }
    }

    pub fn with_media_root(mut self, media_root: PathBuf) -> Self {
        self.media_root = Some(media_root);
        self
    }

    /// Wire the SQLite-backed draft store and listing creator
    ///
    /// Uploads go to `config.media.upload_endpoint` when set, otherwise to
    /// `media_root` on local disk.
    pub async fn from_config(
        db: SqlitePool,
        config: &TomlConfig,
        media_root: PathBuf,
        event_bus: EventBus,
    ) -> anyhow::Result<Self> {
        let drafts = DraftStore::with_key(
            Arc::new(SqliteKeyValueStore::new(db.clone())),
            config.wizard.draft_key.clone(),
        );

        let (uploader, served_root): (Arc<dyn ObjectUploader>, Option<PathBuf>) =
            match &config.media.upload_endpoint {
                Some(endpoint) => {
                    info!("Uploading listing images to {}", endpoint);
                    let uploader =
                        HttpObjectUploader::new(endpoint.clone(), config.media.public_base_url.clone())?;
                    (Arc::new(uploader), None)
                }
                None => {
                    info!("Storing listing images in {}", media_root.display());
                    let uploader =
                        FsObjectUploader::new(media_root.clone(), config.media.public_base_url.clone());
                    (Arc::new(uploader), Some(media_root))
                }
            };

        let media = MediaResolver::new(uploader, config.wizard.placeholder_image_url.clone())
            .with_event_bus(event_bus.clone());
        let coordinator = PublishCoordinator::new(
            media,
            Arc::new(SqliteListingCreator::new(db)),
            drafts.clone(),
        )
        .with_event_bus(event_bus.clone());

        let wizard = ListingWizard::open(drafts)
            .await?
            .with_event_bus(event_bus.clone());

        let mut state = Self::new(wizard, coordinator, event_bus);
        state.media_root = served_root;
        Ok(state)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let mut router = Router::new()
        .merge(api::draft_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream));

    if let Some(media_root) = &state.media_root {
        router = router.nest_service("/media", ServeDir::new(media_root));
    }

    router.layer(CorsLayer::permissive()).with_state(state)
}
