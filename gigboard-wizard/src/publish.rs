//! Listing publication
//!
//! Commit sequence, strictly in order:
//! 1. require an authenticated actor
//! 2. require a complete draft
//! 3. resolve the image (never fails, may degrade to the placeholder)
//! 4. build the creation payload
//! 5. create the listing; on success clear the stored draft
//!
//! A creation failure leaves the stored draft untouched so the user can
//! retry. There is no automatic retry.

use async_trait::async_trait;
use chrono::Utc;
use gigboard_common::events::{EventBus, WizardEvent};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::media::MediaResolver;
use crate::models::{Actor, CreateListingPayload, DraftRecord, ListingId, WizardStep};
use crate::store::DraftStore;

/// Failures reported by a listing-creation backend
#[derive(Debug, Error)]
pub enum CreationError {
    /// Payload rejected by the backend
    #[error("Validation error: {0}")]
    Validation(String),

    /// Backend unreachable
    #[error("Connectivity error: {0}")]
    Connectivity(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Listing-creation collaborator
#[async_trait]
pub trait ListingCreator: Send + Sync {
    async fn create(&self, payload: &CreateListingPayload) -> Result<ListingId, CreationError>;
}

/// Publish failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublishError {
    /// No signed-in actor; nothing was attempted
    #[error("Sign in to publish a listing")]
    Unauthenticated,

    /// A gated step's predicate does not hold; nothing was attempted
    #[error("Draft is incomplete: {0} is not valid")]
    IncompleteDraft(WizardStep),

    /// Publish requested before reaching the review step
    #[error("Publishing requires the review step, wizard is on {0}")]
    NotOnReview(WizardStep),

    /// Another publish of this wizard has not finished yet
    #[error("A publish is already in progress")]
    PublishInFlight,

    /// Backend refused or failed the creation; draft preserved
    #[error("Listing creation failed: {0}")]
    CreationFailed(String),
}

/// Result of a successful publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub listing_id: ListingId,
    pub image_url: String,
    /// Set when the image upload failed and the placeholder was used
    pub image_degraded: Option<String>,
}

/// Orchestrates the commit of a draft into a listing
#[derive(Clone)]
pub struct PublishCoordinator {
    media: MediaResolver,
    creator: Arc<dyn ListingCreator>,
    drafts: DraftStore,
    event_bus: Option<EventBus>,
}

impl PublishCoordinator {
    pub fn new(media: MediaResolver, creator: Arc<dyn ListingCreator>, drafts: DraftStore) -> Self {
        Self {
            media,
            creator,
            drafts,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Publish `record` on behalf of `actor`, returning the new listing id
    pub async fn publish(
        &self,
        record: &DraftRecord,
        actor: Option<&Actor>,
    ) -> Result<ListingId, PublishError> {
        self.publish_with_receipt(record, actor)
            .await
            .map(|receipt| receipt.listing_id)
    }

    /// Publish and report how the image was resolved
    pub async fn publish_with_receipt(
        &self,
        record: &DraftRecord,
        actor: Option<&Actor>,
    ) -> Result<PublishReceipt, PublishError> {
        let actor = actor.ok_or(PublishError::Unauthenticated)?;

        if let Some(step) = record.first_incomplete_step() {
            return Err(PublishError::IncompleteDraft(step));
        }

        let media = self.media.resolve(record.image.as_deref(), actor).await;

        let payload = CreateListingPayload::from_draft(record, media.url.clone(), actor)
            .ok_or(PublishError::IncompleteDraft(WizardStep::Details))?;

        let listing_id = match self.creator.create(&payload).await {
            Ok(id) => id,
            Err(e) => {
                let reason = e.to_string();
                error!(actor_id = %actor.id, error = %reason, "Listing creation failed, draft kept");
                self.emit(WizardEvent::PublishFailed {
                    reason: reason.clone(),
                    timestamp: Utc::now(),
                });
                return Err(PublishError::CreationFailed(reason));
            }
        };

        // The listing exists at this point; a stale draft is the lesser problem
        if let Err(e) = self.drafts.clear().await {
            warn!(listing_id = %listing_id, error = %e, "Listing created but draft could not be cleared");
        }

        info!(
            listing_id = %listing_id,
            actor_id = %actor.id,
            image_degraded = media.is_degraded(),
            "Listing published"
        );
        self.emit(WizardEvent::ListingPublished {
            listing_id: listing_id.to_string(),
            timestamp: Utc::now(),
        });

        Ok(PublishReceipt {
            listing_id,
            image_url: media.url,
            image_degraded: media.degraded,
        })
    }

    fn emit(&self, event: WizardEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(event);
        }
    }
}
