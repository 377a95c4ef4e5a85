//! Listing wizard API handlers
//!
//! GET /api/draft, PATCH /api/draft, POST /api/draft/next, POST /api/draft/back,
//! GET /api/draft/advice, POST /api/draft/advice/apply, POST /api/draft/publish
//!
//! The wizard lock is released while a publish awaits the uploader and the
//! creation backend, so edits and `back` stay responsive meanwhile.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Serialize;

use super::OptionalActor;
use crate::advisor::Hint;
use crate::error::{ApiError, ApiResult};
use crate::models::{Actor, DraftRecord, FieldUpdate, ListingId, WizardStep};
use crate::publish::{PublishError, PublishReceipt};
use crate::wizard::{ListingWizard, Transition, WizardStatus};
use crate::AppState;

/// Per-step predicate results
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepValidity {
    pub details: bool,
    pub requirements: bool,
    pub review: bool,
}

/// Everything the wizard page renders
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftView {
    pub step: WizardStep,
    pub record: DraftRecord,
    pub validity: StepValidity,
    /// Drives the enabled state of the "next" control
    pub can_advance: bool,
    pub status: WizardStatus,
    pub advice: Hint,
    /// Review preview of the combined date and start time
    pub scheduled_at: Option<NaiveDateTime>,
}

impl DraftView {
    fn of(wizard: &ListingWizard) -> Self {
        Self {
            step: wizard.step(),
            record: wizard.record().clone(),
            validity: StepValidity {
                details: wizard.is_valid(WizardStep::Details),
                requirements: wizard.is_valid(WizardStep::Requirements),
                review: wizard.is_valid(WizardStep::Review),
            },
            can_advance: wizard.can_advance(),
            status: wizard.status().clone(),
            advice: wizard.advice(),
            scheduled_at: wizard.record().scheduled_at(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransitionResponse {
    pub transition: Transition,
    pub draft: DraftView,
}

#[derive(Debug, Serialize)]
pub struct ApplyAdviceResponse {
    pub applied: bool,
    pub draft: DraftView,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub listing_id: ListingId,
    pub image_url: String,
    /// Present when the upload failed and the placeholder image was used
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_degraded: Option<String>,
}

/// GET /api/draft
pub async fn get_draft(State(state): State<AppState>) -> Json<DraftView> {
    let wizard = state.wizard.lock().await;
    Json(DraftView::of(&wizard))
}

/// PATCH /api/draft
pub async fn update_field(
    State(state): State<AppState>,
    Json(update): Json<FieldUpdate>,
) -> ApiResult<Json<DraftView>> {
    let mut wizard = state.wizard.lock().await;
    wizard.update_field(update).await?;
    Ok(Json(DraftView::of(&wizard)))
}

/// POST /api/draft/next
///
/// A blocked advance is a normal response, not an error.
pub async fn next_step(State(state): State<AppState>) -> ApiResult<Json<TransitionResponse>> {
    let mut wizard = state.wizard.lock().await;
    let transition = wizard.next().await?;
    Ok(Json(TransitionResponse {
        transition,
        draft: DraftView::of(&wizard),
    }))
}

/// POST /api/draft/back
pub async fn previous_step(State(state): State<AppState>) -> ApiResult<Json<TransitionResponse>> {
    let mut wizard = state.wizard.lock().await;
    let transition = wizard.back().await?;
    Ok(Json(TransitionResponse {
        transition,
        draft: DraftView::of(&wizard),
    }))
}

/// GET /api/draft/advice
pub async fn get_advice(State(state): State<AppState>) -> Json<Hint> {
    let wizard = state.wizard.lock().await;
    Json(wizard.advice())
}

/// POST /api/draft/advice/apply
pub async fn apply_advice(State(state): State<AppState>) -> ApiResult<Json<ApplyAdviceResponse>> {
    let mut wizard = state.wizard.lock().await;
    let applied = wizard.apply_advice().await?;
    Ok(Json(ApplyAdviceResponse {
        applied,
        draft: DraftView::of(&wizard),
    }))
}

/// POST /api/draft/publish
///
/// The commit runs in its own task, so a client that disconnects mid-publish
/// does not leave the wizard stuck in `Publishing`.
pub async fn publish(
    State(state): State<AppState>,
    OptionalActor(actor): OptionalActor,
) -> ApiResult<Json<PublishResponse>> {
    let task = tokio::spawn(run_publish(state.clone(), actor));

    let receipt = match task.await {
        Ok(result) => result?,
        Err(e) => {
            let reason = format!("publish task failed: {}", e);
            let outcome = Err(PublishError::CreationFailed(reason.clone()));
            state.wizard.lock().await.finish_publish(&outcome).await;
            return Err(ApiError::Internal(reason));
        }
    };

    Ok(Json(PublishResponse {
        listing_id: receipt.listing_id,
        image_url: receipt.image_url,
        image_degraded: receipt.image_degraded,
    }))
}

/// begin → commit → finish, holding the wizard lock only at the two ends
async fn run_publish(
    state: AppState,
    actor: Option<Actor>,
) -> Result<PublishReceipt, PublishError> {
    let snapshot = state.wizard.lock().await.begin_publish()?;

    let result = state
        .coordinator
        .publish_with_receipt(&snapshot, actor.as_ref())
        .await;

    let outcome = result
        .as_ref()
        .map(|receipt| receipt.listing_id.clone())
        .map_err(Clone::clone);
    state.wizard.lock().await.finish_publish(&outcome).await;

    result
}

/// Build listing wizard routes
pub fn draft_routes() -> Router<AppState> {
    Router::new()
        .route("/api/draft", get(get_draft).patch(update_field))
        .route("/api/draft/next", post(next_step))
        .route("/api/draft/back", post(previous_step))
        .route("/api/draft/advice", get(get_advice))
        .route("/api/draft/advice/apply", post(apply_advice))
        .route("/api/draft/publish", post(publish))
}
