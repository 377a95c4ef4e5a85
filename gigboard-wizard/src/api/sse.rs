//! Wizard event stream

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams `WizardEvent`s (draft saves, step changes, degraded uploads,
/// publish results) to the browser.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    gigboard_common::sse::create_event_sse_stream("gigboard-wizard", &state.event_bus)
}
