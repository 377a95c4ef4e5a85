//! Server-Sent Events (SSE) utilities

use crate::events::{EventBus, WizardEvent};
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Convert a wizard event into an SSE frame named after its variant
pub fn to_sse_event(event: &WizardEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Event::default().event(event.event_type()).data(data)
}

/// Create an SSE stream forwarding every event emitted on `bus`
///
/// Sends a `ConnectionStatus` frame first. Lagging clients skip the events
/// they missed and keep streaming.
///
/// # Example
/// ```rust,ignore
/// pub async fn event_stream(
///     State(state): State<AppState>,
/// ) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
///     gigboard_common::sse::create_event_sse_stream("gigboard-wizard", &state.event_bus)
/// }
/// ```
pub fn create_event_sse_stream(
    service_name: &'static str,
    bus: &EventBus,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    info!("New SSE client connected to {} events", service_name);
    let mut rx = bus.subscribe();

    let stream = async_stream::stream! {
        yield Ok(Event::default()
            .event("ConnectionStatus")
            .data("connected"));

        loop {
            match rx.recv().await {
                Ok(event) => {
                    debug!("SSE: forwarding {}", event.event_type());
                    yield Ok(to_sse_event(&event));
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("SSE: client lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    )
}
