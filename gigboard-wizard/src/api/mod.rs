//! HTTP API handlers for gigboard-wizard

pub mod actor;
pub mod draft;
pub mod health;
pub mod sse;

pub use actor::OptionalActor;
pub use draft::draft_routes;
pub use health::health_routes;
pub use sse::event_stream;
