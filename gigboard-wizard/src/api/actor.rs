//! Actor extraction from request headers
//!
//! The session layer in front of this service authenticates the user and
//! forwards the identity as `x-actor-id` / `x-actor-name`. A request without
//! `x-actor-id` is unauthenticated.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use std::convert::Infallible;

use crate::models::Actor;

pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_NAME_HEADER: &str = "x-actor-name";

/// Current actor, `None` when unauthenticated
#[derive(Debug, Clone)]
pub struct OptionalActor(pub Option<Actor>);

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read the actor from `headers`; the display name falls back to the id
pub fn actor_from_headers(headers: &HeaderMap) -> Option<Actor> {
    let id = header_value(headers, ACTOR_ID_HEADER)?;
    let display_name = header_value(headers, ACTOR_NAME_HEADER).unwrap_or_else(|| id.clone());
    Some(Actor { id, display_name })
}

#[async_trait]
impl<S> FromRequestParts<S> for OptionalActor
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OptionalActor(actor_from_headers(&parts.headers)))
    }
}
