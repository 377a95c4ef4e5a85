//! Publish-time listing types
//!
//! [`CreateListingPayload`] is derived from a [`DraftRecord`] at commit time
//! and lives only for the duration of the creation call.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::draft::{default_start_time, Currency, DraftRecord, ListingType};

/// Authenticated user initiating a publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub display_name: String,
}

impl Actor {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Identifier of a created listing
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(pub String);

impl ListingId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ListingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        ListingId(value.to_string())
    }
}

/// Venue geocoordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Creation request sent to the listing-creation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateListingPayload {
    pub title: String,
    pub description: String,
    pub date_time: NaiveDateTime,
    pub location: String,
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub price: f64,
    pub currency: Currency,
    pub negotiable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    pub image_url: String,
    pub organizer_id: String,
    pub organizer_name: String,
    pub tags: Vec<String>,
}

impl CreateListingPayload {
    /// Build the payload from a complete draft
    ///
    /// Returns `None` when the draft lacks a type or date; callers check
    /// step completeness first.
    pub fn from_draft(record: &DraftRecord, image_url: String, actor: &Actor) -> Option<Self> {
        let listing_type = record.listing_type?;
        let date = record.date?;
        let start_time = record.start_time.unwrap_or_else(default_start_time);

        let coordinates = match (record.lat, record.lng) {
            (Some(lat), Some(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };

        Some(Self {
            title: record.title.trim().to_string(),
            description: record.description.trim().to_string(),
            date_time: date.and_time(start_time),
            location: record.location.trim().to_string(),
            listing_type,
            price: record.budget.unwrap_or(0.0),
            currency: record.currency,
            negotiable: record.negotiable,
            coordinates,
            image_url,
            organizer_id: actor.id.clone(),
            organizer_name: actor.display_name.clone(),
            // BTreeSet iteration is already sorted
            tags: record.artist_type.iter().cloned().collect(),
        })
    }
}
