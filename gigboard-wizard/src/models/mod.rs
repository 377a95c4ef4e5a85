//! Data models for gigboard-wizard
//!
//! - `draft`: the in-progress listing record and its field mutations
//! - `listing`: publish-time projections (payload, actor, listing id)

pub mod draft;
pub mod listing;

pub use draft::{
    default_start_time, Currency, DraftRecord, FieldUpdate, ListingType, WizardStep,
    MIN_DESCRIPTION_LEN,
};
pub use listing::{Actor, Coordinates, CreateListingPayload, ListingId};
