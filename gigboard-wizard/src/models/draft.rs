//! Listing draft record
//!
//! The single mutable entity of a wizard session. It is rehydrated verbatim
//! from durable storage, mutated one field at a time through [`FieldUpdate`],
//! and discarded only after a successful publish.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use gigboard_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Minimum description length (characters, surrounding whitespace ignored)
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// Start time assumed when the organizer leaves it empty
///
/// Used by both the review preview and the creation payload.
pub fn default_start_time() -> NaiveTime {
    NaiveTime::from_hms_opt(20, 0, 0).unwrap_or_default()
}

/// Wizard step cursor
///
/// Persisted as the integer 1..=3; any other value fails to deserialize.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum WizardStep {
    /// Title, type, date and place
    #[default]
    Details = 1,
    /// Artist types, budget and description
    Requirements = 2,
    /// Read-only summary before publishing
    Review = 3,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::Details,
        WizardStep::Requirements,
        WizardStep::Review,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    pub fn next(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => Some(WizardStep::Requirements),
            WizardStep::Requirements => Some(WizardStep::Review),
            WizardStep::Review => None,
        }
    }

    pub fn previous(self) -> Option<WizardStep> {
        match self {
            WizardStep::Details => None,
            WizardStep::Requirements => Some(WizardStep::Details),
            WizardStep::Review => Some(WizardStep::Requirements),
        }
    }
}

impl From<WizardStep> for u8 {
    fn from(step: WizardStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for WizardStep {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(WizardStep::Details),
            2 => Ok(WizardStep::Requirements),
            3 => Ok(WizardStep::Review),
            other => Err(format!("wizard step out of range: {}", other)),
        }
    }
}

impl std::fmt::Display for WizardStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}", self.number())
    }
}

/// Listing category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListingType {
    Gig,
    StudioSession,
    Festival,
    Tour,
    Residency,
}

/// Budget currency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    #[default]
    Usd,
    Eur,
    Gbp,
}

/// In-progress listing draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftRecord {
    pub step: WizardStep,

    // Step 1: details
    pub title: String,
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,
    pub date: Option<NaiveDate>,
    #[serde(with = "hh_mm")]
    pub start_time: Option<NaiveTime>,
    pub location: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,

    // Step 2: requirements
    pub artist_type: BTreeSet<String>,
    pub budget: Option<f64>,
    pub currency: Currency,
    pub negotiable: bool,
    pub description: String,
    /// `data:` URL pending upload, or an already hosted image URL
    pub image: Option<String>,
}

impl Default for DraftRecord {
    fn default() -> Self {
        Self {
            step: WizardStep::Details,
            title: String::new(),
            listing_type: None,
            date: None,
            start_time: None,
            location: String::new(),
            lat: None,
            lng: None,
            artist_type: BTreeSet::new(),
            budget: None,
            currency: Currency::default(),
            negotiable: false,
            description: String::new(),
            image: None,
        }
    }
}

/// Single-field mutation of a [`DraftRecord`]
///
/// Wire form: `{ "field": "<name>", "value": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value", rename_all = "camelCase")]
pub enum FieldUpdate {
    Title(String),
    #[serde(rename = "type")]
    ListingType(Option<ListingType>),
    Date(Option<NaiveDate>),
    StartTime(#[serde(with = "hh_mm")] Option<NaiveTime>),
    Location(String),
    Coordinates {
        lat: Option<f64>,
        lng: Option<f64>,
    },
    #[serde(rename = "artistType")]
    ArtistTypes(BTreeSet<String>),
    /// Add the tag if missing, remove it otherwise
    ToggleArtistType(String),
    Budget(Option<f64>),
    Currency(Currency),
    Negotiable(bool),
    Description(String),
    Image(Option<String>),
}

impl FieldUpdate {
    /// Wire name of the targeted field
    pub fn field_name(&self) -> &'static str {
        match self {
            FieldUpdate::Title(_) => "title",
            FieldUpdate::ListingType(_) => "type",
            FieldUpdate::Date(_) => "date",
            FieldUpdate::StartTime(_) => "startTime",
            FieldUpdate::Location(_) => "location",
            FieldUpdate::Coordinates { .. } => "coordinates",
            FieldUpdate::ArtistTypes(_) | FieldUpdate::ToggleArtistType(_) => "artistType",
            FieldUpdate::Budget(_) => "budget",
            FieldUpdate::Currency(_) => "currency",
            FieldUpdate::Negotiable(_) => "negotiable",
            FieldUpdate::Description(_) => "description",
            FieldUpdate::Image(_) => "image",
        }
    }
}

impl DraftRecord {
    /// Apply one field mutation
    ///
    /// Rejected values leave the record unchanged.
    pub fn apply(&mut self, update: FieldUpdate) -> Result<()> {
        match update {
            FieldUpdate::Title(title) => self.title = title,
            FieldUpdate::ListingType(listing_type) => self.listing_type = listing_type,
            FieldUpdate::Date(date) => self.date = date,
            FieldUpdate::StartTime(time) => {
                self.start_time = time.and_then(|time| time.with_nanosecond(0));
            }
            FieldUpdate::Location(location) => self.location = location,
            FieldUpdate::Coordinates { lat, lng } => {
                if let Some(lat) = lat {
                    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                        return Err(Error::InvalidInput(format!("latitude out of range: {}", lat)));
                    }
                }
                if let Some(lng) = lng {
                    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                        return Err(Error::InvalidInput(format!("longitude out of range: {}", lng)));
                    }
                }
                self.lat = lat;
                self.lng = lng;
            }
            FieldUpdate::ArtistTypes(tags) => {
                let mut cleaned = BTreeSet::new();
                for tag in tags {
                    cleaned.insert(normalize_tag(&tag)?);
                }
                self.artist_type = cleaned;
            }
            FieldUpdate::ToggleArtistType(tag) => {
                let tag = normalize_tag(&tag)?;
                if !self.artist_type.remove(&tag) {
                    self.artist_type.insert(tag);
                }
            }
            FieldUpdate::Budget(budget) => {
                if let Some(amount) = budget {
                    if !amount.is_finite() || amount < 0.0 {
                        return Err(Error::InvalidInput(format!(
                            "budget must be a non-negative number, got {}",
                            amount
                        )));
                    }
                }
                self.budget = budget;
            }
            FieldUpdate::Currency(currency) => self.currency = currency,
            FieldUpdate::Negotiable(negotiable) => self.negotiable = negotiable,
            FieldUpdate::Description(description) => self.description = description,
            FieldUpdate::Image(image) => {
                self.image = image.filter(|value| !value.trim().is_empty());
            }
        }
        Ok(())
    }

    /// Step 1 gate: title, type, date and location present
    pub fn details_complete(&self) -> bool {
        !self.title.trim().is_empty()
            && self.listing_type.is_some()
            && self.date.is_some()
            && !self.location.trim().is_empty()
    }

    /// Step 2 gate: at least one artist type, positive budget, long enough description
    pub fn requirements_complete(&self) -> bool {
        !self.artist_type.is_empty()
            && self.budget.map_or(false, |budget| budget > 0.0)
            && self.description.trim().chars().count() >= MIN_DESCRIPTION_LEN
    }

    /// Gate for leaving `step` forward; the review step has none
    pub fn is_step_valid(&self, step: WizardStep) -> bool {
        match step {
            WizardStep::Details => self.details_complete(),
            WizardStep::Requirements => self.requirements_complete(),
            WizardStep::Review => true,
        }
    }

    /// First gated step whose predicate fails, if any
    pub fn first_incomplete_step(&self) -> Option<WizardStep> {
        WizardStep::ALL
            .into_iter()
            .find(|step| !self.is_step_valid(*step))
    }

    /// Combined date and start time, as shown on the review step
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        self.date
            .map(|date| date.and_time(self.start_time.unwrap_or_else(default_start_time)))
    }
}

fn normalize_tag(tag: &str) -> Result<String> {
    let tag = tag.trim();
    if tag.is_empty() {
        return Err(Error::InvalidInput("artist type tag must not be empty".to_string()));
    }
    Ok(tag.to_string())
}

/// `HH:MM` serde format for optional times of day
///
/// Accepts `HH:MM:SS` on input as well, and writes seconds back out when
/// they are non-zero.
mod hh_mm {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";
    const FORMAT_WITH_SECONDS: &str = "%H:%M:%S";

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(time) => {
                let format = if time.second() == 0 { FORMAT } else { FORMAT_WITH_SECONDS };
                serializer.serialize_some(&time.format(format).to_string())
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => NaiveTime::parse_from_str(value, FORMAT)
                .or_else(|_| NaiveTime::parse_from_str(value, FORMAT_WITH_SECONDS))
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
