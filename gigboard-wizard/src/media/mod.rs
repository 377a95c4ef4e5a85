//! Listing image resolution
//!
//! Turns the draft's `image` field into the final image URL of a listing:
//! - no image: the stock placeholder
//! - hosted URL: used unchanged
//! - inline `data:` URL: decoded and uploaded through an [`ObjectUploader`]
//!
//! A failed upload never fails the publish. The failure is logged, a
//! `MediaUploadDegraded` event is emitted for the UI, and the placeholder is
//! used instead.

pub mod uploader;

use base64::{engine::general_purpose, Engine as _};
use chrono::Utc;
use gigboard_common::events::{EventBus, WizardEvent};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Actor;

pub use uploader::{
    BinaryObject, FsObjectUploader, HttpObjectUploader, ObjectUploader, UploadError,
};

const DATA_URL_PREFIX: &str = "data:";
const DEFAULT_MIME: &str = "application/octet-stream";

/// Final image URL of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaResolution {
    pub url: String,
    /// Why the placeholder was substituted, if an upload was attempted and failed
    pub degraded: Option<String>,
}

impl MediaResolution {
    fn resolved(url: String) -> Self {
        Self { url, degraded: None }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.is_some()
    }
}

/// Image embedded in the draft as a base64 `data:` URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl InlineImage {
    /// Parse `data:<mime>;base64,<payload>`
    pub fn parse(data_url: &str) -> Result<Self, UploadError> {
        let data_url = data_url.trim();
        if !is_inline(data_url) {
            return Err(UploadError::MalformedInline("missing data: prefix".to_string()));
        }
        let rest = &data_url[DATA_URL_PREFIX.len()..];

        let (header, payload) = rest
            .split_once(',')
            .ok_or_else(|| UploadError::MalformedInline("missing payload separator".to_string()))?;

        let mut parts = header.split(';');
        let mime_type = parts
            .next()
            .map(str::trim)
            .filter(|mime| !mime.is_empty())
            .unwrap_or(DEFAULT_MIME)
            .to_ascii_lowercase();

        if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
            return Err(UploadError::MalformedInline(
                "only base64 data URLs are supported".to_string(),
            ));
        }

        let bytes = general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| UploadError::MalformedInline(format!("invalid base64: {}", e)))?;

        if bytes.is_empty() {
            return Err(UploadError::MalformedInline("empty image payload".to_string()));
        }

        Ok(Self { mime_type, bytes })
    }

    /// File extension for the stored object
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "image/png" => "png",
            "image/jpeg" | "image/jpg" => "jpg",
            "image/gif" => "gif",
            "image/webp" => "webp",
            "image/svg+xml" => "svg",
            "image/avif" => "avif",
            _ => "bin",
        }
    }

    pub fn into_object(self) -> BinaryObject {
        BinaryObject {
            content_type: self.mime_type,
            bytes: self.bytes,
        }
    }
}

/// Whether `image` is an inline `data:` URL rather than a hosted URL
pub fn is_inline(image: &str) -> bool {
    image
        .trim_start()
        .get(..DATA_URL_PREFIX.len())
        .map_or(false, |prefix| prefix.eq_ignore_ascii_case(DATA_URL_PREFIX))
}

/// Storage path for an upload: `listings/<actor>/<timestamp-ms>-<uuid>.<ext>`
pub fn storage_path(actor: &Actor, extension: &str) -> String {
    let owner: String = actor
        .id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let owner = if owner.is_empty() { "anonymous".to_string() } else { owner };

    format!(
        "listings/{}/{}-{}.{}",
        owner,
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple(),
        extension
    )
}

/// Resolves draft images to final listing image URLs
#[derive(Clone)]
pub struct MediaResolver {
    uploader: Arc<dyn ObjectUploader>,
    placeholder_url: String,
    event_bus: Option<EventBus>,
}

impl MediaResolver {
    pub fn new(uploader: Arc<dyn ObjectUploader>, placeholder_url: impl Into<String>) -> Self {
        Self {
            uploader,
            placeholder_url: placeholder_url.into(),
            event_bus: None,
        }
    }

    /// Emit `MediaUploadDegraded` on `bus` when falling back to the placeholder
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn placeholder_url(&self) -> &str {
        &self.placeholder_url
    }

    /// Resolve the final image URL; never fails
    pub async fn resolve(&self, image: Option<&str>, actor: &Actor) -> MediaResolution {
        let image = match image.map(str::trim) {
            None | Some("") => return MediaResolution::resolved(self.placeholder_url.clone()),
            Some(image) => image,
        };

        if !is_inline(image) {
            return MediaResolution::resolved(image.to_string());
        }

        match self.upload_inline(image, actor).await {
            Ok(url) => {
                info!(actor_id = %actor.id, url = %url, "Uploaded listing image");
                MediaResolution::resolved(url)
            }
            Err(e) => self.degrade(actor, e),
        }
    }

    async fn upload_inline(&self, data_url: &str, actor: &Actor) -> Result<String, UploadError> {
        let inline = InlineImage::parse(data_url)?;
        let path = storage_path(actor, inline.extension());
        self.uploader.upload(inline.into_object(), &path).await
    }

    fn degrade(&self, actor: &Actor, error: UploadError) -> MediaResolution {
        let reason = error.to_string();
        warn!(
            actor_id = %actor.id,
            error = %reason,
            "Image upload failed, using placeholder image"
        );

        if let Some(bus) = &self.event_bus {
            bus.emit_lossy(WizardEvent::MediaUploadDegraded {
                reason: reason.clone(),
                timestamp: Utc::now(),
            });
        }

        MediaResolution {
            url: self.placeholder_url.clone(),
            degraded: Some(reason),
        }
    }
}
