//! Listing documents in SQLite
//!
//! Listings are stored as JSON documents in the generic `documents` table
//! under the `events` collection.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::models::{CreateListingPayload, ListingId};
use crate::publish::{CreationError, ListingCreator};

/// Document collection holding published listings
pub const LISTINGS_COLLECTION: &str = "events";

/// Stored listing document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDocument {
    pub id: ListingId,
    #[serde(flatten)]
    pub listing: CreateListingPayload,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// SQLite-backed listing creator
#[derive(Debug, Clone)]
pub struct SqliteListingCreator {
    db: SqlitePool,
}

impl SqliteListingCreator {
    /// The pool must come from `gigboard_common::db::init_database`
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Load a stored listing
    pub async fn fetch(&self, id: &ListingId) -> Result<Option<ListingDocument>, CreationError> {
        let body: Option<String> =
            sqlx::query_scalar("SELECT body FROM documents WHERE collection = ? AND id = ?")
                .bind(LISTINGS_COLLECTION)
                .bind(id.as_str())
                .fetch_optional(&self.db)
                .await?;

        match body {
            Some(body) => Ok(Some(serde_json::from_str(&body)?)),
            None => Ok(None),
        }
    }

    /// Number of stored listings
    pub async fn count(&self) -> Result<i64, CreationError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?")
            .bind(LISTINGS_COLLECTION)
            .fetch_one(&self.db)
            .await?;
        Ok(count)
    }
}

fn validate(payload: &CreateListingPayload) -> Result<(), CreationError> {
    if payload.title.trim().is_empty() {
        return Err(CreationError::Validation("title must not be empty".to_string()));
    }
    if !payload.price.is_finite() || payload.price < 0.0 {
        return Err(CreationError::Validation(format!(
            "price must be non-negative, got {}",
            payload.price
        )));
    }
    if payload.organizer_id.trim().is_empty() {
        return Err(CreationError::Validation("organizer id must not be empty".to_string()));
    }
    Ok(())
}

#[async_trait]
impl ListingCreator for SqliteListingCreator {
    async fn create(&self, payload: &CreateListingPayload) -> Result<ListingId, CreationError> {
        validate(payload)?;

        let document = ListingDocument {
            id: ListingId(format!("evt_{}", Uuid::new_v4().simple())),
            listing: payload.clone(),
            created_at: chrono::Utc::now(),
        };
        let body = serde_json::to_string(&document)?;

        sqlx::query("INSERT INTO documents (collection, id, body, created_at) VALUES (?, ?, ?, ?)")
            .bind(LISTINGS_COLLECTION)
            .bind(document.id.as_str())
            .bind(&body)
            .bind(document.created_at)
            .execute(&self.db)
            .await?;

        info!(listing_id = %document.id, title = %payload.title, "Created listing document");
        Ok(document.id)
    }
}
