//! Object storage uploaders

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = "Gigboard/0.1.0";

/// Upload failures
#[derive(Debug, Error)]
pub enum UploadError {
    /// Inline image could not be decoded
    #[error("Malformed inline image: {0}")]
    MalformedInline(String),

    /// Storage path rejected before upload
    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Object store answered with a non-success status
    #[error("Storage error {0}: {1}")]
    Storage(u16, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded upload body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Binary object storage
#[async_trait]
pub trait ObjectUploader: Send + Sync {
    /// Store `object` at `path`, returning its public URL
    async fn upload(&self, object: BinaryObject, path: &str) -> Result<String, UploadError>;
}

/// Relative, forward-only path: no root, no `..`
fn validated_relative_path(path: &str) -> Result<PathBuf, UploadError> {
    let candidate = Path::new(path);
    if path.is_empty()
        || !candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)))
    {
        return Err(UploadError::InvalidPath(path.to_string()));
    }
    Ok(candidate.to_path_buf())
}

fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Writes objects below a local directory served by the wizard service
#[derive(Debug, Clone)]
pub struct FsObjectUploader {
    root: PathBuf,
    public_base_url: String,
}

impl FsObjectUploader {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectUploader for FsObjectUploader {
    async fn upload(&self, object: BinaryObject, path: &str) -> Result<String, UploadError> {
        let relative = validated_relative_path(path)?;
        let target = self.root.join(&relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, &object.bytes).await?;

        debug!(
            path = %target.display(),
            bytes = object.bytes.len(),
            content_type = %object.content_type,
            "Stored object on disk"
        );
        Ok(join_url(&self.public_base_url, path))
    }
}

/// Uploads objects with HTTP PUT to a remote object store
pub struct HttpObjectUploader {
    http_client: reqwest::Client,
    endpoint: String,
    public_base_url: String,
}

impl HttpObjectUploader {
    pub fn new(
        endpoint: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Result<Self, UploadError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| UploadError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
            public_base_url: public_base_url.into(),
        })
    }
}

#[async_trait]
impl ObjectUploader for HttpObjectUploader {
    async fn upload(&self, object: BinaryObject, path: &str) -> Result<String, UploadError> {
        validated_relative_path(path)?;
        let url = join_url(&self.endpoint, path);

        let response = self
            .http_client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, object.content_type)
            .body(object.bytes)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Storage(status.as_u16(), body));
        }

        debug!(url = %url, "Uploaded object");
        Ok(join_url(&self.public_base_url, path))
    }
}
