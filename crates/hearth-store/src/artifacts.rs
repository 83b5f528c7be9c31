//! Artifact storage: screenshot and report uploads.
//!
//! Uploads never upsert. Names carry a timestamp plus a random suffix so a
//! retried task writes a fresh object instead of colliding with a partial
//! one from an earlier attempt.

use crate::error::{Result, StoreError};
use async_trait::async_trait;
use hearth_core::StoreConfig;
use reqwest::Client;
use std::time::Duration;

/// Capability interface over the artifact storage service.
#[async_trait]
pub trait ArtifactStorage: Send + Sync {
    /// Upload `bytes` under `bucket/name`. Fails if the name exists.
    async fn upload(&self, bucket: &str, name: &str, bytes: Vec<u8>, content_type: &str)
        -> Result<()>;

    /// Public URL an uploaded artifact is served from.
    fn public_url(&self, bucket: &str, name: &str) -> String;
}

/// Generate a collision-resistant artifact name.
///
/// `prefix` describes the artifact, `extension` includes the dot.
#[must_use]
pub fn artifact_name(prefix: &str, extension: &str) -> String {
    let stamp = chrono::Utc::now().format("%Y-%m-%dT%H-%M-%S-%3f");
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{prefix}_{stamp}_{}{extension}", &suffix[..8])
}

/// HTTP client for the storage service.
pub struct RestArtifactStorage {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestArtifactStorage {
    /// Create a client from store configuration.
    pub fn new(config: &StoreConfig) -> Result<Self> {
        url::Url::parse(&config.url)
            .map_err(|e| StoreError::InvalidUrl(format!("{}: {e}", config.url)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| StoreError::Internal(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }
}

#[async_trait]
impl ArtifactStorage for RestArtifactStorage {
    async fn upload(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        let url = format!("{}/storage/v1/object/{bucket}/{name}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("content-type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(bucket, name, "artifact uploaded");
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StoreError::Upload(format!(
                "{bucket}/{name} rejected ({status}): {message}"
            )))
        }
    }

    fn public_url(&self, bucket: &str, name: &str) -> String {
        format!("{}/storage/v1/object/public/{bucket}/{name}", self.base_url)
    }
}
