use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use log::debug;
use reqwest::Client;

use crate::error::SeedError;
use crate::logic::content_type::content_type_for;
use crate::model::generate_id;
use crate::store::traits::BlobStore;

/// Moves one image from a source URL into the blob store and hands back the
/// durable view URL a menu row can reference.
#[async_trait::async_trait]
pub trait AssetIngest: Send + Sync {
    async fn ingest(&self, source_url: &str) -> Result<String, SeedError>;
}

pub struct AssetIngestor {
    http: Client,
    blobs: Arc<dyn BlobStore>,
    staging_dir: PathBuf,
}

impl AssetIngestor {
    /// `staging_dir` defaults to a crate-named directory under the system
    /// temp dir. Staged files are left behind; temp-space lifecycle belongs
    /// to the environment, not this component.
    pub fn new(blobs: Arc<dyn BlobStore>, staging_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let staging_dir =
            staging_dir.unwrap_or_else(|| std::env::temp_dir().join("menu-seeder"));
        std::fs::create_dir_all(&staging_dir)?;
        Ok(Self {
            http: Client::new(),
            blobs,
            staging_dir,
        })
    }

    fn download_error(url: &str, reason: impl ToString) -> SeedError {
        SeedError::Download {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Last path segment of the URL, query/fragment stripped. URLs with no
/// usable segment get a timestamped name so staged files never collide.
pub fn staging_file_name(source_url: &str) -> String {
    let path = source_url.split(['?', '#']).next().unwrap_or(source_url);
    match path.rsplit('/').next() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("file-{}.jpg", Utc::now().timestamp_millis()),
    }
}

#[async_trait::async_trait]
impl AssetIngest for AssetIngestor {
    async fn ingest(&self, source_url: &str) -> Result<String, SeedError> {
        let file_name = staging_file_name(source_url);

        let response = self
            .http
            .get(source_url)
            .send()
            .await
            .map_err(|e| Self::download_error(source_url, e))?;
        if !response.status().is_success() {
            return Err(Self::download_error(
                source_url,
                format!("unexpected status {}", response.status()),
            ));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| Self::download_error(source_url, e))?;
        if bytes.is_empty() {
            return Err(Self::download_error(source_url, "downloaded file is empty"));
        }

        let staged = self.staging_dir.join(&file_name);
        tokio::fs::write(&staged, &bytes)
            .await
            .map_err(|e| Self::download_error(source_url, format!("staging failed: {e}")))?;
        debug!("staged {} ({} bytes) at {}", file_name, bytes.len(), staged.display());

        let content_type = content_type_for(&file_name);
        let blob = self
            .blobs
            .create_blob(&generate_id(), &file_name, bytes.to_vec(), content_type)
            .await
            .map_err(|source| SeedError::Upload {
                file_name: file_name.clone(),
                source,
            })?;

        Ok(self.blobs.view_url(&blob.id))
    }
}
