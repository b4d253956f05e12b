use async_trait::async_trait;
use chrono::Utc;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::PathBuf;
use thiserror::Error;
use tokio::fs;
use url::Url;

use crate::{util::random_string, PrimaryKey};

lazy_static! {
    static ref EXTENSION: Regex = Regex::new(r"^[a-zA-Z0-9]{1,8}$").unwrap();
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Unsupported file extension")]
    InvalidExtension,
    #[error("Failed to store file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to build public url: {0}")]
    Url(String),
}

/// Stores event poster images and hands back publicly resolvable urls
#[async_trait]
pub trait PosterStore: Send + Sync {
    /// Stores the bytes under a per-society prefix with a generated file
    /// name, returning the public url of the stored poster
    async fn store(
        &self,
        society_id: PrimaryKey,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError>;
}

/// Posters on local disk, served from a public base url
pub struct DiskPosterStore {
    root: PathBuf,
    public_base: Url,
}

impl DiskPosterStore {
    /// The base url is expected to end with a slash, e.g.
    /// `http://localhost:9070/posters/`
    pub fn new(root: impl Into<PathBuf>, public_base: Url) -> Self {
        Self {
            root: root.into(),
            public_base,
        }
    }

    /// The directory posters are stored under, for serving them
    pub fn root(&self) -> &std::path::Path {
        &self.root
    }
}

#[async_trait]
impl PosterStore for DiskPosterStore {
    async fn store(
        &self,
        society_id: PrimaryKey,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, StorageError> {
        if !EXTENSION.is_match(extension) {
            return Err(StorageError::InvalidExtension);
        }

        let file_name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            random_string(8),
            extension
        );

        let directory = self.root.join(society_id.to_string());

        fs::create_dir_all(&directory).await?;
        fs::write(directory.join(&file_name), bytes).await?;

        let url = self
            .public_base
            .join(&format!("{society_id}/{file_name}"))
            .map_err(|e| StorageError::Url(e.to_string()))?;

        Ok(url.to_string())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn store() -> DiskPosterStore {
        let root = std::env::temp_dir().join(format!("campushub-posters-{}", random_string(8)));
        let base = Url::parse("http://localhost:9070/posters/").unwrap();

        DiskPosterStore::new(root, base)
    }

    #[tokio::test]
    async fn stores_posters_under_the_society_prefix() {
        let store = store();

        let url = store.store(7, "png", b"not really a png").await.unwrap();

        assert!(url.starts_with("http://localhost:9050/posters/7/"));
        assert!(url.ends_with(".png"));
    }

    #[tokio::test]
    async fn refuses_suspicious_extensions() {
        let store = store();

        let result = store.store(7, "../../etc", b"nope").await;
        assert!(matches!(result, Err(StorageError::InvalidExtension)));
    }
}
