use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use sha1::{Digest, Sha1};
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::core::error::{InstallerError, InstallerResult};
use crate::core::http::build_http_client;

/// Transport collaborator the pipeline depends on. Retry/backoff lives
/// behind this seam; tests substitute canned responses.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Download `url` into `dest`, creating parent directories.
    async fn fetch_file(&self, url: &str, dest: &Path) -> InstallerResult<()>;

    /// Fetch a small text/JSON document into memory.
    async fn fetch_text(&self, url: &str) -> InstallerResult<String>;
}

/// SHA-1 validating HTTP downloader.
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> InstallerResult<Self> {
        let client = build_http_client()?;
        Ok(Self { client })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Download a single file to `dest`, optionally validating SHA-1.
    ///
    /// Creates parent directories as needed. Drops the file handle
    /// immediately after writing to avoid Windows OS Error 5.
    pub async fn download_file(
        &self,
        url: &str,
        dest: &Path,
        sha1_expected: Option<&str>,
    ) -> InstallerResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallerError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        // Validate SHA-1 before writing (compute on the in-memory buffer)
        if let Some(expected) = sha1_expected {
            let mut hasher = Sha1::new();
            hasher.update(&bytes);
            let actual = hex::encode(hasher.finalize());
            if actual != expected {
                return Err(InstallerError::Sha1Mismatch {
                    path: dest.to_path_buf(),
                    expected: expected.to_string(),
                    actual,
                });
            }
        }

        // Write inside a block to ensure the handle is dropped immediately
        {
            let mut file =
                tokio::fs::File::create(dest)
                    .await
                    .map_err(|e| InstallerError::Io {
                        path: dest.to_path_buf(),
                        source: e,
                    })?;
            file.write_all(&bytes)
                .await
                .map_err(|e| InstallerError::Io {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            file.flush().await.map_err(|e| InstallerError::Io {
                path: dest.to_path_buf(),
                source: e,
            })?;
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }

    /// Validate an existing file's SHA-1.
    pub async fn validate_sha1(path: &Path, expected: &str) -> InstallerResult<bool> {
        let bytes = tokio::fs::read(path).await.map_err(|e| InstallerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut hasher = Sha1::new();
        hasher.update(&bytes);
        let actual = hex::encode(hasher.finalize());
        Ok(actual == expected)
    }
}

#[async_trait]
impl Fetch for Downloader {
    async fn fetch_file(&self, url: &str, dest: &Path) -> InstallerResult<()> {
        self.download_file(url, dest, None).await
    }

    async fn fetch_text(&self, url: &str) -> InstallerResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(InstallerError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
