use std::path::{Path, PathBuf};

use mirror_core::{DownloadOutcome, SkipReason};
use mirror_logging::{mirror_debug, mirror_info, mirror_warn};
use url::Url;

use crate::fetch::RemoteClient;
use crate::retry::{Delay, RetryPolicy};
use crate::types::{FailureKind, FetchError};

/// Decides whether a remote file needs fetching, then streams it to a
/// temporary sibling and installs it atomically. Side effects are confined
/// to the destination path's subtree.
pub struct Downloader<'a> {
    client: &'a RemoteClient,
    max_file_size: u64,
    retry: RetryPolicy,
    delay: &'a dyn Delay,
}

impl<'a> Downloader<'a> {
    pub fn new(
        client: &'a RemoteClient,
        max_file_size: u64,
        retry: RetryPolicy,
        delay: &'a dyn Delay,
    ) -> Self {
        Self {
            client,
            max_file_size,
            retry,
            delay,
        }
    }

    /// Decision order: size-gate, same-size skip, then transfer with retry
    /// and backoff. An unknown remote size is permissive: it can neither
    /// size-gate nor justify a skip, so the transfer is always attempted.
    pub async fn download(&self, url: &Url, dest: &Path) -> DownloadOutcome {
        let remote_size = self.client.remote_size(url).await;

        if let Some(size) = remote_size {
            if size > self.max_file_size {
                mirror_info!("skipping {url}: {size} bytes exceeds the configured maximum");
                return DownloadOutcome::Skipped(SkipReason::TooLarge);
            }
        }

        if let Some(remote) = remote_size {
            if let Ok(meta) = tokio::fs::metadata(dest).await {
                if meta.is_file() && meta.len() == remote {
                    mirror_debug!("skipping {}: same size as remote", dest.display());
                    return DownloadOutcome::Skipped(SkipReason::SameSize);
                }
            }
        }

        let tmp = part_path(dest);
        for attempt in 0..self.retry.max_attempts {
            if attempt > 0 {
                self.delay.wait(attempt - 1).await;
            }
            match self.transfer(url, dest, &tmp).await {
                Ok(bytes) => {
                    mirror_info!("downloaded {} ({bytes} bytes)", dest.display());
                    return DownloadOutcome::Downloaded;
                }
                Err(err) => {
                    mirror_warn!("download attempt {} failed for {url}: {err}", attempt + 1);
                }
            }
        }

        // The stable path is never touched by a failed run; only the
        // abandoned temporary needs cleaning up.
        let _ = tokio::fs::remove_file(&tmp).await;
        mirror_warn!(
            "giving up on {url} after {} attempts",
            self.retry.max_attempts
        );
        DownloadOutcome::Failed
    }

    async fn transfer(&self, url: &Url, dest: &Path, tmp: &Path) -> Result<u64, FetchError> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
            }
        }
        let bytes = self.client.fetch_to_file(url, tmp).await?;
        tokio::fs::rename(tmp, dest)
            .await
            .map_err(|err| FetchError::new(FailureKind::Io, err.to_string()))?;
        Ok(bytes)
    }
}

/// Temporary sibling of the destination, promoted only on full success.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_else(|| "download".into());
    name.push(".part");
    dest.with_file_name(name)
}
