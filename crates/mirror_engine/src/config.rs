use std::path::PathBuf;

use url::Url;

use crate::fetch::FetchSettings;
use crate::retry::RetryPolicy;

pub const DEFAULT_EXTENSIONS: &[&str] = &[".mp3", ".m4a", ".png", ".jpg", ".jpeg"];

/// Everything one run needs, passed explicitly to each component at
/// construction. No global session state.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Remote listing root; should end with a trailing slash so relative
    /// hrefs resolve under it.
    pub root_url: Url,
    /// Root of the version-controlled tree the mirror lives in. Batch
    /// paths are kept relative to this directory.
    pub work_dir: PathBuf,
    /// Subdirectory of `work_dir` holding the mirrored artifacts.
    pub mirror_dir: String,
    /// Path segment splitting remote paths into the local relative part.
    pub marker: String,
    pub manifest_filename: String,
    pub extensions: Vec<String>,
    /// Successful downloads per flush.
    pub batch_size: usize,
    /// Files with a known size above this many bytes are skipped.
    pub max_file_size: u64,
    pub fetch: FetchSettings,
    pub retry: RetryPolicy,
}

impl MirrorConfig {
    /// Defaults mirroring the common case: the last path segment of the
    /// root URL names both the mirror directory and the marker.
    pub fn new(root_url: Url) -> Self {
        let segment = root_url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).next_back())
            .unwrap_or("mirror")
            .to_string();
        Self {
            root_url,
            work_dir: PathBuf::from("."),
            mirror_dir: segment.clone(),
            marker: segment,
            manifest_filename: "mirror_links.csv".to_string(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            batch_size: 20,
            max_file_size: 50 * 1024 * 1024,
            fetch: FetchSettings::default(),
            retry: RetryPolicy::default(),
        }
    }

    /// Absolute (or work-dir-relative) location of the mirror root on disk.
    pub fn mirror_root(&self) -> PathBuf {
        self.work_dir.join(&self.mirror_dir)
    }
}
