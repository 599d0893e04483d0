//! Mirror engine: crawl-download-commit pipeline and its IO adapters.
mod config;
mod decode;
mod download;
mod fetch;
mod links;
mod manifest;
mod persist;
mod pipeline;
mod retry;
mod sync;
mod types;
mod walk;

pub use config::{MirrorConfig, DEFAULT_EXTENSIONS};
pub use decode::{decode_listing, DecodedListing};
pub use download::Downloader;
pub use fetch::{FetchSettings, RemoteClient};
pub use links::extract_hrefs;
pub use manifest::{
    generate_manifest, repo_fullname, ManifestError, ManifestSettings, MANIFEST_HEADER,
    UNKNOWN_FULLNAME,
};
pub use persist::{ensure_mirror_dir, AtomicFileWriter, PersistError};
pub use pipeline::{run, RunError};
pub use retry::{Delay, ExponentialBackoff, NoDelay, RetryPolicy};
pub use sync::{flush_batch, CommitStatus, GitCli, SyncAdapter, SyncError};
pub use types::{FailureKind, FetchError};
pub use walk::{CrawlSession, WalkOutcome};
