use std::path::PathBuf;

use mirror_core::{Batch, BatchCoordinator, DownloadOutcome, ExtensionFilter, PathMapper, RunReport};
use mirror_logging::{mirror_error, mirror_info, mirror_warn};
use thiserror::Error;

use crate::config::MirrorConfig;
use crate::download::Downloader;
use crate::fetch::RemoteClient;
use crate::manifest::{self, ManifestSettings};
use crate::persist::{ensure_mirror_dir, PersistError};
use crate::retry::Delay;
use crate::sync::{flush_batch, SyncAdapter};
use crate::types::FetchError;
use crate::walk::CrawlSession;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot prepare mirror root: {0}")]
    MirrorRoot(#[from] PersistError),
    #[error("cannot build http client: {0}")]
    Client(FetchError),
}

/// One complete mirror run, strictly sequential: walk the remote listing
/// tree, download each candidate in turn, flush full batches as they fill,
/// flush the trailing batch, then regenerate and sync the manifest.
///
/// Per-candidate and per-batch failures are absorbed into the report; only
/// an unusable mirror root or HTTP client aborts the run.
pub async fn run(
    config: &MirrorConfig,
    adapter: &dyn SyncAdapter,
    delay: &dyn Delay,
) -> Result<RunReport, RunError> {
    ensure_mirror_dir(&config.mirror_root())?;
    let client = RemoteClient::new(&config.fetch).map_err(RunError::Client)?;
    let filter = ExtensionFilter::new(&config.extensions);
    let mapper = PathMapper::new(&config.marker);

    let mut report = RunReport::default();

    let walk = CrawlSession::new(config.root_url.clone())
        .walk(&client, &filter)
        .await;
    report.directories_listed = walk.directories_listed;
    report.candidates = walk.candidates.len();
    mirror_info!(
        "discovered {} candidate files across {} directories",
        report.candidates,
        report.directories_listed
    );

    let downloader = Downloader::new(&client, config.max_file_size, config.retry, delay);
    let mut coordinator = BatchCoordinator::new(config.batch_size);

    for url in &walk.candidates {
        let mapped = mapper.map(url);
        if mapped.flattened {
            mirror_warn!(
                "no {:?} marker in {url}; flattening to {}",
                config.marker,
                mapped.relative.display()
            );
        }
        let dest_rel = PathBuf::from(&config.mirror_dir).join(&mapped.relative);
        let dest = config.work_dir.join(&dest_rel);

        let outcome = downloader.download(url, &dest).await;
        report.record_outcome(outcome);
        if outcome == DownloadOutcome::Downloaded {
            if let Some(batch) = coordinator.ingest(dest_rel) {
                flush_and_record(adapter, &mut report, batch).await;
            }
        }
    }

    if let Some(batch) = coordinator.finish() {
        flush_and_record(adapter, &mut report, batch).await;
    }

    sync_manifest(config, adapter, &filter, &mut report).await;

    Ok(report)
}

async fn flush_and_record(adapter: &dyn SyncAdapter, report: &mut RunReport, batch: Batch) {
    let message = format!("Update mirrored files (batch {})", batch.number);
    let path_count = batch.len();
    let outcome = flush_batch(adapter, &batch.paths, &message).await;
    report.record_batch(format!("batch {}", batch.number), path_count, outcome);
}

/// The manifest is regenerated in full on every run; any resulting change
/// is flushed as its own labelled batch. Nothing here is fatal: a run that
/// mirrored files but cannot sync its manifest still reports them.
async fn sync_manifest(
    config: &MirrorConfig,
    adapter: &dyn SyncAdapter,
    filter: &ExtensionFilter,
    report: &mut RunReport,
) {
    let fullname = match adapter.remote_url().await {
        Ok(url) => manifest::repo_fullname(&url),
        Err(err) => {
            mirror_warn!("cannot resolve sync remote url: {err}");
            manifest::UNKNOWN_FULLNAME.to_string()
        }
    };

    let settings = ManifestSettings {
        filename: config.manifest_filename.clone(),
        mirror_dir: config.mirror_dir.clone(),
        base_url: config.root_url.clone(),
    };
    match manifest::generate_manifest(
        &config.mirror_root(),
        &fullname,
        &settings,
        filter,
        &config.work_dir,
    ) {
        Ok(path) => mirror_info!("wrote manifest {}", path.display()),
        Err(err) => {
            mirror_error!("manifest generation failed: {err}");
            return;
        }
    }

    let manifest_path = PathBuf::from(&config.manifest_filename);
    let changed = match adapter.changed_files(&[manifest_path]).await {
        Ok(changed) => changed,
        Err(err) => {
            mirror_warn!("cannot check manifest for changes: {err}");
            return;
        }
    };
    if changed.is_empty() {
        mirror_info!("manifest unchanged");
        return;
    }

    let path_count = changed.len();
    let outcome = flush_batch(adapter, &changed, "Update mirror manifest").await;
    report.record_batch("manifest", path_count, outcome);
}
