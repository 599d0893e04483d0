//! Mirror binary: load settings, run the crawl-download-commit pipeline
//! once, and print the run report.
mod logging;
mod settings;

use std::path::Path;

use anyhow::{Context, Result};
use mirror_engine::GitCli;
use mirror_logging::{mirror_info, mirror_warn};

const DEFAULT_SETTINGS_FILE: &str = "mirror.ron";

fn main() -> Result<()> {
    logging::initialize();

    let settings_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let settings = settings::load(Path::new(&settings_path))?;
    mirror_info!(
        "mirroring {} into {:?}",
        settings.config.root_url,
        settings.config.mirror_root()
    );

    let adapter = GitCli::new(
        settings.config.work_dir.clone(),
        settings.git_remote.clone(),
        settings.git_branch.clone(),
    );

    let runtime = tokio::runtime::Runtime::new().context("cannot start async runtime")?;
    let report = runtime
        .block_on(mirror_engine::run(&settings.config, &adapter, &settings.backoff))
        .context("mirror run aborted")?;

    if report.failed > 0 || report.failed_batches() > 0 {
        mirror_warn!(
            "run finished with {} failed downloads and {} failed batches",
            report.failed,
            report.failed_batches()
        );
    }
    print!("{report}");
    Ok(())
}
