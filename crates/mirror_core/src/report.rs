use std::fmt;

/// Why a candidate was skipped without any transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Known remote size exceeds the configured maximum.
    TooLarge,
    /// Known remote size equals the existing local artifact's size.
    SameSize,
}

/// Per-candidate result of the incremental downloader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadOutcome {
    Downloaded,
    Skipped(SkipReason),
    /// All retry attempts exhausted. The stable destination path is left
    /// untouched.
    Failed,
}

/// Per-batch result of a sync flush. Local artifacts are never rolled back
/// on failure; a committed-but-unpushed batch is surfaced here and in the
/// log, nothing more.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    Pushed,
    /// The working tree already matched; the flush was a no-op.
    NothingToCommit,
    StageFailed(String),
    PushFailed(String),
}

/// One flushed batch as it appears in the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRecord {
    /// Human-readable flush label, e.g. `"batch 3"` or `"manifest"`.
    pub label: String,
    pub path_count: usize,
    pub outcome: SyncOutcome,
}

/// Aggregate result of one mirror run. This, not an error trace, is the
/// user-visible output: the run always attempts every candidate and every
/// batch, accumulating what happened here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    pub directories_listed: usize,
    pub candidates: usize,
    pub downloaded: usize,
    pub skipped_same_size: usize,
    pub skipped_too_large: usize,
    pub failed: usize,
    pub batches: Vec<BatchRecord>,
}

impl RunReport {
    pub fn record_outcome(&mut self, outcome: DownloadOutcome) {
        match outcome {
            DownloadOutcome::Downloaded => self.downloaded += 1,
            DownloadOutcome::Skipped(SkipReason::SameSize) => self.skipped_same_size += 1,
            DownloadOutcome::Skipped(SkipReason::TooLarge) => self.skipped_too_large += 1,
            DownloadOutcome::Failed => self.failed += 1,
        }
    }

    pub fn record_batch(&mut self, label: impl Into<String>, path_count: usize, outcome: SyncOutcome) {
        self.batches.push(BatchRecord {
            label: label.into(),
            path_count,
            outcome,
        });
    }

    pub fn failed_batches(&self) -> usize {
        self.batches
            .iter()
            .filter(|batch| {
                matches!(
                    batch.outcome,
                    SyncOutcome::StageFailed(_) | SyncOutcome::PushFailed(_)
                )
            })
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "listed {} directories, {} candidates",
            self.directories_listed, self.candidates
        )?;
        writeln!(
            f,
            "downloaded {}, skipped {} (same size), skipped {} (too large), failed {}",
            self.downloaded, self.skipped_same_size, self.skipped_too_large, self.failed
        )?;
        for batch in &self.batches {
            let outcome = match &batch.outcome {
                SyncOutcome::Pushed => "pushed".to_string(),
                SyncOutcome::NothingToCommit => "nothing to commit".to_string(),
                SyncOutcome::StageFailed(err) => format!("stage failed: {err}"),
                SyncOutcome::PushFailed(err) => format!("push failed: {err}"),
            };
            writeln!(f, "{} ({} paths): {}", batch.label, batch.path_count, outcome)?;
        }
        Ok(())
    }
}
