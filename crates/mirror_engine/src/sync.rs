use std::path::PathBuf;

use async_trait::async_trait;
use mirror_core::SyncOutcome;
use mirror_logging::{mirror_debug, mirror_info, mirror_warn};
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("`git {command}` exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),
}

/// What `commit` did with the staged batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStatus {
    Committed,
    /// The working tree already matched HEAD for these paths.
    NothingToCommit,
}

/// Boundary to the version-control system.
///
/// The core never retries or rolls back through this interface: each call's
/// result is reported and the run moves on, so an in-memory fake can stand
/// in for the real CLI in tests.
#[async_trait]
pub trait SyncAdapter: Send + Sync {
    async fn stage(&self, paths: &[PathBuf]) -> Result<(), SyncError>;
    async fn commit(&self, message: &str) -> Result<CommitStatus, SyncError>;
    async fn unstage(&self, paths: &[PathBuf]) -> Result<(), SyncError>;
    async fn push(&self) -> Result<(), SyncError>;
    /// Changed or untracked files among `paths`, relative to the repo root.
    async fn changed_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, SyncError>;
    /// URL of the configured push remote.
    async fn remote_url(&self) -> Result<String, SyncError>;
}

/// Stage, commit, and push one batch.
///
/// "Nothing to commit" unstages the batch and reports a no-op, not a
/// failure. A push failure leaves the commit local, surfaced only in the
/// outcome. A commit that cannot even run aborts the flush the same way a
/// staging failure does.
pub async fn flush_batch(
    adapter: &dyn SyncAdapter,
    paths: &[PathBuf],
    message: &str,
) -> SyncOutcome {
    if let Err(err) = adapter.stage(paths).await {
        mirror_warn!("staging failed for {message:?}: {err}");
        return SyncOutcome::StageFailed(err.to_string());
    }

    match adapter.commit(message).await {
        Ok(CommitStatus::Committed) => {}
        Ok(CommitStatus::NothingToCommit) => {
            mirror_info!("nothing to commit for {message:?}");
            if let Err(err) = adapter.unstage(paths).await {
                mirror_debug!("unstage after empty commit failed: {err}");
            }
            return SyncOutcome::NothingToCommit;
        }
        Err(err) => {
            mirror_warn!("commit failed for {message:?}: {err}");
            if let Err(err) = adapter.unstage(paths).await {
                mirror_debug!("unstage after failed commit failed: {err}");
            }
            return SyncOutcome::StageFailed(err.to_string());
        }
    }

    match adapter.push().await {
        Ok(()) => {
            mirror_info!("pushed {message:?} ({} paths)", paths.len());
            SyncOutcome::Pushed
        }
        Err(err) => {
            mirror_warn!("push failed for {message:?}: {err}");
            SyncOutcome::PushFailed(err.to_string())
        }
    }
}

/// Sync adapter shelling out to the `git` CLI.
///
/// Exit codes are the sole failure signal; stdout is parsed only for
/// porcelain status paths and the remote URL. With no branch configured,
/// pushes go to `HEAD` (the current branch).
#[derive(Debug, Clone)]
pub struct GitCli {
    repo_root: PathBuf,
    remote: String,
    branch: Option<String>,
}

impl GitCli {
    pub fn new(repo_root: PathBuf, remote: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            repo_root,
            remote: remote.into(),
            branch,
        }
    }

    async fn run(&self, args: &[String]) -> Result<String, SyncError> {
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .output()
            .await?;
        if !output.status.success() {
            return Err(SyncError::CommandFailed {
                command: args.join(" "),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn path_args(paths: &[PathBuf]) -> impl Iterator<Item = String> + '_ {
    paths.iter().map(|path| path.to_string_lossy().into_owned())
}

#[async_trait]
impl SyncAdapter for GitCli {
    async fn stage(&self, paths: &[PathBuf]) -> Result<(), SyncError> {
        let mut args = vec!["add".to_string()];
        args.extend(path_args(paths));
        self.run(&args).await.map(drop)
    }

    async fn commit(&self, message: &str) -> Result<CommitStatus, SyncError> {
        let args = vec!["commit".to_string(), "-m".to_string(), message.to_string()];
        match self.run(&args).await {
            Ok(_) => Ok(CommitStatus::Committed),
            // git exits non-zero when the index is clean; that is the only
            // commit outcome the pipeline distinguishes.
            Err(SyncError::CommandFailed { stderr, .. }) => {
                mirror_debug!("commit reported: {stderr}");
                Ok(CommitStatus::NothingToCommit)
            }
            Err(err) => Err(err),
        }
    }

    async fn unstage(&self, paths: &[PathBuf]) -> Result<(), SyncError> {
        let mut args = vec!["reset".to_string(), "--".to_string()];
        args.extend(path_args(paths));
        self.run(&args).await.map(drop)
    }

    async fn push(&self) -> Result<(), SyncError> {
        let target = self.branch.clone().unwrap_or_else(|| "HEAD".to_string());
        let args = vec!["push".to_string(), self.remote.clone(), target];
        self.run(&args).await.map(drop)
    }

    async fn changed_files(&self, paths: &[PathBuf]) -> Result<Vec<PathBuf>, SyncError> {
        let mut args = vec![
            "status".to_string(),
            "--porcelain".to_string(),
            "--untracked-files=all".to_string(),
            "--".to_string(),
        ];
        args.extend(path_args(paths));
        let stdout = self.run(&args).await?;

        // Porcelain lines are `XY <path>`; keep the path half.
        let files = stdout
            .lines()
            .filter_map(|line| {
                line.trim()
                    .split_once(char::is_whitespace)
                    .map(|(_, path)| PathBuf::from(path.trim()))
            })
            .collect();
        Ok(files)
    }

    async fn remote_url(&self) -> Result<String, SyncError> {
        let args = vec![
            "remote".to_string(),
            "get-url".to_string(),
            self.remote.clone(),
        ];
        self.run(&args).await
    }
}
