use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use mirror_engine::{ExponentialBackoff, MirrorConfig};
use serde::Deserialize;
use url::Url;

/// On-disk settings in RON format. Only the remote root is required;
/// everything else falls back to the built-in defaults.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    root_url: String,
    work_dir: Option<PathBuf>,
    mirror_dir: Option<String>,
    marker: Option<String>,
    manifest_filename: Option<String>,
    extensions: Option<Vec<String>>,
    batch_size: Option<usize>,
    max_file_size_mb: Option<u64>,
    connect_timeout_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    redirect_limit: Option<usize>,
    user_agent: Option<String>,
    retry_attempts: Option<u32>,
    backoff_base_secs: Option<u64>,
    git_remote: Option<String>,
    git_branch: Option<String>,
}

/// Fully resolved run settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: MirrorConfig,
    pub backoff: ExponentialBackoff,
    pub git_remote: String,
    pub git_branch: Option<String>,
}

pub fn load(path: &Path) -> Result<Settings> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("cannot read settings file {}", path.display()))?;
    let file: SettingsFile = ron::from_str(&content)
        .with_context(|| format!("cannot parse settings file {}", path.display()))?;
    resolve(file)
}

fn resolve(file: SettingsFile) -> Result<Settings> {
    let root_url = Url::parse(&file.root_url)
        .with_context(|| format!("invalid root_url {:?}", file.root_url))?;
    let mut config = MirrorConfig::new(root_url);

    if let Some(work_dir) = file.work_dir {
        config.work_dir = work_dir;
    }
    if let Some(mirror_dir) = file.mirror_dir {
        // When only the directory is overridden, the marker follows it.
        if file.marker.is_none() {
            config.marker = mirror_dir.clone();
        }
        config.mirror_dir = mirror_dir;
    }
    if let Some(marker) = file.marker {
        config.marker = marker;
    }
    if let Some(manifest_filename) = file.manifest_filename {
        config.manifest_filename = manifest_filename;
    }
    if let Some(extensions) = file.extensions {
        config.extensions = extensions;
    }
    if let Some(batch_size) = file.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(max_mb) = file.max_file_size_mb {
        config.max_file_size = max_mb * 1024 * 1024;
    }
    if let Some(secs) = file.connect_timeout_secs {
        config.fetch.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = file.request_timeout_secs {
        config.fetch.request_timeout = Duration::from_secs(secs);
    }
    if let Some(limit) = file.redirect_limit {
        config.fetch.redirect_limit = limit;
    }
    if let Some(user_agent) = file.user_agent {
        config.fetch.user_agent = user_agent;
    }
    if let Some(attempts) = file.retry_attempts {
        config.retry.max_attempts = attempts;
    }

    let backoff = ExponentialBackoff {
        base: Duration::from_secs(file.backoff_base_secs.unwrap_or(1)),
    };

    Ok(Settings {
        config,
        backoff,
        git_remote: file.git_remote.unwrap_or_else(|| "origin".to_string()),
        git_branch: file.git_branch,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn load_str(content: &str) -> Result<Settings> {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        load(file.path())
    }

    #[test]
    fn minimal_settings_take_defaults_from_the_root_url() {
        let settings = load_str(r#"(root_url: "https://host.example/apps_audio/")"#).unwrap();

        assert_eq!(settings.config.mirror_dir, "apps_audio");
        assert_eq!(settings.config.marker, "apps_audio");
        assert_eq!(settings.config.batch_size, 20);
        assert_eq!(settings.config.max_file_size, 50 * 1024 * 1024);
        assert_eq!(settings.git_remote, "origin");
        assert_eq!(settings.git_branch, None);
    }

    #[test]
    fn overrides_are_applied() {
        let settings = load_str(
            r#"(
                root_url: "https://host.example/apps_audio/",
                mirror_dir: Some("music"),
                batch_size: Some(5),
                max_file_size_mb: Some(10),
                retry_attempts: Some(7),
                git_branch: Some("main"),
            )"#,
        )
        .unwrap();

        assert_eq!(settings.config.mirror_dir, "music");
        // The marker follows an overridden mirror_dir unless set itself.
        assert_eq!(settings.config.marker, "music");
        assert_eq!(settings.config.batch_size, 5);
        assert_eq!(settings.config.max_file_size, 10 * 1024 * 1024);
        assert_eq!(settings.config.retry.max_attempts, 7);
        assert_eq!(settings.git_branch, Some("main".to_string()));
    }

    #[test]
    fn invalid_root_url_is_rejected() {
        assert!(load_str(r#"(root_url: "not a url")"#).is_err());
    }
}
