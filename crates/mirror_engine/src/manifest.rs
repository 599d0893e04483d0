use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use mirror_core::ExtensionFilter;
use url::Url;

use crate::persist::{AtomicFileWriter, PersistError};

pub const MANIFEST_HEADER: &str = "Original URL,Mirror URL,Alternate URL,File Size";

/// Fullname reported when the sync remote cannot be resolved.
pub const UNKNOWN_FULLNAME: &str = "unknown/unknown";

/// Artifacts at or above this size link through the raw host for both URL
/// columns; smaller ones get the repository blob page plus a CDN alternate.
const RAW_THRESHOLD_MB: f64 = 20.0;

const CDN_PREFIX: &str = "https://cdnjs.cloudflare.com/ajax/libs/";

#[derive(Debug, Clone)]
pub struct ManifestSettings {
    pub filename: String,
    /// Repo-relative directory name used when building mirror URLs.
    pub mirror_dir: String,
    /// Remote root the original files live under; must end with a slash.
    pub base_url: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Regenerate the manifest from the local tree, rewritten in full on every
/// run and written atomically into `output_dir`. One sorted row per
/// artifact matching the allow-set, size rendered in megabytes with two
/// decimals.
pub fn generate_manifest(
    mirror_root: &Path,
    repo_fullname: &str,
    settings: &ManifestSettings,
    filter: &ExtensionFilter,
    output_dir: &Path,
) -> Result<PathBuf, ManifestError> {
    let blob_prefix = format!(
        "https://github.com/{repo_fullname}/blob/main/{}/",
        settings.mirror_dir
    );
    let raw_prefix = format!(
        "https://raw.githubusercontent.com/{repo_fullname}/main/{}/",
        settings.mirror_dir
    );

    let mut files = Vec::new();
    collect_files(mirror_root, &mut files)?;

    let mut rows = Vec::new();
    for path in files {
        let rel = match relative_slash_path(mirror_root, &path) {
            Some(rel) => rel,
            None => continue,
        };
        if !filter.matches_path(&rel) {
            continue;
        }
        let size_mb = fs::metadata(&path)?.len() as f64 / (1024.0 * 1024.0);
        let original = format!("{}{rel}", settings.base_url);
        let (mirror, alternate) = if size_mb < RAW_THRESHOLD_MB {
            (format!("{blob_prefix}{rel}"), format!("{CDN_PREFIX}{rel}"))
        } else {
            let raw = format!("{raw_prefix}{rel}");
            (raw.clone(), raw)
        };
        rows.push([original, mirror, alternate, format!("{size_mb:.2} MB")]);
    }
    rows.sort();

    let mut table = String::from(MANIFEST_HEADER);
    table.push('\n');
    for row in &rows {
        let fields: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        table.push_str(&fields.join(","));
        table.push('\n');
    }

    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    Ok(writer.write(&settings.filename, &table)?)
}

/// `owner/repo` from a git remote URL; the ssh and https forms both
/// normalize, a trailing `.git` is dropped, and anything unrecognized is
/// passed through as-is.
pub fn repo_fullname(remote_url: &str) -> String {
    let remote_url = remote_url.trim();
    let path = if let Some(rest) = remote_url.strip_prefix("git@github.com:") {
        rest
    } else if remote_url.starts_with("https://") || remote_url.starts_with("http://") {
        remote_url
            .split_once("github.com/")
            .map(|(_, rest)| rest)
            .unwrap_or(remote_url)
    } else {
        remote_url
    };
    path.strip_suffix(".git").unwrap_or(path).to_string()
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

/// Path relative to the mirror root with forward slashes, as it appears in
/// every URL column.
fn relative_slash_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

/// Minimal CSV quoting: only fields containing a comma, quote, or newline
/// are wrapped.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
