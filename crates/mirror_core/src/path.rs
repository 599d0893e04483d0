use std::path::PathBuf;

use url::Url;

/// Case-insensitive allow-set of file extensions. Entries are stored
/// lowercased with a leading dot, so `"mp3"`, `".mp3"` and `".MP3"` all
/// configure the same filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    allowed: Vec<String>,
}

impl ExtensionFilter {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = extensions
            .into_iter()
            .map(|ext| {
                let ext = ext.as_ref().trim().to_ascii_lowercase();
                if ext.starts_with('.') {
                    ext
                } else {
                    format!(".{ext}")
                }
            })
            .collect();
        Self { allowed }
    }

    /// Whether the last segment of a URL-style path carries an allowed
    /// extension.
    pub fn matches_path(&self, path: &str) -> bool {
        match extension_of(path) {
            Some(ext) => self.allowed.iter().any(|allowed| *allowed == ext),
            None => false,
        }
    }
}

/// Lowercased extension (including the dot) of the final path segment, if
/// any. A dot-less segment or a bare trailing dot yields `None`.
fn extension_of(path: &str) -> Option<String> {
    let name = path.rsplit('/').next().unwrap_or(path);
    let idx = name.rfind('.')?;
    let ext = &name[idx..];
    if ext.len() < 2 {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// A local mirror path derived from a remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedPath {
    /// Path relative to the mirror root, using local separators.
    pub relative: PathBuf,
    /// True when the marker segment was absent and only the remote basename
    /// was kept, flattening the remote directory structure.
    pub flattened: bool,
}

/// Derives local mirror paths from remote URL paths.
///
/// The portion of the remote path after the configured marker segment
/// becomes the relative local path. When the marker does not occur, only
/// the basename survives; two distinct remote files can then collide on one
/// local path, so callers are expected to surface `flattened` mappings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMapper {
    marker: String,
}

impl PathMapper {
    pub fn new(marker: impl Into<String>) -> Self {
        let marker = marker.into();
        Self {
            marker: marker.trim_matches('/').to_string(),
        }
    }

    pub fn map(&self, url: &Url) -> MappedPath {
        let path = url.path();
        let needle = format!("/{}/", self.marker);
        if let Some(idx) = path.find(&needle) {
            let rel = &path[idx + needle.len()..];
            let relative: PathBuf = rel.split('/').filter(|s| !s.is_empty()).collect();
            if !relative.as_os_str().is_empty() {
                return MappedPath {
                    relative,
                    flattened: false,
                };
            }
        }
        MappedPath {
            relative: PathBuf::from(basename(path)),
            flattened: true,
        }
    }
}

fn basename(path: &str) -> String {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or("")
        .to_string()
}
