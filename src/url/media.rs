use crate::config::FilterConfig;
use crate::url::CanonicalUrl;
use std::collections::HashSet;

/// Extensions that never hold crawlable HTML
pub const DEFAULT_MEDIA_EXTENSIONS: &[&str] = &[
    // images
    ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".webp",
    // icons
    ".svg", ".ico",
    // video
    ".mp4", ".webm", ".ogg", ".avi", ".mov", ".mkv",
    // audio
    ".mp3", ".wav", ".flac", ".aac",
    // documents
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    // archives
    ".zip", ".rar", ".tar", ".gz", ".7z",
    // binaries
    ".exe", ".bin", ".dmg", ".apk",
];

/// Stylesheets and scripts, blocked unless `block-static-assets` is off
pub const STATIC_ASSET_EXTENSIONS: &[&str] = &[".css", ".js"];

/// Rejects URLs whose path extension is on the block-list
#[derive(Debug, Clone)]
pub struct MediaFilter {
    blocked: HashSet<String>,
}

impl MediaFilter {
    /// Builds the block-list from the filter configuration
    pub fn from_config(config: &FilterConfig) -> Self {
        let mut blocked: HashSet<String> = DEFAULT_MEDIA_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect();

        if config.block_static_assets {
            blocked.extend(STATIC_ASSET_EXTENSIONS.iter().map(|ext| ext.to_string()));
        }

        blocked.extend(config.extra_extensions.iter().map(|ext| ext.to_lowercase()));

        Self { blocked }
    }

    /// Returns true if the URL is not a blocked media or asset file
    pub fn accepts(&self, url: &CanonicalUrl) -> bool {
        !self.is_blocked_path(url.path())
    }

    /// Returns true if the path's extension is on the block-list
    pub fn is_blocked_path(&self, path: &str) -> bool {
        extension_of(path).is_some_and(|ext| self.blocked.contains(&ext))
    }

    /// Number of blocked extensions
    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }
}

impl Default for MediaFilter {
    fn default() -> Self {
        Self::from_config(&FilterConfig::default())
    }
}

/// Lowercased extension of the last path segment, including the dot
fn extension_of(path: &str) -> Option<String> {
    let segment = path.rsplit('/').next().unwrap_or(path);
    segment.rfind('.').map(|idx| segment[idx..].to_lowercase())
}
