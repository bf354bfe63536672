//! Video input helpers.

use std::path::Path;

/// File extensions accepted for analysis.
pub const SUPPORTED_VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "webm"];

/// Check whether a path has one of the supported video extensions (case-insensitive).
pub fn is_supported_video(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            SUPPORTED_VIDEO_EXTENSIONS
                .iter()
                .any(|supported| supported.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
