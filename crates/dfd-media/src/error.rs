//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while decoding, localizing or classifying.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to open video {path}: {message}")]
    VideoOpen { path: PathBuf, message: String },

    #[error("Face detection failed: {0}")]
    DetectionFailed(String),

    #[error("Face cascade not found: {0}")]
    CascadeNotFound(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl MediaError {
    /// Create a video open failure error.
    pub fn video_open(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::VideoOpen {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a detection failure error.
    pub fn detection_failed(message: impl Into<String>) -> Self {
        Self::DetectionFailed(message.into())
    }

    /// Create a model not found error.
    pub fn model_not_found(path: impl Into<String>) -> Self {
        Self::ModelNotFound(path.into())
    }

    /// Create an inference failure error.
    pub fn inference_failed(message: impl Into<String>) -> Self {
        Self::InferenceFailed(message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error means the video itself could not be opened.
    pub fn is_video_open_failure(&self) -> bool {
        matches!(self, Self::FileNotFound(_) | Self::VideoOpen { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_open_classification() {
        assert!(MediaError::FileNotFound(PathBuf::from("/nope.mp4")).is_video_open_failure());
        assert!(MediaError::video_open("/a.mp4", "codec").is_video_open_failure());
        assert!(!MediaError::inference_failed("boom").is_video_open_failure());
    }

    #[test]
    fn test_video_open_message() {
        let err = MediaError::video_open("/videos/a.mp4", "not opened");
        assert_eq!(err.to_string(), "Failed to open video /videos/a.mp4: not opened");
    }
}
