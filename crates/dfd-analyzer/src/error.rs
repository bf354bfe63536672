//! Analysis error types.
//!
//! Only failures that abort an analysis are errors. Per-frame and per-face
//! problems are skips, and a failed write is a warning on the outcome.

use thiserror::Error;

use dfd_media::MediaError;

pub type AnalyzeResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Could not open video file: {0}")]
    VideoOpenFailure(String),

    #[error("No faces detected in the video")]
    NoFacesDetected,

    /// Caller-facing message is generic; `cause` is for logs.
    #[error("Unexpected failure while analyzing video")]
    UnexpectedFailure { cause: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AnalysisError {
    pub fn video_open(msg: impl Into<String>) -> Self {
        Self::VideoOpenFailure(msg.into())
    }

    pub fn unexpected(cause: impl Into<String>) -> Self {
        Self::UnexpectedFailure {
            cause: cause.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Internal detail for logs, falling back to the display message.
    pub fn cause(&self) -> String {
        match self {
            Self::UnexpectedFailure { cause } => cause.clone(),
            other => other.to_string(),
        }
    }

    /// Stable label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VideoOpenFailure(_) => "video_open_failure",
            Self::NoFacesDetected => "no_faces_detected",
            Self::UnexpectedFailure { .. } => "unexpected_failure",
            Self::Config(_) => "config",
        }
    }
}

impl From<MediaError> for AnalysisError {
    fn from(err: MediaError) -> Self {
        if err.is_video_open_failure() {
            Self::VideoOpenFailure(err.to_string())
        } else {
            Self::unexpected(err.to_string())
        }
    }
}
