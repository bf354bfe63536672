//! Structured analysis logging.
//!
//! Every log line of one analysis carries its invocation id and video path so
//! interleaved concurrent analyses can be told apart.

use std::path::Path;

use tracing::{error, info, warn, Span};

/// Per-invocation logger with consistent fields.
#[derive(Debug, Clone)]
pub struct AnalysisLogger {
    invocation_id: String,
    video: String,
}

impl AnalysisLogger {
    /// Create a logger with a fresh invocation id.
    pub fn new(video: &Path) -> Self {
        Self::with_id(&uuid::Uuid::new_v4().to_string(), video)
    }

    pub fn with_id(invocation_id: &str, video: &Path) -> Self {
        Self {
            invocation_id: invocation_id.to_string(),
            video: video.display().to_string(),
        }
    }

    pub fn log_start(&self, message: &str) {
        info!(
            invocation_id = %self.invocation_id,
            video = %self.video,
            "Analysis started: {}", message
        );
    }

    pub fn log_progress(&self, message: &str) {
        info!(
            invocation_id = %self.invocation_id,
            video = %self.video,
            "Analysis progress: {}", message
        );
    }

    pub fn log_warning(&self, message: &str) {
        warn!(
            invocation_id = %self.invocation_id,
            video = %self.video,
            "Analysis warning: {}", message
        );
    }

    pub fn log_error(&self, message: &str) {
        error!(
            invocation_id = %self.invocation_id,
            video = %self.video,
            "Analysis error: {}", message
        );
    }

    pub fn log_completion(&self, message: &str) {
        info!(
            invocation_id = %self.invocation_id,
            video = %self.video,
            "Analysis completed: {}", message
        );
    }

    pub fn invocation_id(&self) -> &str {
        &self.invocation_id
    }

    pub fn video(&self) -> &str {
        &self.video
    }

    /// Span covering one analysis.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "analysis",
            invocation_id = %self.invocation_id,
            video = %self.video
        )
    }
}
