//! Analysis progress events.

use std::sync::Arc;

use dfd_media::SkipReason;
use dfd_models::{AnalysisStage, ResultId};

/// Progress notification emitted while a video is analyzed.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    VideoOpened { frame_count: u64, fps: f64 },
    FramesPlanned { count: usize, interval: u64 },
    FrameScored { frame_index: u64, faces: usize },
    FrameSkipped { frame_index: u64, reason: SkipReason },
    Verdict { is_manipulated: bool, confidence: f64 },
    Evidence { abnormalities: usize, techniques: usize },
    Persisted { result_id: ResultId },
    Complete { processing_time_seconds: f64 },
    Failed { message: String },
}

impl ProgressEvent {
    /// The user-facing stage this event belongs to.
    pub fn stage(&self) -> AnalysisStage {
        match self {
            Self::VideoOpened { .. } | Self::FramesPlanned { .. } => AnalysisStage::Preprocessing,
            Self::FrameScored { .. } | Self::FrameSkipped { .. } => AnalysisStage::FacialAnalysis,
            Self::Verdict { .. } => AnalysisStage::TemporalAnalysis,
            Self::Evidence { .. } => AnalysisStage::TechniqueDetection,
            Self::Persisted { .. } => AnalysisStage::ConfidenceScoring,
            Self::Complete { .. } | Self::Failed { .. } => AnalysisStage::ReportGeneration,
        }
    }
}

/// Callback type for progress updates.
pub type ProgressCallback = Arc<dyn Fn(ProgressEvent) + Send + Sync + 'static>;

/// Invoke an optional callback.
pub(crate) fn emit(callback: Option<&ProgressCallback>, event: ProgressEvent) {
    if let Some(callback) = callback {
        callback(event);
    }
}
