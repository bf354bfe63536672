//! Score aggregation.
//!
//! Collapses every face score of a video into one verdict: the unweighted mean
//! of all scores, plus the whole-second offsets of every high-scoring face.

use dfd_models::{AnalysisVerdict, FaceScore};

use crate::error::{AnalysisError, AnalyzeResult};

/// Aggregate face scores, in frame order, into a verdict.
///
/// Fails with `NoFacesDetected` when `scores` is empty.
pub fn aggregate(scores: &[FaceScore], fps: f64) -> AnalyzeResult<AnalysisVerdict> {
    if scores.is_empty() {
        return Err(AnalysisError::NoFacesDetected);
    }

    let confidence = scores.iter().map(|s| s.value).sum::<f64>() / scores.len() as f64;

    let suspicious = scores
        .iter()
        .filter(|s| s.is_high())
        .map(|s| frame_to_seconds(s.source_frame_index, fps))
        .collect();

    Ok(AnalysisVerdict::from_confidence(confidence, suspicious))
}

/// Whole seconds at `frame_index`; 0 when the frame rate is unknown.
pub fn frame_to_seconds(frame_index: u64, fps: f64) -> u64 {
    if fps > 0.0 {
        (frame_index as f64 / fps) as u64
    } else {
        0
    }
}
