//! Frame scoring loop.
//!
//! Samples frames, localizes faces and scores each face. Frames that fail to
//! decode or localize are skipped; a classifier error aborts the video.

use tracing::{debug, warn};

use dfd_media::{FaceClassifier, FaceLocalizer, FrameSampler, Sampled, SkipReason, VideoSource};
use dfd_models::FaceScore;

use crate::error::AnalyzeResult;
use crate::metrics;
use crate::progress::{emit, ProgressCallback, ProgressEvent};

/// Scores collected from one video, in frame order.
#[derive(Debug, Clone, Default)]
pub struct ScoredVideo {
    pub scores: Vec<FaceScore>,
    pub fps: f64,
    pub frames_sampled: usize,
    pub frames_skipped: usize,
}

/// Run the sample, localize, score loop over `video`.
pub fn score_video(
    video: &mut dyn VideoSource,
    localizer: &mut dyn FaceLocalizer,
    classifier: &dyn FaceClassifier,
    progress: Option<&ProgressCallback>,
) -> AnalyzeResult<ScoredVideo> {
    let sampler = FrameSampler::new(video.frame_count());
    let mut scored = ScoredVideo {
        fps: video.fps(),
        ..Default::default()
    };

    if sampler.is_empty() {
        warn!("Video reports no frames, nothing to sample");
    }

    emit(
        progress,
        ProgressEvent::FramesPlanned {
            count: sampler.len(),
            interval: sampler.interval(),
        },
    );

    for index in sampler.indices() {
        let frame = match video.read_frame(index) {
            Sampled::Ready(frame) => frame,
            Sampled::Skipped { reason, detail } => {
                skip(&mut scored, index, reason, &detail, progress);
                continue;
            }
        };
        scored.frames_sampled += 1;

        let regions = match localizer.locate(&frame) {
            Sampled::Ready(regions) => regions,
            Sampled::Skipped { reason, detail } => {
                skip(&mut scored, index, reason, &detail, progress);
                continue;
            }
        };

        for region in &regions {
            let value = classifier.score(&region.image)?;
            scored.scores.push(FaceScore::new(value, region.source_frame_index));
        }

        debug!(frame_index = index, faces = regions.len(), "Frame scored");
        metrics::record_faces_scored(regions.len() as u64);
        emit(
            progress,
            ProgressEvent::FrameScored {
                frame_index: index,
                faces: regions.len(),
            },
        );
    }

    metrics::record_frames_sampled(scored.frames_sampled as u64);
    Ok(scored)
}

fn skip(
    scored: &mut ScoredVideo,
    index: u64,
    reason: SkipReason,
    detail: &str,
    progress: Option<&ProgressCallback>,
) {
    debug!(frame_index = index, reason = reason.as_str(), detail, "Frame skipped");
    scored.frames_skipped += 1;
    metrics::record_frame_skipped(reason);
    emit(
        progress,
        ProgressEvent::FrameSkipped {
            frame_index: index,
            reason,
        },
    );
}
