//! Frame sampling policy.
//!
//! Frames are picked at a fixed stride of `max(1, frame_count / 20)` starting at
//! index 0, and the sequence is capped at `MAX_SAMPLED_FRAMES` indices.

/// Upper bound on frames examined per video.
pub const MAX_SAMPLED_FRAMES: u64 = 20;

/// Chooses which frame indices of a video to decode.
///
/// The sampler is `Copy`; every call to [`FrameSampler::indices`] restarts the
/// sequence from the beginning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSampler {
    frame_count: u64,
    interval: u64,
}

impl FrameSampler {
    /// Create a sampler for a video with `frame_count` frames.
    pub fn new(frame_count: u64) -> Self {
        Self {
            frame_count,
            interval: (frame_count / MAX_SAMPLED_FRAMES).max(1),
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Stride between sampled indices.
    pub fn interval(&self) -> u64 {
        self.interval
    }

    /// True when the video has no frames; callers treat this as unanalyzable.
    pub fn is_empty(&self) -> bool {
        self.frame_count == 0
    }

    /// Number of indices [`FrameSampler::indices`] yields.
    pub fn len(&self) -> usize {
        let strided = self.frame_count.div_ceil(self.interval);
        strided.min(MAX_SAMPLED_FRAMES) as usize
    }

    /// Lazily yield the sampled frame indices in increasing order.
    ///
    /// The sequence stops after `MAX_SAMPLED_FRAMES` indices, so the tail of
    /// the video can go unexamined: for `20 < n < 40` coverage stops at frame
    /// 19, and for 1010 frames the last sampled index is 950.
    pub fn indices(&self) -> impl Iterator<Item = u64> {
        let interval = self.interval;
        (0..self.frame_count)
            .step_by(interval as usize)
            .take(MAX_SAMPLED_FRAMES as usize)
    }
}
