//! Analysis metrics.
//!
//! Recorded through the `metrics` facade; without an installed recorder these
//! calls are no-ops.

use metrics::{counter, histogram};

use dfd_media::SkipReason;

/// Metric name constants for consistency.
pub mod names {
    /// Completed analyses by outcome.
    pub const ANALYSES_TOTAL: &str = "dfd_analyses_total";

    /// Frames decoded for scoring.
    pub const FRAMES_SAMPLED_TOTAL: &str = "dfd_frames_sampled_total";

    /// Frames skipped, by reason.
    pub const FRAMES_SKIPPED_TOTAL: &str = "dfd_frames_skipped_total";

    /// Faces passed through the classifier.
    pub const FACES_SCORED_TOTAL: &str = "dfd_faces_scored_total";

    /// End-to-end analysis latency in seconds.
    pub const ANALYSIS_SECONDS: &str = "dfd_analysis_seconds";

    /// Results that could not be persisted.
    pub const PERSIST_FAILURES_TOTAL: &str = "dfd_persist_failures_total";
}

/// Record a finished analysis. `outcome` is `"manipulated"`, `"authentic"` or an error kind.
pub fn record_analysis(outcome: &str, seconds: f64) {
    counter!(names::ANALYSES_TOTAL, "outcome" => outcome.to_string()).increment(1);
    histogram!(names::ANALYSIS_SECONDS, "outcome" => outcome.to_string()).record(seconds);
}

pub fn record_frames_sampled(count: u64) {
    counter!(names::FRAMES_SAMPLED_TOTAL).increment(count);
}

pub fn record_frame_skipped(reason: SkipReason) {
    counter!(names::FRAMES_SKIPPED_TOTAL, "reason" => reason.as_str()).increment(1);
}

pub fn record_faces_scored(count: u64) {
    counter!(names::FACES_SCORED_TOTAL).increment(count);
}

pub fn record_persist_failure() {
    counter!(names::PERSIST_FAILURES_TOTAL).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::ANALYSES_TOTAL.starts_with("dfd_"));
        assert!(names::FRAMES_SKIPPED_TOTAL.contains("skipped"));
        assert!(names::ANALYSIS_SECONDS.ends_with("_seconds"));
    }

    #[test]
    fn test_recording_without_recorder() {
        record_analysis("authentic", 1.5);
        record_frames_sampled(20);
        record_frame_skipped(SkipReason::FrameDecode);
        record_faces_scored(3);
        record_persist_failure();
    }
}
