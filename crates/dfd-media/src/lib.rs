#![deny(unreachable_patterns)]
//! Media layer of the deepfake analysis pipeline.
//!
//! This crate provides:
//! - Video sources with random-access frame reads (OpenCV `VideoCapture`)
//! - The frame sampling policy
//! - Face localization with whole-frame fallback (Haar cascade)
//! - The face classifier contract, an ONNX Runtime implementation and a
//!   single-flight lazily initialized handle
//!
//! Per-frame and per-face failures are values (`Sampled::Skipped`), not errors.

pub mod classifier;
pub mod error;
pub mod frame;
pub mod localizer;
pub mod sampler;
pub mod video;

pub use classifier::{FaceClassifier, LazyClassifier, OrtFaceClassifier};
pub use error::{MediaError, MediaResult};
pub use frame::{FaceRect, FaceRegion, FrameSample, Sampled, SkipReason, FACE_INPUT_SIZE};
pub use localizer::{regions_or_whole_frame, DetectionParams, FaceLocalizer};
pub use sampler::{FrameSampler, MAX_SAMPLED_FRAMES};
pub use video::{MediaBackend, VideoSource};

#[cfg(feature = "opencv")]
pub use localizer::HaarFaceLocalizer;
#[cfg(feature = "opencv")]
pub use video::{OpenCvBackend, OpenCvVideo};
