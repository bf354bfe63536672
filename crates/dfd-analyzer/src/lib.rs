//! Deepfake video analysis pipeline.
//!
//! This crate provides:
//! - Score aggregation into a verdict
//! - Seedable evidence synthesis from the closed catalogs
//! - The analyzer that drives a video from file to persisted record
//! - Configuration, structured logging, metrics and progress events

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;
pub mod evidence;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod progress;

pub use aggregate::aggregate;
pub use analyzer::{AnalysisOutcome, DeepfakeAnalyzer};
pub use config::{AnalyzerConfig, StorageBackend};
pub use error::{AnalysisError, AnalyzeResult};
pub use evidence::{abnormality_count, synthesize, technique_count, Evidence};
pub use logging::AnalysisLogger;
pub use pipeline::{score_video, ScoredVideo};
pub use progress::{ProgressCallback, ProgressEvent};
