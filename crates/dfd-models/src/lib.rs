//! Shared data models for the deepfake analysis pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Per-face scores and the aggregated verdict
//! - Abnormality findings and technique attributions
//! - The closed evidence catalogs
//! - The persisted analysis record and its identifier
//! - Analysis stages and the plain-text report

pub mod analysis;
pub mod catalog;
pub mod report;
pub mod stage;
pub mod video;

// Re-export common types
pub use analysis::{
    AbnormalityFinding, AnalysisResult, AnalysisVerdict, FaceScore, ModelInfo, ResultId,
    TechniqueAttribution, HIGH_SCORE_THRESHOLD, MANIPULATED_THRESHOLD,
};
pub use catalog::{AbnormalityCategory, Technique};
pub use report::render_report;
pub use stage::AnalysisStage;
pub use video::{is_supported_video, SUPPORTED_VIDEO_EXTENSIONS};
