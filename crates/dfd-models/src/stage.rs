//! Analysis stages reported to callers while a video is being processed.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Coarse stage of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum AnalysisStage {
    /// Opening the video and planning frame samples
    Preprocessing,
    /// Localizing and scoring faces in sampled frames
    FacialAnalysis,
    /// Aggregating scores over time into a verdict
    TemporalAnalysis,
    /// Synthesizing abnormality findings and technique attributions
    TechniqueDetection,
    /// Storing the scored result record
    ConfidenceScoring,
    /// Finishing the run and reporting its outcome
    ReportGeneration,
}

impl AnalysisStage {
    /// All stages in execution order.
    pub const ALL: [AnalysisStage; 6] = [
        Self::Preprocessing,
        Self::FacialAnalysis,
        Self::TemporalAnalysis,
        Self::TechniqueDetection,
        Self::ConfidenceScoring,
        Self::ReportGeneration,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preprocessing => "preprocessing",
            Self::FacialAnalysis => "facial-analysis",
            Self::TemporalAnalysis => "temporal-analysis",
            Self::TechniqueDetection => "technique-detection",
            Self::ConfidenceScoring => "confidence-scoring",
            Self::ReportGeneration => "report-generation",
        }
    }

    /// Display message for progress UIs.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Preprocessing => "Preprocessing frames...",
            Self::FacialAnalysis => "Analyzing facial features...",
            Self::TemporalAnalysis => "Detecting temporal inconsistencies...",
            Self::TechniqueDetection => "Identifying mathematical techniques...",
            Self::ConfidenceScoring => "Calculating confidence scores...",
            Self::ReportGeneration => "Generating detailed report...",
        }
    }
}

impl std::fmt::Display for AnalysisStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
