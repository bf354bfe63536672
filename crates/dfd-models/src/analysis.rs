//! Analysis data models.
//!
//! This module provides the types that flow through one analysis run:
//! 1. `FaceScore` per classified face region
//! 2. `AnalysisVerdict` aggregated over all scores of a video
//! 3. `AnalysisResult`, the record returned to the caller and persisted verbatim

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::catalog::{AbnormalityCategory, Technique};

/// Mean score above which a video is reported as manipulated (strict).
pub const MANIPULATED_THRESHOLD: f64 = 0.5;

/// Face score above which the face's frame time is recorded as suspicious (strict).
pub const HIGH_SCORE_THRESHOLD: f64 = 0.7;

/// Unique identifier of a persisted analysis record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ResultId(pub String);

impl ResultId {
    /// Generate a new random result ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ResultId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Classifier score for one face region.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FaceScore {
    /// Manipulation probability in [0, 1]
    pub value: f64,
    /// Index of the frame the face was cut from
    pub source_frame_index: u64,
}

impl FaceScore {
    pub fn new(value: f64, source_frame_index: u64) -> Self {
        Self {
            value,
            source_frame_index,
        }
    }

    /// Whether this face scored above the suspicious-timestamp threshold.
    pub fn is_high(&self) -> bool {
        self.value > HIGH_SCORE_THRESHOLD
    }
}

/// Aggregated decision for one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisVerdict {
    pub is_manipulated: bool,
    /// Mean of all face scores
    pub confidence: f64,
    /// Whole seconds of every high-scoring face, in frame order; duplicates kept
    pub suspicious_timestamps_seconds: Vec<u64>,
}

impl AnalysisVerdict {
    /// Build a verdict from a mean score; the manipulation flag follows the threshold.
    pub fn from_confidence(confidence: f64, suspicious_timestamps_seconds: Vec<u64>) -> Self {
        Self {
            is_manipulated: confidence > MANIPULATED_THRESHOLD,
            confidence,
            suspicious_timestamps_seconds,
        }
    }
}

/// One synthesized abnormality finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AbnormalityFinding {
    #[serde(rename = "type")]
    pub category: AbnormalityCategory,
    pub description: String,
    /// Finding confidence in [0.70, 0.95]
    pub confidence: f64,
    /// Up to three suspicious timestamps (seconds)
    #[serde(rename = "timeframes")]
    pub timeframes_seconds: Vec<u64>,
}

/// One attributed manipulation technique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TechniqueAttribution {
    pub name: Technique,
    pub description: String,
    /// Attribution probability in [0.60, 0.95]
    pub probability: f64,
}

/// Static descriptor of the classifier attached to every result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ModelInfo {
    #[serde(rename = "type")]
    pub model_type: String,
    pub name: String,
    pub accuracy: f64,
    pub description: String,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            model_type: "cnn".to_string(),
            name: "DeepfakeDetector CNN".to_string(),
            accuracy: 0.94,
            description: "Convolutional Neural Network trained on FaceForensics++ and DFDC datasets"
                .to_string(),
        }
    }
}

/// Complete analysis record.
///
/// Field names are the persisted layout read by downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(rename = "isDeepfake")]
    pub is_manipulated: bool,
    pub confidence: f64,
    pub abnormalities: Vec<AbnormalityFinding>,
    pub techniques: Vec<TechniqueAttribution>,
    pub processed_at: DateTime<Utc>,
    /// Wall time of the analysis in seconds
    #[serde(rename = "processingTime")]
    pub processing_time_seconds: f64,
    #[serde(rename = "modelUsed")]
    pub model_info: ModelInfo,
}

impl AnalysisResult {
    /// Assemble the record for a verdict and its synthesized evidence.
    pub fn new(
        verdict: &AnalysisVerdict,
        abnormalities: Vec<AbnormalityFinding>,
        techniques: Vec<TechniqueAttribution>,
        processing_time_seconds: f64,
        model_info: ModelInfo,
    ) -> Self {
        Self {
            is_manipulated: verdict.is_manipulated,
            confidence: verdict.confidence,
            abnormalities,
            techniques,
            processed_at: Utc::now(),
            processing_time_seconds,
            model_info,
        }
    }

    /// Serialize to the pretty-printed JSON document that gets persisted.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
