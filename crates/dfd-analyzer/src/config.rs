//! Analyzer configuration.

use std::path::PathBuf;

use crate::error::{AnalysisError, AnalyzeResult};

/// Where analysis records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// JSON files under `results_dir`
    Local,
    /// Cloudflare R2 bucket configured through `R2_*` variables
    R2,
}

impl StorageBackend {
    pub fn parse(value: &str) -> AnalyzeResult<Self> {
        match value.trim().to_lowercase().as_str() {
            "local" | "" => Ok(Self::Local),
            "r2" => Ok(Self::R2),
            other => Err(AnalysisError::config_error(format!(
                "unknown DFD_STORAGE_BACKEND '{}', expected 'local' or 'r2'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::R2 => "r2",
        }
    }
}

/// Analyzer configuration.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// ONNX face classifier model
    pub model_path: PathBuf,
    /// Haar cascade override; `None` searches the standard locations
    pub cascade_path: Option<PathBuf>,
    /// Directory for local result records
    pub results_dir: PathBuf,
    pub storage_backend: StorageBackend,
    /// If set, the binary writes a text report per analyzed video here
    pub report_dir: Option<PathBuf>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/deepfake_detector.onnx"),
            cascade_path: None,
            results_dir: PathBuf::from("results"),
            storage_backend: StorageBackend::Local,
            report_dir: None,
        }
    }
}

impl AnalyzerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> AnalyzeResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> AnalyzeResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            model_path: non_empty("DFD_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            cascade_path: non_empty("DFD_CASCADE_PATH").map(PathBuf::from),
            results_dir: non_empty("DFD_RESULTS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.results_dir),
            storage_backend: match non_empty("DFD_STORAGE_BACKEND") {
                Some(value) => StorageBackend::parse(&value)?,
                None => defaults.storage_backend,
            },
            report_dir: non_empty("DFD_REPORT_DIR").map(PathBuf::from),
        })
    }
}
