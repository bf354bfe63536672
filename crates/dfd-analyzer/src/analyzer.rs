//! Deepfake analyzer.
//!
//! Drives one video through the pipeline: open, sample and score on the
//! blocking pool, then aggregate, synthesize evidence, assemble the record and
//! persist it. The video handle lives inside the blocking task and is dropped
//! there on every path.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{info, warn, Instrument};

use dfd_media::{LazyClassifier, MediaBackend};
use dfd_models::{AnalysisResult, ModelInfo, ResultId};
use dfd_storage::ResultStore;

use crate::aggregate::aggregate;
use crate::error::{AnalysisError, AnalyzeResult};
use crate::evidence::synthesize;
use crate::logging::AnalysisLogger;
use crate::metrics;
use crate::pipeline::{score_video, ScoredVideo};
use crate::progress::{emit, ProgressCallback, ProgressEvent};

/// Successful analysis.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Set when the record was persisted
    pub result_id: Option<ResultId>,
    /// Set when persisting failed; the result is still valid
    pub persistence_warning: Option<String>,
}

impl AnalysisOutcome {
    pub fn is_persisted(&self) -> bool {
        self.result_id.is_some()
    }
}

/// Analyzes videos with a shared classifier and result store.
#[derive(Clone)]
pub struct DeepfakeAnalyzer {
    backend: Arc<dyn MediaBackend>,
    classifier: LazyClassifier,
    store: Arc<dyn ResultStore>,
    model_info: ModelInfo,
    progress: Option<ProgressCallback>,
}

impl DeepfakeAnalyzer {
    pub fn new(
        backend: Arc<dyn MediaBackend>,
        classifier: LazyClassifier,
        store: Arc<dyn ResultStore>,
    ) -> Self {
        Self {
            backend,
            classifier,
            store,
            model_info: ModelInfo::default(),
            progress: None,
        }
    }

    pub fn with_model_info(mut self, model_info: ModelInfo) -> Self {
        self.model_info = model_info;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn classifier(&self) -> &LazyClassifier {
        &self.classifier
    }

    /// Analyze one video with an OS-seeded random source for evidence.
    pub async fn analyze(&self, path: &Path) -> AnalyzeResult<AnalysisOutcome> {
        let mut rng = StdRng::from_os_rng();
        self.analyze_with_rng(path, &mut rng).await
    }

    /// Analyze one video drawing evidence from `rng`.
    pub async fn analyze_with_rng<R>(&self, path: &Path, rng: &mut R) -> AnalyzeResult<AnalysisOutcome>
    where
        R: Rng + Send + ?Sized,
    {
        let logger = AnalysisLogger::new(path);
        let span = logger.create_span();
        let start = Instant::now();

        logger.log_start("analyzing video");
        let outcome = self.run(path, rng, &logger, start).instrument(span).await;
        let seconds = start.elapsed().as_secs_f64();

        match &outcome {
            Ok(outcome) => {
                let label = if outcome.result.is_manipulated {
                    "manipulated"
                } else {
                    "authentic"
                };
                metrics::record_analysis(label, seconds);
                logger.log_completion(&format!(
                    "{} with confidence {:.3} in {:.2}s",
                    label, outcome.result.confidence, seconds
                ));
            }
            Err(e) => {
                metrics::record_analysis(e.kind(), seconds);
                logger.log_error(&format!("{} ({})", e.kind(), e.cause()));
                emit(
                    self.progress.as_ref(),
                    ProgressEvent::Failed {
                        message: e.to_string(),
                    },
                );
            }
        }

        outcome
    }

    async fn run<R>(
        &self,
        path: &Path,
        rng: &mut R,
        logger: &AnalysisLogger,
        start: Instant,
    ) -> AnalyzeResult<AnalysisOutcome>
    where
        R: Rng + Send + ?Sized,
    {
        let classifier = self.classifier.get().await?;

        let scored = self.score(path.to_path_buf(), classifier).await?;
        logger.log_progress(&format!(
            "{} faces from {} frames ({} skipped)",
            scored.scores.len(),
            scored.frames_sampled,
            scored.frames_skipped
        ));

        let verdict = aggregate(&scored.scores, scored.fps)?;
        emit(
            self.progress.as_ref(),
            ProgressEvent::Verdict {
                is_manipulated: verdict.is_manipulated,
                confidence: verdict.confidence,
            },
        );

        let evidence = synthesize(&verdict, rng);
        emit(
            self.progress.as_ref(),
            ProgressEvent::Evidence {
                abnormalities: evidence.abnormalities.len(),
                techniques: evidence.techniques.len(),
            },
        );

        let processing_time_seconds = start.elapsed().as_secs_f64();
        let result = AnalysisResult::new(
            &verdict,
            evidence.abnormalities,
            evidence.techniques,
            processing_time_seconds,
            self.model_info.clone(),
        );

        let (result_id, persistence_warning) = match self.store.persist(&result).await {
            Ok(id) => {
                info!(result_id = %id, "Result persisted");
                emit(
                    self.progress.as_ref(),
                    ProgressEvent::Persisted {
                        result_id: id.clone(),
                    },
                );
                (Some(id), None)
            }
            Err(e) => {
                let warning = format!("Failed to persist analysis result: {}", e);
                metrics::record_persist_failure();
                logger.log_warning(&warning);
                (None, Some(warning))
            }
        };

        emit(
            self.progress.as_ref(),
            ProgressEvent::Complete {
                processing_time_seconds,
            },
        );

        Ok(AnalysisOutcome {
            result,
            result_id,
            persistence_warning,
        })
    }

    /// Open, sample and score the video on the blocking pool.
    async fn score(
        &self,
        path: PathBuf,
        classifier: Arc<dyn dfd_media::FaceClassifier>,
    ) -> AnalyzeResult<ScoredVideo> {
        let backend = Arc::clone(&self.backend);
        let progress = self.progress.clone();

        tokio::task::spawn_blocking(move || {
            let mut video = backend.open_video(&path)?;
            emit(
                progress.as_ref(),
                ProgressEvent::VideoOpened {
                    frame_count: video.frame_count(),
                    fps: video.fps(),
                },
            );

            let mut localizer = backend.face_localizer()?;
            score_video(
                video.as_mut(),
                localizer.as_mut(),
                classifier.as_ref(),
                progress.as_ref(),
            )
        })
        .await
        .map_err(|e| {
            warn!(error = %e, "Scoring task did not complete");
            AnalysisError::unexpected(format!("scoring task failed: {}", e))
        })?
    }
}
