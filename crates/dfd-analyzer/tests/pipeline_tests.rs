//! End-to-end analyzer tests with in-memory media fakes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{Rgb, RgbImage};
use rand::rngs::StdRng;
use rand::SeedableRng;

use dfd_analyzer::{AnalysisError, DeepfakeAnalyzer, ProgressCallback, ProgressEvent};
use dfd_media::{
    regions_or_whole_frame, FaceClassifier, FaceLocalizer, FaceRegion, FrameSample, LazyClassifier,
    MediaBackend, MediaError, MediaResult, Sampled, SkipReason, VideoSource,
};
use dfd_models::{AnalysisResult, AnalysisStage, ResultId};
use dfd_storage::{LocalResultStore, ResultStore, StorageError, StorageResult};

/// A video whose frame `i` is a flat image with red channel `levels[i]`.
struct ScriptedVideo {
    levels: Vec<Option<u8>>,
    fps: f64,
    released: Arc<AtomicUsize>,
}

impl VideoSource for ScriptedVideo {
    fn frame_count(&self) -> u64 {
        self.levels.len() as u64
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self, index: u64) -> Sampled<FrameSample> {
        match self.levels.get(index as usize).copied().flatten() {
            Some(level) => Sampled::Ready(FrameSample::new(
                index,
                RgbImage::from_pixel(32, 32, Rgb([level, 0, 0])),
            )),
            None => Sampled::skipped(SkipReason::FrameDecode, "scripted decode failure"),
        }
    }
}

impl Drop for ScriptedVideo {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Never finds a face, so every frame is scored whole.
struct WholeFrameLocalizer;

impl FaceLocalizer for WholeFrameLocalizer {
    fn locate(&mut self, frame: &FrameSample) -> Sampled<Vec<FaceRegion>> {
        Sampled::Ready(regions_or_whole_frame(frame, &[]))
    }
}

/// Red channel / 255.
struct RedChannelClassifier;

impl FaceClassifier for RedChannelClassifier {
    fn score(&self, face: &RgbImage) -> MediaResult<f64> {
        Ok(face.get_pixel(0, 0)[0] as f64 / 255.0)
    }
}

struct ScriptedBackend {
    levels: Vec<Option<u8>>,
    fps: f64,
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    fn new(levels: Vec<Option<u8>>, fps: f64) -> Self {
        Self {
            levels,
            fps,
            opened: Arc::new(AtomicUsize::new(0)),
            released: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MediaBackend for ScriptedBackend {
    fn open_video(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        if path.ends_with("missing.mp4") {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedVideo {
            levels: self.levels.clone(),
            fps: self.fps,
            released: Arc::clone(&self.released),
        }))
    }

    fn face_localizer(&self) -> MediaResult<Box<dyn FaceLocalizer>> {
        Ok(Box::new(WholeFrameLocalizer))
    }
}

struct FailingStore;

#[async_trait::async_trait]
impl ResultStore for FailingStore {
    async fn persist(&self, _result: &AnalysisResult) -> StorageResult<ResultId> {
        Err(StorageError::write_failed("disk full"))
    }

    async fn load(&self, id: &ResultId) -> StorageResult<AnalysisResult> {
        Err(StorageError::not_found(id.as_str()))
    }
}

fn classifier() -> LazyClassifier {
    LazyClassifier::ready(Arc::new(RedChannelClassifier))
}

fn analyzer(backend: ScriptedBackend, results: &Path) -> (DeepfakeAnalyzer, Arc<LocalResultStore>) {
    let store = Arc::new(LocalResultStore::new(results));
    let analyzer = DeepfakeAnalyzer::new(Arc::new(backend), classifier(), store.clone());
    (analyzer, store)
}

fn record_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// 40 frames at 10 fps: high scores on frames 12 and 31, rest at 0.6.
fn manipulated_levels() -> Vec<Option<u8>> {
    (0..40u64)
        .map(|i| match i {
            12 | 31 => Some(242),
            _ => Some(153),
        })
        .collect()
}

#[tokio::test]
async fn test_manipulated_video_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(manipulated_levels(), 10.0);
    let released = Arc::clone(&backend.released);
    let (analyzer, store) = analyzer(backend, dir.path());

    let outcome = analyzer
        .analyze_with_rng(Path::new("clip.mp4"), &mut StdRng::seed_from_u64(5))
        .await
        .unwrap();

    // 40 frames -> interval 2 -> frames 0, 2, ..., 38
    let result = &outcome.result;
    let expected = (19.0 * 0.6 + 0.949_019_607_843_137_3) / 20.0;
    assert!((result.confidence - expected).abs() < 1e-9);
    assert!(result.is_manipulated);
    assert_eq!(result.abnormalities.len(), 4);
    assert_eq!(result.techniques.len(), 3);
    for finding in &result.abnormalities {
        // only frame 12 was sampled among the high-scoring frames
        assert_eq!(finding.timeframes_seconds, vec![1]);
    }

    let id = outcome.result_id.clone().unwrap();
    assert!(outcome.persistence_warning.is_none());
    assert_eq!(&store.load(&id).await.unwrap(), result);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_authentic_video_has_no_evidence() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(vec![Some(76); 100], 25.0);
    let (analyzer, _) = analyzer(backend, dir.path());

    let outcome = analyzer.analyze(Path::new("clip.mp4")).await.unwrap();
    assert!(!outcome.result.is_manipulated);
    assert!((outcome.result.confidence - 76.0 / 255.0).abs() < 1e-9);
    assert!(outcome.result.abnormalities.is_empty());
    assert!(outcome.result.techniques.is_empty());
    assert_eq!(record_count(dir.path()), 1);
}

#[tokio::test]
async fn test_empty_video_is_no_faces_and_not_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(vec![], 30.0);
    let released = Arc::clone(&backend.released);
    let (analyzer, _) = analyzer(backend, dir.path());

    let err = analyzer.analyze(Path::new("empty.mp4")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoFacesDetected));
    assert_eq!(record_count(dir.path()), 0);
    assert_eq!(released.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_all_frames_undecodable_is_no_faces() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(vec![None; 12], 30.0);
    let (analyzer, _) = analyzer(backend, dir.path());

    let err = analyzer.analyze(Path::new("broken.mp4")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::NoFacesDetected));
}

#[tokio::test]
async fn test_unopenable_video() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(manipulated_levels(), 10.0);
    let opened = Arc::clone(&backend.opened);
    let (analyzer, _) = analyzer(backend, dir.path());

    let err = analyzer.analyze(Path::new("/videos/missing.mp4")).await.unwrap_err();
    assert!(matches!(err, AnalysisError::VideoOpenFailure(_)));
    assert_eq!(opened.load(Ordering::SeqCst), 0);
    assert_eq!(record_count(dir.path()), 0);
}

#[tokio::test]
async fn test_persistence_failure_is_a_warning() {
    let backend = ScriptedBackend::new(manipulated_levels(), 10.0);
    let analyzer = DeepfakeAnalyzer::new(Arc::new(backend), classifier(), Arc::new(FailingStore));

    let outcome = analyzer.analyze(Path::new("clip.mp4")).await.unwrap();
    assert!(outcome.result_id.is_none());
    assert!(outcome.persistence_warning.unwrap().contains("disk full"));
    assert!(outcome.result.is_manipulated);
}

#[tokio::test]
async fn test_classifier_load_failure_is_unexpected() {
    let dir = tempfile::tempdir().unwrap();
    let backend = ScriptedBackend::new(manipulated_levels(), 10.0);
    let analyzer = DeepfakeAnalyzer::new(
        Arc::new(backend),
        LazyClassifier::onnx(PathBuf::from("/no/such/model.onnx")),
        Arc::new(LocalResultStore::new(dir.path())),
    );

    let err = analyzer.analyze(Path::new("clip.mp4")).await.unwrap_err();
    assert_eq!(err.to_string(), "Unexpected failure while analyzing video");
    assert!(err.cause().contains("model.onnx"));
}

#[tokio::test]
async fn test_repeat_analysis_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let levels: Vec<Option<u8>> = (0..200u64).map(|i| Some(if i % 30 == 0 { 250 } else { 140 })).collect();
    let (analyzer, _) = analyzer(ScriptedBackend::new(levels, 30.0), dir.path());

    let first = analyzer.analyze(Path::new("a.mp4")).await.unwrap();
    let second = analyzer.analyze(Path::new("a.mp4")).await.unwrap();

    assert_eq!(first.result.confidence, second.result.confidence);
    assert_eq!(first.result.is_manipulated, second.result.is_manipulated);
    assert_eq!(first.result.abnormalities.len(), second.result.abnormalities.len());
    assert_eq!(first.result.techniques.len(), second.result.techniques.len());
    assert_ne!(first.result_id, second.result_id);
    assert_eq!(record_count(dir.path()), 2);
}

#[tokio::test]
async fn test_progress_events_in_stage_order() {
    let dir = tempfile::tempdir().unwrap();
    let mut levels = manipulated_levels();
    levels[4] = None;
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let callback: ProgressCallback = Arc::new(move |event| sink.lock().unwrap().push(event));

    let (analyzer, _) = analyzer(ScriptedBackend::new(levels, 10.0), dir.path());
    let analyzer = analyzer.with_progress(callback);
    analyzer.analyze(Path::new("clip.mp4")).await.unwrap();

    let events = events.lock().unwrap();
    assert!(matches!(events[0], ProgressEvent::VideoOpened { frame_count: 40, .. }));
    assert!(matches!(events[1], ProgressEvent::FramesPlanned { count: 20, interval: 2 }));
    assert!(events.iter().any(|e| matches!(
        e,
        ProgressEvent::FrameSkipped { frame_index: 4, reason: SkipReason::FrameDecode }
    )));
    assert!(matches!(events.last(), Some(ProgressEvent::Complete { .. })));

    let stages: Vec<AnalysisStage> = events.iter().map(|e| e.stage()).collect();
    let positions: Vec<usize> = stages
        .iter()
        .map(|s| AnalysisStage::ALL.iter().position(|a| a == s).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_analyses_share_one_classifier() {
    let dir = tempfile::tempdir().unwrap();
    let constructions = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&constructions);
    let lazy = LazyClassifier::new(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        std::thread::sleep(std::time::Duration::from_millis(20));
        Ok(Arc::new(RedChannelClassifier) as Arc<dyn FaceClassifier>)
    });

    let analyzer = DeepfakeAnalyzer::new(
        Arc::new(ScriptedBackend::new(manipulated_levels(), 10.0)),
        lazy,
        Arc::new(LocalResultStore::new(dir.path())),
    );

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let analyzer = analyzer.clone();
            tokio::spawn(async move { analyzer.analyze(Path::new(&format!("clip-{i}.mp4"))).await })
        })
        .collect();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert_eq!(record_count(dir.path()), 8);
}
