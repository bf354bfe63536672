//! Face classification.
//!
//! A `FaceClassifier` maps one normalized face image to a manipulation
//! probability in `[0, 1]`. The production classifier is an ONNX model run
//! through ONNX Runtime; it is expensive to build, so analyses share one
//! instance through [`LazyClassifier`], which constructs it at most once even
//! when many analyses ask for it concurrently.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use image::imageops::{self, FilterType};
use image::RgbImage;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::{Tensor, Value};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};
use crate::frame::FACE_INPUT_SIZE;

/// Scores a normalized face image.
pub trait FaceClassifier: Send + Sync {
    /// Probability in `[0, 1]` that the face is manipulated.
    fn score(&self, face: &RgbImage) -> MediaResult<f64>;
}

type ClassifierLoader = dyn Fn() -> MediaResult<Arc<dyn FaceClassifier>> + Send + Sync;

/// Shared, lazily constructed classifier handle.
///
/// Cloning is cheap; all clones share the same underlying instance.
#[derive(Clone)]
pub struct LazyClassifier {
    cell: Arc<OnceCell<Arc<dyn FaceClassifier>>>,
    loader: Arc<ClassifierLoader>,
}

impl LazyClassifier {
    /// Build on first use with `loader`. The loader runs on the blocking pool.
    pub fn new<F>(loader: F) -> Self
    where
        F: Fn() -> MediaResult<Arc<dyn FaceClassifier>> + Send + Sync + 'static,
    {
        Self {
            cell: Arc::new(OnceCell::new()),
            loader: Arc::new(loader),
        }
    }

    /// Wrap an already constructed classifier.
    pub fn ready(classifier: Arc<dyn FaceClassifier>) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(classifier))),
            loader: Arc::new(|| -> MediaResult<Arc<dyn FaceClassifier>> {
                Err(MediaError::internal("classifier already initialized"))
            }),
        }
    }

    /// Lazy loader for an ONNX model file.
    pub fn onnx(model_path: impl Into<PathBuf>) -> Self {
        let model_path = model_path.into();
        Self::new(move || {
            let classifier = OrtFaceClassifier::load(&model_path)?;
            Ok(Arc::new(classifier) as Arc<dyn FaceClassifier>)
        })
    }

    /// Get the classifier, constructing it if needed.
    ///
    /// Concurrent first callers wait on a single construction. A failed
    /// construction is not cached; the next caller retries.
    pub async fn get(&self) -> MediaResult<Arc<dyn FaceClassifier>> {
        let classifier = self
            .cell
            .get_or_try_init(|| {
                let loader = Arc::clone(&self.loader);
                async move {
                    match tokio::task::spawn_blocking(move || loader()).await {
                        Ok(result) => result,
                        Err(e) => Err(MediaError::internal(format!(
                            "classifier loader panicked: {e}"
                        ))),
                    }
                }
            })
            .await?;
        Ok(Arc::clone(classifier))
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.initialized()
    }
}

impl std::fmt::Debug for LazyClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyClassifier")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

/// ONNX Runtime face classifier.
///
/// Expects an NHWC `[1, 224, 224, 3]` float input scaled to `[0, 1]` and a
/// single sigmoid output.
pub struct OrtFaceClassifier {
    session: Mutex<Session>,
    output_name: String,
    model_path: PathBuf,
}

impl OrtFaceClassifier {
    pub fn load(model_path: &Path) -> MediaResult<Self> {
        if !model_path.exists() {
            return Err(MediaError::model_not_found(model_path.display().to_string()));
        }

        let model_bytes = std::fs::read(model_path)?;

        let session = Session::builder()
            .map_err(|e| MediaError::inference_failed(format!("ORT session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| MediaError::inference_failed(format!("ORT opt level: {e}")))?
            .commit_from_memory(model_bytes.as_slice())
            .map_err(|e| MediaError::inference_failed(format!("ORT load model: {e}")))?;

        let output_name = session
            .outputs
            .first()
            .map(|output| output.name.clone())
            .ok_or_else(|| MediaError::inference_failed("model declares no outputs"))?;

        info!(
            model = %model_path.display(),
            output = %output_name,
            "Face classifier loaded"
        );

        Ok(Self {
            session: Mutex::new(session),
            output_name,
            model_path: model_path.to_path_buf(),
        })
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }
}

impl FaceClassifier for OrtFaceClassifier {
    fn score(&self, face: &RgbImage) -> MediaResult<f64> {
        let tensor = face_tensor(face)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| MediaError::inference_failed("ORT session poisoned"))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| MediaError::inference_failed(format!("ORT run failed: {e}")))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| MediaError::inference_failed("ORT returned no outputs"))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| MediaError::inference_failed(format!("ORT extract: {e}")))?;

        let raw = data
            .first()
            .copied()
            .ok_or_else(|| MediaError::inference_failed("empty classifier output"))?;

        let score = probability(raw)?;
        debug!(raw, score, "Face scored");
        Ok(score)
    }
}

/// Pack an RGB image into an NHWC float buffer scaled to `[0, 1]`.
///
/// Images that are not `FACE_INPUT_SIZE` square are resized first.
pub fn nhwc_input(face: &RgbImage) -> Vec<f32> {
    let resized;
    let face = if face.dimensions() == (FACE_INPUT_SIZE, FACE_INPUT_SIZE) {
        face
    } else {
        resized = imageops::resize(face, FACE_INPUT_SIZE, FACE_INPUT_SIZE, FilterType::Triangle);
        &resized
    };

    face.as_raw().iter().map(|&v| v as f32 / 255.0).collect()
}

/// NHWC shape of the classifier input batch.
pub fn input_shape() -> [usize; 4] {
    [1, FACE_INPUT_SIZE as usize, FACE_INPUT_SIZE as usize, 3]
}

/// Build the ORT input tensor for one face.
fn face_tensor(face: &RgbImage) -> MediaResult<Value> {
    let input = nhwc_input(face);
    Tensor::from_array((input_shape().to_vec(), input.into_boxed_slice()))
        .map(Value::from)
        .map_err(|e| MediaError::inference_failed(format!("ORT tensor: {e}")))
}

/// Convert a raw model output to a probability.
fn probability(raw: f32) -> MediaResult<f64> {
    if raw.is_nan() {
        return Err(MediaError::inference_failed("classifier produced NaN"));
    }
    Ok((raw as f64).clamp(0.0, 1.0))
}
