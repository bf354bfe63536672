//! Face localization.
//!
//! Finds face regions in a sampled frame. When the detector finds nothing,
//! the whole frame is used as the single face candidate so a frame is never
//! dropped for lack of a detector hit. When the detector itself fails, the
//! frame is skipped.
//!
//! # Backends
//!
//! - **Haar cascade** (requires the `opencv` feature): frontal-face cascade run
//!   on the grayscale frame.

use crate::frame::{FaceRect, FaceRegion, FrameSample, Sampled};

#[cfg(feature = "opencv")]
use crate::error::{MediaError, MediaResult};
#[cfg(feature = "opencv")]
use crate::frame::SkipReason;
#[cfg(feature = "opencv")]
use std::path::{Path, PathBuf};
#[cfg(feature = "opencv")]
use tracing::{debug, info, warn};

/// Locates face candidates in decoded frames.
pub trait FaceLocalizer: Send {
    /// Return normalized face regions, or a `FaceExtraction` skip if detection failed.
    fn locate(&mut self, frame: &FrameSample) -> Sampled<Vec<FaceRegion>>;
}

/// Multi-scale detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionParams {
    pub scale_factor: f64,
    pub min_neighbors: i32,
    /// Minimum face side length in pixels
    pub min_size: i32,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            scale_factor: 1.1,
            min_neighbors: 5,
            min_size: 30,
        }
    }
}

/// Turn detector rectangles into face regions, falling back to the whole frame.
///
/// Rectangles that fall entirely outside the frame are ignored; if none remain,
/// the whole frame becomes the only candidate.
pub fn regions_or_whole_frame(frame: &FrameSample, rects: &[FaceRect]) -> Vec<FaceRegion> {
    let regions: Vec<FaceRegion> = rects
        .iter()
        .filter_map(|rect| FaceRegion::from_rect(frame, *rect))
        .collect();

    if regions.is_empty() {
        vec![FaceRegion::whole_frame(frame)]
    } else {
        regions
    }
}

/// Haar cascade file locations, in preference order.
#[cfg(feature = "opencv")]
pub(crate) const CASCADE_SEARCH_PATHS: &[&str] = &[
    // Working directory / container models directory
    "haarcascade_frontalface_default.xml",
    "models/haarcascade_frontalface_default.xml",
    "/app/models/haarcascade_frontalface_default.xml",
    // System paths
    "/usr/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/local/share/opencv4/haarcascades/haarcascade_frontalface_default.xml",
    "/usr/share/opencv/haarcascades/haarcascade_frontalface_default.xml",
];

/// Resolve the cascade file: the configured path if given, else the first existing search path.
#[cfg(feature = "opencv")]
pub fn find_cascade_path(configured: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = configured {
        return path.exists().then(|| path.to_path_buf());
    }
    CASCADE_SEARCH_PATHS
        .iter()
        .map(Path::new)
        .find(|path| path.exists())
        .map(Path::to_path_buf)
}

/// Frontal-face Haar cascade localizer.
#[cfg(feature = "opencv")]
pub struct HaarFaceLocalizer {
    cascade: opencv::objdetect::CascadeClassifier,
    params: DetectionParams,
}

#[cfg(feature = "opencv")]
impl HaarFaceLocalizer {
    /// Load the cascade from `configured`, or from the default search paths.
    pub fn new(configured: Option<&Path>) -> MediaResult<Self> {
        let path = find_cascade_path(configured).ok_or_else(|| {
            MediaError::CascadeNotFound(match configured {
                Some(path) => path.display().to_string(),
                None => "haarcascade_frontalface_default.xml not found in search paths".to_string(),
            })
        })?;
        Self::with_params(&path, DetectionParams::default())
    }

    /// Load a specific cascade file with custom parameters.
    pub fn with_params(path: &Path, params: DetectionParams) -> MediaResult<Self> {
        use opencv::objdetect::CascadeClassifier;
        use opencv::prelude::CascadeClassifierTraitConst;

        let path_str = path.to_string_lossy();
        let cascade = CascadeClassifier::new(&path_str).map_err(|e| {
            MediaError::detection_failed(format!("Failed to load cascade {}: {}", path_str, e))
        })?;

        if cascade.empty().unwrap_or(true) {
            return Err(MediaError::CascadeNotFound(format!(
                "cascade at {} is empty or unreadable",
                path_str
            )));
        }

        info!(cascade = %path_str, "Haar face cascade loaded");
        Ok(Self { cascade, params })
    }

    /// Run the cascade on the grayscale frame and return raw face rectangles.
    fn detect(&mut self, frame: &FrameSample) -> MediaResult<Vec<FaceRect>> {
        use opencv::core::{Mat, Rect, Scalar, Size, Vector, CV_8UC1};
        use opencv::prelude::{CascadeClassifierTrait, MatTraitManual};

        let gray = image::imageops::grayscale(&frame.image);
        let (width, height) = gray.dimensions();

        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC1,
            Scalar::all(0.0),
        )
        .map_err(|e| MediaError::detection_failed(format!("Mat alloc failed: {e}")))?;
        mat.data_bytes_mut()
            .map_err(|e| MediaError::detection_failed(format!("Mat data: {e}")))?
            .copy_from_slice(gray.as_raw());

        let mut faces = Vector::<Rect>::new();
        self.cascade
            .detect_multi_scale(
                &mat,
                &mut faces,
                self.params.scale_factor,
                self.params.min_neighbors,
                0,
                Size::new(self.params.min_size, self.params.min_size),
                Size::new(0, 0),
            )
            .map_err(|e| MediaError::detection_failed(e.to_string()))?;

        let rects: Vec<FaceRect> = faces
            .iter()
            .filter(|r| r.x >= 0 && r.y >= 0 && r.width > 0 && r.height > 0)
            .map(|r| FaceRect::new(r.x as u32, r.y as u32, r.width as u32, r.height as u32))
            .collect();

        debug!(
            frame_index = frame.index,
            faces = rects.len(),
            "Haar cascade detection complete"
        );
        Ok(rects)
    }
}

#[cfg(feature = "opencv")]
impl FaceLocalizer for HaarFaceLocalizer {
    fn locate(&mut self, frame: &FrameSample) -> Sampled<Vec<FaceRegion>> {
        match self.detect(frame) {
            Ok(rects) => {
                if rects.is_empty() {
                    debug!(frame_index = frame.index, "No faces found, using whole frame");
                }
                Sampled::Ready(regions_or_whole_frame(frame, &rects))
            }
            Err(e) => {
                warn!(frame_index = frame.index, error = %e, "Face extraction failed, skipping frame");
                Sampled::skipped(SkipReason::FaceExtraction, e.to_string())
            }
        }
    }
}
