//! Video sources.
//!
//! A `VideoSource` is the pipeline's handle on one decoded video: it exposes
//! frame count and frame rate and reads frames by index. The handle is owned
//! by a single analysis and released when dropped, on every exit path.

use std::path::Path;

use crate::error::MediaResult;
use crate::frame::{FrameSample, Sampled};
use crate::localizer::FaceLocalizer;

#[cfg(feature = "opencv")]
use crate::error::MediaError;
#[cfg(feature = "opencv")]
use crate::frame::SkipReason;
#[cfg(feature = "opencv")]
use std::path::PathBuf;
#[cfg(feature = "opencv")]
use tracing::{debug, info, warn};

/// Random-access frame reader for one video.
pub trait VideoSource: Send {
    /// Total frames reported by the container (0 if unknown).
    fn frame_count(&self) -> u64;

    /// Frames per second (0.0 for malformed files).
    fn fps(&self) -> f64;

    /// Seek to `index` and decode it, or report a `FrameDecode` skip.
    fn read_frame(&mut self, index: u64) -> Sampled<FrameSample>;
}

/// Factory for the per-analysis media components.
pub trait MediaBackend: Send + Sync {
    /// Open a video for analysis.
    fn open_video(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>>;

    /// Create a face localizer for one analysis.
    fn face_localizer(&self) -> MediaResult<Box<dyn FaceLocalizer>>;
}

/// Clamp a container-reported frame rate to a usable value.
pub fn sanitize_fps(raw: f64) -> f64 {
    if raw.is_finite() && raw > 0.0 {
        raw
    } else {
        0.0
    }
}

/// Clamp a container-reported frame count to a usable value.
pub fn sanitize_frame_count(raw: f64) -> u64 {
    if raw.is_finite() && raw > 0.0 {
        raw as u64
    } else {
        0
    }
}

/// OpenCV `VideoCapture`-backed video source.
#[cfg(feature = "opencv")]
pub struct OpenCvVideo {
    capture: opencv::videoio::VideoCapture,
    frame_count: u64,
    fps: f64,
    path: PathBuf,
}

#[cfg(feature = "opencv")]
impl OpenCvVideo {
    /// Open a video file.
    pub fn open(path: &Path) -> MediaResult<Self> {
        use opencv::prelude::VideoCaptureTraitConst;
        use opencv::videoio::{VideoCapture, CAP_ANY, CAP_PROP_FPS, CAP_PROP_FRAME_COUNT};

        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| MediaError::video_open(path, "path is not valid UTF-8"))?;

        let capture = VideoCapture::from_file(path_str, CAP_ANY)
            .map_err(|e| MediaError::video_open(path, e.to_string()))?;

        if !capture.is_opened().unwrap_or(false) {
            return Err(MediaError::video_open(path, "Failed to open video file"));
        }

        let frame_count = sanitize_frame_count(capture.get(CAP_PROP_FRAME_COUNT).unwrap_or(0.0));
        let fps = sanitize_fps(capture.get(CAP_PROP_FPS).unwrap_or(0.0));

        info!(
            video = %path.display(),
            frame_count,
            fps,
            "Video opened"
        );

        Ok(Self {
            capture,
            frame_count,
            fps,
            path: path.to_path_buf(),
        })
    }

    fn decode(&mut self, index: u64) -> MediaResult<Option<image::RgbImage>> {
        use opencv::core::{AlgorithmHint, Mat};
        use opencv::imgproc;
        use opencv::prelude::{MatTraitConst, MatTraitConstManual, VideoCaptureTrait};
        use opencv::videoio::CAP_PROP_POS_FRAMES;

        self.capture
            .set(CAP_PROP_POS_FRAMES, index as f64)
            .map_err(|e| MediaError::internal(format!("seek failed: {e}")))?;

        let mut frame = Mat::default();
        let read = self
            .capture
            .read(&mut frame)
            .map_err(|e| MediaError::internal(format!("read failed: {e}")))?;
        if !read || frame.empty() {
            return Ok(None);
        }

        let mut rgb = Mat::default();
        imgproc::cvt_color(
            &frame,
            &mut rgb,
            imgproc::COLOR_BGR2RGB,
            0,
            AlgorithmHint::ALGO_HINT_DEFAULT,
        )
        .map_err(|e| MediaError::internal(format!("BGR2RGB failed: {e}")))?;

        let rgb = if rgb.is_continuous() {
            rgb
        } else {
            rgb.try_clone()
                .map_err(|e| MediaError::internal(format!("Mat clone failed: {e}")))?
        };

        let (width, height) = (rgb.cols() as u32, rgb.rows() as u32);
        let bytes = rgb
            .data_bytes()
            .map_err(|e| MediaError::internal(format!("Mat data: {e}")))?
            .to_vec();

        image::RgbImage::from_raw(width, height, bytes)
            .map(Some)
            .ok_or_else(|| MediaError::InvalidImage(format!("{width}x{height} frame buffer size mismatch")))
    }
}

#[cfg(feature = "opencv")]
impl VideoSource for OpenCvVideo {
    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn fps(&self) -> f64 {
        self.fps
    }

    fn read_frame(&mut self, index: u64) -> Sampled<FrameSample> {
        match self.decode(index) {
            Ok(Some(image)) => Sampled::Ready(FrameSample::new(index, image)),
            Ok(None) => {
                debug!(frame_index = index, "Empty frame, skipping");
                Sampled::skipped(SkipReason::FrameDecode, "no frame decoded at index")
            }
            Err(e) => {
                warn!(frame_index = index, error = %e, "Frame decode failed, skipping");
                Sampled::skipped(SkipReason::FrameDecode, e.to_string())
            }
        }
    }
}

#[cfg(feature = "opencv")]
impl Drop for OpenCvVideo {
    fn drop(&mut self) {
        use opencv::prelude::VideoCaptureTrait;

        if let Err(e) = self.capture.release() {
            warn!(video = %self.path.display(), error = %e, "Failed to release video capture");
        } else {
            debug!(video = %self.path.display(), "Video capture released");
        }
    }
}

/// Media backend using OpenCV for decoding and Haar cascades for faces.
///
/// The cascade file is resolved once at construction; each analysis loads
/// its own classifier from that path.
#[cfg(feature = "opencv")]
#[derive(Debug, Clone)]
pub struct OpenCvBackend {
    cascade_path: PathBuf,
}

#[cfg(feature = "opencv")]
impl OpenCvBackend {
    /// Create a backend; `cascade_path` overrides the cascade search paths.
    pub fn new(cascade_path: Option<PathBuf>) -> MediaResult<Self> {
        let configured = cascade_path.as_deref();
        let cascade_path = crate::localizer::find_cascade_path(configured).ok_or_else(|| {
            MediaError::CascadeNotFound(match configured {
                Some(path) => path.display().to_string(),
                None => "haarcascade_frontalface_default.xml not found in search paths".to_string(),
            })
        })?;
        info!(cascade = %cascade_path.display(), "Face cascade resolved");
        Ok(Self { cascade_path })
    }

    pub fn cascade_path(&self) -> &Path {
        &self.cascade_path
    }
}

#[cfg(feature = "opencv")]
impl MediaBackend for OpenCvBackend {
    fn open_video(&self, path: &Path) -> MediaResult<Box<dyn VideoSource>> {
        Ok(Box::new(OpenCvVideo::open(path)?))
    }

    fn face_localizer(&self) -> MediaResult<Box<dyn FaceLocalizer>> {
        Ok(Box::new(crate::localizer::HaarFaceLocalizer::with_params(
            &self.cascade_path,
            crate::localizer::DetectionParams::default(),
        )?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_fps() {
        assert_eq!(sanitize_fps(29.97), 29.97);
        assert_eq!(sanitize_fps(0.0), 0.0);
        assert_eq!(sanitize_fps(-1.0), 0.0);
        assert_eq!(sanitize_fps(f64::NAN), 0.0);
        assert_eq!(sanitize_fps(f64::INFINITY), 0.0);
    }

    #[test]
    fn test_sanitize_frame_count() {
        assert_eq!(sanitize_frame_count(300.0), 300);
        assert_eq!(sanitize_frame_count(-1.0), 0);
        assert_eq!(sanitize_frame_count(f64::NAN), 0);
    }

    #[cfg(feature = "opencv")]
    #[test]
    fn test_open_missing_file() {
        let err = OpenCvVideo::open(Path::new("/definitely/not/here.mp4"))
            .err()
            .unwrap();
        assert!(err.is_video_open_failure());
    }

    #[cfg(feature = "opencv")]
    #[test]
    fn test_backend_reports_missing_cascade_at_construction() {
        let err = OpenCvBackend::new(Some(PathBuf::from("/definitely/not/cascade.xml")))
            .err()
            .unwrap();
        assert!(matches!(err, MediaError::CascadeNotFound(ref p) if p.contains("cascade.xml")));
    }

    #[cfg(feature = "opencv")]
    #[test]
    fn test_backend_keeps_resolved_cascade_path() {
        let dir = tempfile::tempdir().unwrap();
        let cascade = dir.path().join("face.xml");
        std::fs::write(&cascade, "<opencv_storage/>").unwrap();

        let backend = OpenCvBackend::new(Some(cascade.clone())).unwrap();
        assert_eq!(backend.cascade_path(), cascade.as_path());
    }
}
