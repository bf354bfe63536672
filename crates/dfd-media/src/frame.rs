//! Frame and face raster types.

use image::imageops::{self, FilterType};
use image::RgbImage;

/// Side length of the square face image fed to the classifier.
pub const FACE_INPUT_SIZE: u32 = 224;

/// A decoded frame picked by the sampler.
#[derive(Debug, Clone)]
pub struct FrameSample {
    pub index: u64,
    /// RGB pixels
    pub image: RgbImage,
}

impl FrameSample {
    pub fn new(index: u64, image: RgbImage) -> Self {
        Self { index, image }
    }
}

/// A face candidate cut from a frame, already normalized to the classifier size.
#[derive(Debug, Clone)]
pub struct FaceRegion {
    pub image: RgbImage,
    pub source_frame_index: u64,
}

impl FaceRegion {
    /// Crop `rect` out of the frame and normalize it.
    ///
    /// The rectangle is clamped to the frame; returns `None` if nothing is left.
    pub fn from_rect(frame: &FrameSample, rect: FaceRect) -> Option<Self> {
        let rect = rect.clamp_to(frame.image.width(), frame.image.height())?;
        let crop = imageops::crop_imm(&frame.image, rect.x, rect.y, rect.width, rect.height)
            .to_image();
        Some(Self {
            image: normalize_face(&crop),
            source_frame_index: frame.index,
        })
    }

    /// Use the entire frame as a single face candidate.
    pub fn whole_frame(frame: &FrameSample) -> Self {
        Self {
            image: normalize_face(&frame.image),
            source_frame_index: frame.index,
        }
    }
}

/// Resize an image to `FACE_INPUT_SIZE` x `FACE_INPUT_SIZE` (bilinear).
pub fn normalize_face(image: &RgbImage) -> RgbImage {
    if image.width() == FACE_INPUT_SIZE && image.height() == FACE_INPUT_SIZE {
        return image.clone();
    }
    imageops::resize(image, FACE_INPUT_SIZE, FACE_INPUT_SIZE, FilterType::Triangle)
}

/// Axis-aligned face rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl FaceRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Intersect with a `frame_width` x `frame_height` frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Option<FaceRect> {
        if self.x >= frame_width || self.y >= frame_height {
            return None;
        }
        let width = self.width.min(frame_width - self.x);
        let height = self.height.min(frame_height - self.y);
        if width == 0 || height == 0 {
            return None;
        }
        Some(FaceRect::new(self.x, self.y, width, height))
    }
}

/// Why a sampled item contributed nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    /// Seeking to or decoding the frame failed
    FrameDecode,
    /// Face localization raised on the frame
    FaceExtraction,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FrameDecode => "frame_decode",
            Self::FaceExtraction => "face_extraction",
        }
    }
}

/// Outcome of a best-effort step: either a value, or a skip the caller absorbs.
#[derive(Debug, Clone)]
pub enum Sampled<T> {
    Ready(T),
    Skipped { reason: SkipReason, detail: String },
}

impl<T> Sampled<T> {
    pub fn skipped(reason: SkipReason, detail: impl Into<String>) -> Self {
        Self::Skipped {
            reason,
            detail: detail.into(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped { .. })
    }

    /// The value, discarding skip details.
    pub fn ready(self) -> Option<T> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Skipped { .. } => None,
        }
    }
}
