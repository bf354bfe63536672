//! Closed evidence catalogs.
//!
//! Both catalogs are fixed: five abnormality categories with five candidate
//! descriptions each, and five manipulation techniques with three candidate
//! descriptions each. Evidence entries are only ever drawn from these lists.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Category of an abnormality finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AbnormalityCategory {
    Facial,
    Temporal,
    Audio,
    Lighting,
    Behavior,
}

impl AbnormalityCategory {
    /// All categories in catalog order.
    pub const ALL: [AbnormalityCategory; 5] = [
        Self::Facial,
        Self::Temporal,
        Self::Audio,
        Self::Lighting,
        Self::Behavior,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Facial => "facial",
            Self::Temporal => "temporal",
            Self::Audio => "audio",
            Self::Lighting => "lighting",
            Self::Behavior => "behavior",
        }
    }

    /// Candidate descriptions for this category.
    pub fn descriptions(&self) -> &'static [&'static str] {
        match self {
            Self::Facial => &[
                "Inconsistent facial textures around the cheek area",
                "Unnatural blending between facial features",
                "Abnormal eye blinking patterns",
                "Misaligned facial landmarks",
                "Poor edge blending around hairline",
            ],
            Self::Temporal => &[
                "Inconsistent motion between frames",
                "Unnatural head movement transitions",
                "Flickering in facial features",
                "Temporal discontinuity in expression changes",
                "Irregular motion blur patterns",
            ],
            Self::Audio => &[
                "Misalignment between lip movements and speech",
                "Unnatural voice timbre characteristics",
                "Inconsistent audio-visual synchronization",
                "Artificial voice modulation patterns",
                "Missing micro-expressions during speech",
            ],
            Self::Lighting => &[
                "Inconsistent lighting across facial regions",
                "Unnatural shadows on facial features",
                "Mismatched lighting direction",
                "Inconsistent reflections in the eyes",
                "Abnormal specular highlights on skin",
            ],
            Self::Behavior => &[
                "Unnatural micro-expressions",
                "Inconsistent gaze directions",
                "Abnormal facial muscle movements",
                "Missing natural face asymmetry",
                "Robotic expression transitions",
            ],
        }
    }
}

impl std::fmt::Display for AbnormalityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Manipulation technique that can be attributed to a video.
///
/// Serialized by its display name, which is what the persisted record carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Technique {
    #[serde(rename = "Generative Adversarial Networks (GANs)")]
    Gan,
    #[serde(rename = "Autoencoders")]
    Autoencoder,
    #[serde(rename = "Face Swapping Algorithms")]
    FaceSwap,
    #[serde(rename = "Neural Rendering")]
    NeuralRendering,
    #[serde(rename = "Diffusion Models")]
    Diffusion,
}

impl Technique {
    /// All techniques in catalog order.
    pub const ALL: [Technique; 5] = [
        Self::Gan,
        Self::Autoencoder,
        Self::FaceSwap,
        Self::NeuralRendering,
        Self::Diffusion,
    ];

    /// Human-readable technique name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Gan => "Generative Adversarial Networks (GANs)",
            Self::Autoencoder => "Autoencoders",
            Self::FaceSwap => "Face Swapping Algorithms",
            Self::NeuralRendering => "Neural Rendering",
            Self::Diffusion => "Diffusion Models",
        }
    }

    /// Candidate descriptions for this technique.
    pub fn descriptions(&self) -> &'static [&'static str] {
        match self {
            Self::Gan => &[
                "Evidence of StyleGAN artifacts in facial features",
                "Characteristic GAN compression patterns detected",
                "Training dataset limitations evident in facial details",
            ],
            Self::Autoencoder => &[
                "Reconstruction artifacts typical of deep autoencoders",
                "Characteristic compression-decompression patterns",
                "Latent space manipulation signatures",
            ],
            Self::FaceSwap => &[
                "Classical landmark-based face swapping patterns detected",
                "Evidence of 3D face model fitting and projection",
                "Warping artifacts consistent with spatial transformation networks",
            ],
            Self::NeuralRendering => &[
                "Neural texture rendering inconsistencies",
                "View synthesis artifacts in facial orientation",
                "Neural radiance field (NeRF) characteristic patterns",
            ],
            Self::Diffusion => &[
                "Distinctive noise patterns from diffusion process",
                "Evidence of iterative denoising technique application",
                "Characteristic texture degradation from diffusion process",
            ],
        }
    }
}

impl std::fmt::Display for Technique {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
