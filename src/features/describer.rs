//! Region describer interface and preset selection.
//!
//! Tools hold the describer as `Box<dyn ImageDescriber>`; the only concrete
//! implementation is the SIFT describer, tuned by a named preset.
use super::regions_type::RegionsType;
use super::sift::{SiftDescriber, SiftParams};
use super::types::Regions;
use crate::image::ImageF32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Produces keypoints and descriptors from a grayscale image.
pub trait ImageDescriber: Send + Sync {
    fn name(&self) -> &'static str;

    /// Regions layout written to `image_describer.json` for this describer.
    fn regions_type(&self) -> RegionsType;

    fn describe(&self, image: &ImageF32) -> Regions;
}

/// Density preset: lower peak thresholds keep weaker extrema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DescriberPreset {
    #[default]
    Normal,
    High,
    Ultra,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown describer preset '{0}' (expected default, normal, high or ultra)")]
pub struct UnknownPreset(pub String);

impl FromStr for DescriberPreset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" | "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "ultra" => Ok(Self::Ultra),
            _ => Err(UnknownPreset(s.to_string())),
        }
    }
}

impl fmt::Display for DescriberPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::High => "high",
            Self::Ultra => "ultra",
        };
        f.write_str(name)
    }
}

impl DescriberPreset {
    pub fn peak_threshold(self) -> f32 {
        match self {
            Self::Normal => 0.04,
            Self::High => 0.01,
            Self::Ultra => 0.005,
        }
    }

    /// Apply the preset on top of `base`.
    pub fn apply(self, base: SiftParams) -> SiftParams {
        SiftParams {
            peak_threshold: self.peak_threshold(),
            ..base
        }
    }
}

/// Build the describer selected by `preset`.
pub fn describer_for_preset(preset: DescriberPreset, base: SiftParams) -> Box<dyn ImageDescriber> {
    Box::new(SiftDescriber::new(preset.apply(base)))
}
