use serde::{Deserialize, Serialize};

/// Length of a SIFT descriptor: 4 × 4 spatial cells × 8 orientation bins.
pub const DESCRIPTOR_LEN: usize = 128;

pub type Descriptor = [f32; DESCRIPTOR_LEN];

/// A bare 2D keypoint position in input-image pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointFeature {
    pub x: f32,
    pub y: f32,
}

impl PointFeature {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(&self, other: &PointFeature) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Keypoint with scale (blur in input pixels) and orientation (radians, [0, 2π)).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScaledOrientedFeature {
    pub x: f32,
    pub y: f32,
    pub scale: f32,
    pub orientation: f32,
}

impl ScaledOrientedFeature {
    pub fn position(&self) -> PointFeature {
        PointFeature::new(self.x, self.y)
    }

    #[inline]
    pub fn distance(&self, other: &ScaledOrientedFeature) -> f32 {
        self.position().distance(&other.position())
    }
}

/// Regions extracted from one image: keypoints and their descriptors,
/// index-aligned.
#[derive(Clone, Debug, Default)]
pub struct Regions {
    pub features: Vec<ScaledOrientedFeature>,
    pub descriptors: Vec<Descriptor>,
}

impl Regions {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: ScaledOrientedFeature, descriptor: Descriptor) {
        self.features.push(feature);
        self.descriptors.push(descriptor);
    }

    /// Keypoint positions, index-aligned with the descriptors.
    pub fn positions(&self) -> Vec<PointFeature> {
        self.features.iter().map(|f| f.position()).collect()
    }
}
