use serde::Deserialize;

/// Options controlling scale-space construction.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ScaleSpaceOptions {
    /// Index of the first octave: `-1` upsamples the input 2×, `0` starts at
    /// the input resolution, `k > 0` starts after `k` decimations.
    pub first_octave: i32,
    /// Maximum number of octaves; construction also stops once an octave
    /// would be smaller than `min_octave_size` pixels on a side.
    pub max_octaves: usize,
    /// Number of scales per octave (`S`), producing `S + 3` Gaussian layers.
    pub scales_per_octave: usize,
    /// Blur of the first layer of every octave, in octave pixels.
    pub sigma_min: f32,
    /// Assumed blur of the input image, in input pixels.
    pub sigma_in: f32,
    pub min_octave_size: usize,
}

impl Default for ScaleSpaceOptions {
    fn default() -> Self {
        Self {
            first_octave: 0,
            max_octaves: 6,
            scales_per_octave: 3,
            sigma_min: 1.6,
            sigma_in: 0.5,
            min_octave_size: 16,
        }
    }
}

impl ScaleSpaceOptions {
    pub fn with_first_octave(mut self, first_octave: i32) -> Self {
        self.first_octave = first_octave;
        self
    }

    pub fn with_max_octaves(mut self, max_octaves: usize) -> Self {
        self.max_octaves = max_octaves;
        self
    }

    /// Blur ratio between consecutive layers.
    pub fn layer_ratio(&self) -> f32 {
        2f32.powf(1.0 / self.scales_per_octave.max(1) as f32)
    }
}
