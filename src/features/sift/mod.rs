//! Scale-space SIFT describer.
//!
//! Pipeline per image:
//! 1. Gaussian/DoG scale space (`crate::scale_space`).
//! 2. 26-neighbour DoG extrema above a pre-threshold.
//! 3. Quadratic sub-pixel refinement with contrast and edge rejection.
//! 4. One keypoint per dominant gradient orientation.
//! 5. 4×4×8 gradient histogram descriptor (optionally RootSIFT).
//!
//! Keypoints are reported in input-image pixels; `scale` is the blur of the
//! keypoint expressed in input pixels.

mod descriptor;
mod extrema;
mod orientation;
mod refine;

use super::describer::ImageDescriber;
use super::regions_type::RegionsType;
use super::types::{Regions, ScaledOrientedFeature};
use crate::gradient::{central_gradients, Grad};
use crate::image::ImageF32;
use crate::scale_space::{ScaleSpace, ScaleSpaceOptions};
use log::debug;
use serde::Deserialize;
use std::time::Instant;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Parameters of the SIFT describer.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SiftParams {
    pub scale_space: ScaleSpaceOptions,
    /// DoG contrast threshold for `S = 1`; divided by the number of scales
    /// per octave before use.
    pub peak_threshold: f32,
    /// Maximum ratio of principal curvatures (edge rejection).
    pub edge_threshold: f32,
    /// Interpolation moves allowed while refining an extremum.
    pub max_refine_steps: usize,
    pub root_sift: bool,
}

impl Default for SiftParams {
    fn default() -> Self {
        Self {
            scale_space: ScaleSpaceOptions::default().with_first_octave(-1),
            peak_threshold: 0.04,
            edge_threshold: 10.0,
            max_refine_steps: 5,
            root_sift: true,
        }
    }
}

impl SiftParams {
    fn contrast_threshold(&self) -> f32 {
        self.peak_threshold / self.scale_space.scales_per_octave.max(1) as f32
    }
}

/// SIFT region describer.
#[derive(Clone, Debug, Default)]
pub struct SiftDescriber {
    params: SiftParams,
}

/// Keypoint awaiting orientation and description, in octave coordinates.
struct Candidate {
    octave: usize,
    layer: usize,
    x: f32,
    y: f32,
    sigma: f32,
}

impl SiftDescriber {
    pub fn new(params: SiftParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &SiftParams {
        &self.params
    }

    fn candidates(&self, space: &ScaleSpace) -> Vec<Candidate> {
        let contrast = self.params.contrast_threshold();
        let ratio = self.params.scale_space.layer_ratio();
        let sigma_min = self.params.scale_space.sigma_min;

        let extrema = extrema::find_extrema(&space.octaves, 0.8 * contrast);
        let total = extrema.len();
        let candidates: Vec<Candidate> = extrema
            .into_iter()
            .filter_map(|e| {
                refine::refine_keypoint(
                    e,
                    &space.octaves,
                    contrast,
                    self.params.edge_threshold,
                    self.params.max_refine_steps,
                )
            })
            .map(|kp| {
                let octave = &space.octaves[kp.octave];
                let layer = (kp.layer.round() as usize).min(octave.gaussians.len() - 1);
                Candidate {
                    octave: kp.octave,
                    layer,
                    x: kp.x,
                    y: kp.y,
                    sigma: octave.sigma_at(kp.layer, sigma_min, ratio),
                }
            })
            .collect();
        debug!(
            "SiftDescriber extrema={} refined={}",
            total,
            candidates.len()
        );
        candidates
    }

    fn describe_candidate(
        &self,
        candidate: &Candidate,
        space: &ScaleSpace,
        grads: &[Vec<Grad>],
    ) -> Vec<(ScaledOrientedFeature, super::types::Descriptor)> {
        let grad = &grads[candidate.octave][candidate.layer];
        let delta = space.octaves[candidate.octave].delta;
        orientation::dominant_orientations(grad, candidate.x, candidate.y, candidate.sigma)
            .into_iter()
            .map(|theta| {
                let desc = descriptor::describe_keypoint(
                    grad,
                    candidate.x,
                    candidate.y,
                    candidate.sigma,
                    theta,
                    self.params.root_sift,
                );
                let feature = ScaledOrientedFeature {
                    x: candidate.x * delta,
                    y: candidate.y * delta,
                    scale: candidate.sigma * delta,
                    orientation: theta,
                };
                (feature, desc)
            })
            .collect()
    }
}

impl ImageDescriber for SiftDescriber {
    fn name(&self) -> &'static str {
        "SIFT"
    }

    fn regions_type(&self) -> RegionsType {
        RegionsType::SiftFloat
    }

    fn describe(&self, image: &ImageF32) -> Regions {
        let start = Instant::now();
        let space = ScaleSpace::build(image, &self.params.scale_space);
        if space.is_empty() {
            debug!("SiftDescriber image {}x{} too small", image.w, image.h);
            return Regions::default();
        }
        let grads: Vec<Vec<Grad>> = space
            .octaves
            .iter()
            .map(|o| o.gaussians.iter().map(central_gradients).collect())
            .collect();
        let candidates = self.candidates(&space);

        #[cfg(feature = "parallel")]
        let described: Vec<_> = candidates
            .par_iter()
            .map(|c| self.describe_candidate(c, &space, &grads))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let described: Vec<_> = candidates
            .iter()
            .map(|c| self.describe_candidate(c, &space, &grads))
            .collect();

        let mut regions = Regions::default();
        for (feature, desc) in described.into_iter().flatten() {
            regions.push(feature, desc);
        }
        debug!(
            "SiftDescriber {}x{} -> {} regions in {:.3} ms",
            image.w,
            image.h,
            regions.len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        regions
    }
}
