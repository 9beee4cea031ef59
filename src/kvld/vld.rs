//! Virtual line descriptor.
//!
//! A VLD samples `DIMENSION` discs evenly spaced on the open segment between
//! two keypoints. Each disc contributes a gradient-orientation histogram
//! measured relative to the segment direction, so the descriptor is invariant
//! to rotation; the disc radius follows the segment length, so it is also
//! invariant to scale.
use super::scale::GradientScales;
use crate::angle::{angle_from, circular_bin_distance, wrap_two_pi};
use crate::features::PointFeature;
use std::f32::consts::TAU;

pub const DIMENSION: usize = 10;
pub const SUBDIRECTIONS: usize = 8;
pub const BINS: usize = 24;

/// Returned by [`Vld::difference`] when either descriptor has no contrast.
pub const UNUSABLE_DIFFERENCE: f32 = 128.0;

const MIN_CONTRAST: f32 = 1e-3;
const MIN_RADIUS: f32 = 2.0;
const DESCRIPTOR_WEIGHT: f32 = 0.36;
const ORIENTATION_WEIGHT: f32 = 0.64;

#[derive(Clone, Debug)]
pub struct Vld {
    principal: [usize; DIMENSION],
    weights: [f32; DIMENSION],
    descriptor: [f32; DIMENSION * SUBDIRECTIONS],
    contrast: f32,
    length: f32,
}

impl Vld {
    pub fn new(scales: &GradientScales, from: PointFeature, to: PointFeature) -> Self {
        let (dx, dy) = (to.x - from.x, to.y - from.y);
        let length = (dx * dx + dy * dy).sqrt();
        let line_angle = angle_from(dx, dy).unwrap_or(0.0);

        let radius = (length / (DIMENSION as f32 + 1.0)).max(MIN_RADIUS);
        let (grad, ratio) = scales.level(scales.index_for_radius(radius));
        let r = radius / ratio;
        let r2 = r * r;
        let (w, h) = (grad.width() as isize, grad.height() as isize);

        let mut principal = [0usize; DIMENSION];
        let mut weights = [0f32; DIMENSION];
        let mut descriptor = [0f32; DIMENSION * SUBDIRECTIONS];

        for i in 0..DIMENSION {
            let t = (i + 1) as f32 / (DIMENSION + 1) as f32;
            // level coordinates, pixel centres at integers
            let cx = (from.x + t * dx + 0.5) / ratio - 0.5;
            let cy = (from.y + t * dy + 0.5) / ratio - 0.5;

            let mut hist = [0f32; BINS];
            let x0 = ((cx - r).floor() as isize).max(0);
            let x1 = ((cx + r).ceil() as isize).min(w - 1);
            let y0 = ((cy - r).floor() as isize).max(0);
            let y1 = ((cy + r).ceil() as isize).min(h - 1);
            for y in y0..=y1 {
                for x in x0..=x1 {
                    let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                    if d2 > r2 {
                        continue;
                    }
                    let ori = grad.ori.get(x as usize, y as usize);
                    if ori < 0.0 {
                        continue;
                    }
                    let m = grad.mag.get(x as usize, y as usize) * (-d2 / (2.0 * r2)).exp();
                    let rel = wrap_two_pi(ori - line_angle);
                    let bin = ((rel / TAU) * BINS as f32) as usize % BINS;
                    hist[bin] += m;
                }
            }

            // strongest direction against its opposite
            let (best_bin, best) = (0..BINS)
                .map(|b| (b, hist[b] - hist[(b + BINS / 2) % BINS]))
                .fold((0, f32::MIN), |acc, cur| if cur.1 > acc.1 { cur } else { acc });
            principal[i] = best_bin;
            weights[i] = best.max(0.0);

            let cell = &mut descriptor[i * SUBDIRECTIONS..(i + 1) * SUBDIRECTIONS];
            for (b, v) in hist.iter().enumerate() {
                cell[b * SUBDIRECTIONS / BINS] += v;
            }
        }

        let contrast = weights.iter().map(|w| w * w).sum::<f32>().sqrt();
        let weight_sum: f32 = weights.iter().sum();
        if weight_sum > 0.0 {
            weights.iter_mut().for_each(|w| *w /= weight_sum);
        }
        let descriptor_sum: f32 = descriptor.iter().sum();
        if descriptor_sum > 0.0 {
            descriptor.iter_mut().for_each(|v| *v /= descriptor_sum);
        }

        Self {
            principal,
            weights,
            descriptor,
            contrast,
            length,
        }
    }

    pub fn contrast(&self) -> f32 {
        self.contrast
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn is_usable(&self) -> bool {
        self.contrast > MIN_CONTRAST
    }

    /// Dissimilarity in `[0, 1.36]`, or [`UNUSABLE_DIFFERENCE`].
    ///
    /// Weighted sum of the L1 distance between the normalized histograms and
    /// the weight-scaled circular distance between principal directions.
    pub fn difference(&self, other: &Vld) -> f32 {
        if !self.is_usable() || !other.is_usable() {
            return UNUSABLE_DIFFERENCE;
        }
        let l1: f32 = self
            .descriptor
            .iter()
            .zip(other.descriptor.iter())
            .map(|(a, b)| (a - b).abs())
            .sum();
        let orientation: f32 = (0..DIMENSION)
            .map(|i| {
                circular_bin_distance(self.principal[i], other.principal[i], BINS) as f32
                    * (self.weights[i] + other.weights[i])
            })
            .sum();
        DESCRIPTOR_WEIGHT * l1 + ORIENTATION_WEIGHT / BINS as f32 * orientation
    }
}
