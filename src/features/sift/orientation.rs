use crate::angle::wrap_two_pi;
use crate::gradient::{Grad, UNDEFINED_ORIENTATION};
use std::f32::consts::TAU;

const ORIENTATION_BINS: usize = 36;
const SMOOTHING_PASSES: usize = 6;
const WINDOW_FACTOR: f32 = 1.5;
const PEAK_RATIO: f32 = 0.8;

/// Dominant gradient directions around `(x, y)` (octave pixels) for a
/// keypoint of blur `sigma` (octave pixels).
///
/// Every local maximum of the smoothed 36-bin histogram reaching 80% of the
/// global maximum yields one orientation, refined by parabolic interpolation.
pub(crate) fn dominant_orientations(grad: &Grad, x: f32, y: f32, sigma: f32) -> Vec<f32> {
    let sigma_w = WINDOW_FACTOR * sigma;
    let radius = (3.0 * sigma_w).round() as isize;
    let (w, h) = (grad.width() as isize, grad.height() as isize);
    let (cx, cy) = (x.round() as isize, y.round() as isize);
    let denom = 2.0 * sigma_w * sigma_w;

    let mut hist = [0.0f32; ORIENTATION_BINS];
    for py in (cy - radius).max(1)..=(cy + radius).min(h - 2) {
        for px in (cx - radius).max(1)..=(cx + radius).min(w - 2) {
            let ori = grad.ori.get(px as usize, py as usize);
            if ori == UNDEFINED_ORIENTATION {
                continue;
            }
            let dx = px as f32 - x;
            let dy = py as f32 - y;
            let weight = (-(dx * dx + dy * dy) / denom).exp() * grad.mag.get(px as usize, py as usize);
            let bin = ((ori * ORIENTATION_BINS as f32 / TAU) as usize).min(ORIENTATION_BINS - 1);
            hist[bin] += weight;
        }
    }

    for _ in 0..SMOOTHING_PASSES {
        let prev = hist;
        for i in 0..ORIENTATION_BINS {
            let l = prev[(i + ORIENTATION_BINS - 1) % ORIENTATION_BINS];
            let r = prev[(i + 1) % ORIENTATION_BINS];
            hist[i] = (l + prev[i] + r) / 3.0;
        }
    }

    let max = hist.iter().copied().fold(0.0f32, f32::max);
    if max <= 0.0 {
        return Vec::new();
    }

    let mut orientations = Vec::new();
    for i in 0..ORIENTATION_BINS {
        let l = hist[(i + ORIENTATION_BINS - 1) % ORIENTATION_BINS];
        let c = hist[i];
        let r = hist[(i + 1) % ORIENTATION_BINS];
        if c > l && c > r && c >= PEAK_RATIO * max {
            let curvature = l - 2.0 * c + r;
            let offset = if curvature != 0.0 {
                0.5 * (l - r) / curvature
            } else {
                0.0
            };
            let angle = (i as f32 + 0.5 + offset) * TAU / ORIENTATION_BINS as f32;
            orientations.push(wrap_two_pi(angle));
        }
    }
    orientations
}
