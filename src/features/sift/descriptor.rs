use crate::angle::wrap_two_pi;
use crate::features::types::{Descriptor, DESCRIPTOR_LEN};
use crate::gradient::{Grad, UNDEFINED_ORIENTATION};
use std::f32::consts::{SQRT_2, TAU};

const SPATIAL_CELLS: usize = 4;
const ORIENTATION_BINS: usize = 8;
const CELL_WIDTH_FACTOR: f32 = 3.0;
const CLIP_VALUE: f32 = 0.2;

/// SIFT descriptor of a keypoint at `(x, y)` with blur `sigma` and
/// orientation `theta`, all in octave coordinates.
///
/// Gradients inside the rotated 4×4 cell grid are accumulated with trilinear
/// interpolation into 8 orientation bins per cell, Gaussian-weighted with a
/// standard deviation of half the grid width. The vector is L2-normalised,
/// clipped at 0.2 and normalised again; with `root_sift` it is finally
/// L1-normalised and square-rooted.
pub(crate) fn describe_keypoint(
    grad: &Grad,
    x: f32,
    y: f32,
    sigma: f32,
    theta: f32,
    root_sift: bool,
) -> Descriptor {
    let d = SPATIAL_CELLS as f32;
    let n = ORIENTATION_BINS as f32;
    let cell_width = CELL_WIDTH_FACTOR * sigma;
    let max_radius = ((grad.width().pow(2) + grad.height().pow(2)) as f32).sqrt();
    let radius = (cell_width * SQRT_2 * (d + 1.0) * 0.5).round().min(max_radius) as isize;
    let (cos_t, sin_t) = (theta.cos() / cell_width, theta.sin() / cell_width);
    let exp_scale = -1.0 / (d * d * 0.5);
    let (w, h) = (grad.width() as isize, grad.height() as isize);
    let (cx, cy) = (x.round() as isize, y.round() as isize);

    let mut hist = [0.0f32; DESCRIPTOR_LEN];
    for j in -radius..=radius {
        for i in -radius..=radius {
            let (px, py) = (cx + i, cy + j);
            if px < 1 || py < 1 || px >= w - 1 || py >= h - 1 {
                continue;
            }
            let ori = grad.ori.get(px as usize, py as usize);
            if ori == UNDEFINED_ORIENTATION {
                continue;
            }
            let dx = px as f32 - x;
            let dy = py as f32 - y;
            // keypoint frame, in cell units
            let c_rot = dx * cos_t + dy * sin_t;
            let r_rot = -dx * sin_t + dy * cos_t;
            let rbin = r_rot + d / 2.0 - 0.5;
            let cbin = c_rot + d / 2.0 - 0.5;
            if rbin <= -1.0 || rbin >= d || cbin <= -1.0 || cbin >= d {
                continue;
            }
            let weight = ((c_rot * c_rot + r_rot * r_rot) * exp_scale).exp()
                * grad.mag.get(px as usize, py as usize);
            let obin = wrap_two_pi(ori - theta) * n / TAU;
            accumulate_trilinear(&mut hist, rbin, cbin, obin, weight);
        }
    }

    normalize_l2(&mut hist);
    for v in &mut hist {
        *v = v.min(CLIP_VALUE);
    }
    normalize_l2(&mut hist);
    if root_sift {
        let l1: f32 = hist.iter().sum();
        if l1 > 0.0 {
            for v in &mut hist {
                *v = (*v / l1).sqrt();
            }
        }
    }
    hist
}

fn accumulate_trilinear(hist: &mut Descriptor, rbin: f32, cbin: f32, obin: f32, weight: f32) {
    let (r0, c0, o0) = (rbin.floor(), cbin.floor(), obin.floor());
    let (dr, dc, dor) = (rbin - r0, cbin - c0, obin - o0);
    let (r0, c0, o0) = (r0 as isize, c0 as isize, o0 as isize);

    for (ri, wr) in [(0isize, 1.0 - dr), (1, dr)] {
        let r = r0 + ri;
        if r < 0 || r >= SPATIAL_CELLS as isize {
            continue;
        }
        for (ci, wc) in [(0isize, 1.0 - dc), (1, dc)] {
            let c = c0 + ci;
            if c < 0 || c >= SPATIAL_CELLS as isize {
                continue;
            }
            for (oi, wo) in [(0isize, 1.0 - dor), (1, dor)] {
                let o = (o0 + oi).rem_euclid(ORIENTATION_BINS as isize) as usize;
                let idx = (r as usize * SPATIAL_CELLS + c as usize) * ORIENTATION_BINS + o;
                hist[idx] += weight * wr * wc * wo;
            }
        }
    }
}

fn normalize_l2(v: &mut Descriptor) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
}
