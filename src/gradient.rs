//! Central-difference image gradients with magnitude and orientation.
//!
//! - `gx = I(x+1, y) - I(x-1, y)`, `gy = I(x, y+1) - I(x, y-1)`.
//! - Orientation is the direction of `(gx, gy)` in [0, 2π); pixels with a zero
//!   gradient (and the one-pixel frame, which is left at zero) carry
//!   `UNDEFINED_ORIENTATION`.
//!
//! The SIFT describer consumes these maps per Gaussian layer and the K-VLD
//! filter per resampled scale.
use crate::angle::angle_from;
use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Sentinel stored in `Grad::ori` where the direction is undefined.
pub const UNDEFINED_ORIENTATION: f32 = -1.0;

/// Per-pixel gradient magnitude and orientation.
#[derive(Clone, Debug)]
pub struct Grad {
    /// Euclidean magnitude per pixel: `sqrt(gx^2 + gy^2)`
    pub mag: ImageF32,
    /// Direction in [0, 2π) or `UNDEFINED_ORIENTATION`
    pub ori: ImageF32,
}

impl Grad {
    pub fn width(&self) -> usize {
        self.mag.w
    }

    pub fn height(&self) -> usize {
        self.mag.h
    }
}

/// Compute central-difference gradients on a single-channel float image.
pub fn central_gradients(l: &ImageF32) -> Grad {
    let (w, h) = (l.w, l.h);
    let mut mag = ImageF32::new(w, h);
    let mut ori = ImageF32::filled(w, h, UNDEFINED_ORIENTATION);
    if w < 3 || h < 3 {
        return Grad { mag, ori };
    }

    for y in 1..h - 1 {
        let above = l.row(y - 1);
        let centre = l.row(y);
        let below = l.row(y + 1);
        let out_mag = mag.row_mut(y);
        let out_ori = ori.row_mut(y);
        for x in 1..w - 1 {
            let gx = centre[x + 1] - centre[x - 1];
            let gy = below[x] - above[x];
            out_mag[x] = (gx * gx + gy * gy).sqrt();
            out_ori[x] = angle_from(gx, gy).unwrap_or(UNDEFINED_ORIENTATION);
        }
    }

    Grad { mag, ori }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_ramp_points_right() {
        let mut img = ImageF32::new(5, 5);
        for y in 0..5 {
            for x in 0..5 {
                img.set(x, y, x as f32 * 0.1);
            }
        }
        let g = central_gradients(&img);
        assert!((g.mag.get(2, 2) - 0.2).abs() < 1e-6);
        assert!(g.ori.get(2, 2).abs() < 1e-6);
        // frame stays undefined
        assert_eq!(g.ori.get(0, 2), UNDEFINED_ORIENTATION);
        assert_eq!(g.mag.get(4, 4), 0.0);
    }

    #[test]
    fn flat_image_has_undefined_orientation() {
        let img = ImageF32::filled(6, 6, 0.3);
        let g = central_gradients(&img);
        assert!(g.mag.data.iter().all(|&m| m == 0.0));
        assert!(g.ori.data.iter().all(|&o| o == UNDEFINED_ORIENTATION));
    }
}
