//! Owned single-channel f32 image in row-major layout (stride == width).
//!
//! Working type for the scale space, gradient maps and descriptor sampling.
//! Out-of-range reads through `get_clamped` and `sample_bilinear` replicate
//! the border.
use super::{ImageView, ImageViewMut};

#[derive(Clone, Debug)]
pub struct ImageF32 {
    /// Image width in pixels
    pub w: usize,
    /// Image height in pixels
    pub h: usize,
    /// Number of f32 elements between consecutive rows (equals `w`)
    pub stride: usize,
    /// Backing storage in row-major order
    pub data: Vec<f32>,
}

impl ImageF32 {
    /// Construct a zero-initialized buffer of size `w × h`.
    pub fn new(w: usize, h: usize) -> Self {
        Self::filled(w, h, 0.0)
    }

    pub fn filled(w: usize, h: usize, value: f32) -> Self {
        Self {
            w,
            h,
            stride: w,
            data: vec![value; w * h],
        }
    }

    /// Wrap an existing row-major buffer. Returns `None` on a size mismatch.
    pub fn from_vec(w: usize, h: usize, data: Vec<f32>) -> Option<Self> {
        (data.len() == w * h).then_some(Self {
            w,
            h,
            stride: w,
            data,
        })
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.stride + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.data[self.idx(x, y)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: f32) {
        let i = self.idx(x, y);
        self.data[i] = v;
    }

    /// Pixel lookup with replicated border. Panics on an empty image.
    #[inline]
    pub fn get_clamped(&self, x: isize, y: isize) -> f32 {
        let cx = x.clamp(0, self.w as isize - 1) as usize;
        let cy = y.clamp(0, self.h as isize - 1) as usize;
        self.get(cx, cy)
    }

    /// Bilinear interpolation at a sub-pixel location (pixel centres on integers).
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (ix, iy) = (x0 as isize, y0 as isize);
        let top = self.get_clamped(ix, iy) * (1.0 - fx) + self.get_clamped(ix + 1, iy) * fx;
        let bottom =
            self.get_clamped(ix, iy + 1) * (1.0 - fx) + self.get_clamped(ix + 1, iy + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }

    /// Keep every second pixel in both directions.
    pub fn downsample_half(&self) -> Self {
        let (nw, nh) = (self.w / 2, self.h / 2);
        let mut out = Self::new(nw, nh);
        for y in 0..nh {
            let src = self.row(2 * y);
            for (x, dst) in out.row_mut(y).iter_mut().enumerate() {
                *dst = src[2 * x];
            }
        }
        out
    }

    /// Double the resolution with bilinear interpolation.
    pub fn upsample_double(&self) -> Self {
        let (nw, nh) = (self.w * 2, self.h * 2);
        let mut out = Self::new(nw, nh);
        for y in 0..nh {
            let sy = y as f32 * 0.5;
            for x in 0..nw {
                let v = self.sample_bilinear(x as f32 * 0.5, sy);
                out.set(x, y, v);
            }
        }
        out
    }

    /// Pixel-wise `self - other`. Both images must share dimensions.
    pub fn difference(&self, other: &ImageF32) -> Self {
        assert_eq!((self.w, self.h), (other.w, other.h), "dimension mismatch");
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| a - b)
            .collect();
        Self {
            w: self.w,
            h: self.h,
            stride: self.w,
            data,
        }
    }
}

impl ImageView for ImageF32 {
    type Pixel = f32;

    #[inline]
    fn width(&self) -> usize {
        self.w
    }
    #[inline]
    fn height(&self) -> usize {
        self.h
    }
    #[inline]
    fn stride(&self) -> usize {
        self.stride
    }
    #[inline]
    fn row(&self, y: usize) -> &[f32] {
        let start = y * self.stride;
        &self.data[start..start + self.w]
    }
}

impl ImageViewMut for ImageF32 {
    #[inline]
    fn row_mut(&mut self, y: usize) -> &mut [f32] {
        let start = y * self.stride;
        let end = start + self.w;
        &mut self.data[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(w: usize, h: usize) -> ImageF32 {
        let mut img = ImageF32::new(w, h);
        for y in 0..h {
            for x in 0..w {
                img.set(x, y, x as f32 + 10.0 * y as f32);
            }
        }
        img
    }

    #[test]
    fn bilinear_matches_linear_ramp() {
        let img = ramp(8, 8);
        assert!((img.sample_bilinear(2.5, 3.25) - 35.0).abs() < 1e-4);
        // clamped outside the image
        assert_eq!(img.sample_bilinear(-3.0, 0.0), 0.0);
    }

    #[test]
    fn half_and_double_sizes() {
        let img = ramp(9, 6);
        let half = img.downsample_half();
        assert_eq!((half.w, half.h), (4, 3));
        assert_eq!(half.get(1, 1), img.get(2, 2));
        let double = img.upsample_double();
        assert_eq!((double.w, double.h), (18, 12));
        assert_eq!(double.get(4, 2), img.get(2, 1));
    }

    #[test]
    fn from_vec_rejects_bad_length() {
        assert!(ImageF32::from_vec(3, 3, vec![0.0; 8]).is_none());
        assert!(ImageF32::from_vec(3, 3, vec![0.0; 9]).is_some());
    }
}
