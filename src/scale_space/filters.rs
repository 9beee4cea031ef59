use crate::image::{ImageF32, ImageView, ImageViewMut};

/// Trait implemented by separable 1D filters.
pub trait SeparableFilter {
    /// Return the 1D taps (in left-to-right order). The kernel is assumed to be
    /// centred on the middle tap.
    fn taps(&self) -> &[f32];
}

/// Sampled, normalised Gaussian kernel truncated at four standard deviations.
#[derive(Clone, Debug)]
pub struct GaussianKernel {
    sigma: f32,
    taps: Vec<f32>,
}

impl GaussianKernel {
    pub fn new(sigma: f32) -> Self {
        let sigma = sigma.max(1e-3);
        let radius = (4.0 * sigma).ceil().max(1.0) as usize;
        let denom = 2.0 * sigma * sigma;
        let mut taps: Vec<f32> = (0..=2 * radius)
            .map(|i| {
                let d = i as f32 - radius as f32;
                (-d * d / denom).exp()
            })
            .collect();
        let sum: f32 = taps.iter().sum();
        for t in &mut taps {
            *t /= sum;
        }
        Self { sigma, taps }
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }
}

impl SeparableFilter for GaussianKernel {
    #[inline]
    fn taps(&self) -> &[f32] {
        &self.taps
    }
}

/// Convolve `src` with `filter` horizontally then vertically.
pub fn apply_separable<F: SeparableFilter + ?Sized>(filter: &F, src: &ImageF32) -> ImageF32 {
    let taps = filter.taps();
    let (w, h) = (src.w, src.h);
    if w == 0 || h == 0 || taps.is_empty() {
        return src.clone();
    }
    let radius = (taps.len() / 2) as isize;

    let mut horiz = ImageF32::new(w, h);
    for y in 0..h {
        let src_row = src.row(y);
        let dst_row = horiz.row_mut(y);
        for (x, dst) in dst_row.iter_mut().enumerate() {
            let mut acc = 0.0f32;
            for (k, &t) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, w as isize - 1) as usize;
                acc += t * src_row[sx];
            }
            *dst = acc;
        }
    }

    let mut out = ImageF32::new(w, h);
    for y in 0..h {
        let dst_row = out.row_mut(y);
        for (k, &t) in taps.iter().enumerate() {
            let sy = (y as isize + k as isize - radius).clamp(0, h as isize - 1) as usize;
            let src_row = horiz.row(sy);
            for (dst, &px) in dst_row.iter_mut().zip(src_row) {
                *dst += t * px;
            }
        }
    }
    out
}

/// Blur with a Gaussian of standard deviation `sigma` (no-op for `sigma <= 0`).
pub fn gaussian_blur(src: &ImageF32, sigma: f32) -> ImageF32 {
    if sigma <= 0.0 {
        return src.clone();
    }
    apply_separable(&GaussianKernel::new(sigma), src)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kernel_is_normalised_and_symmetric() {
        let k = GaussianKernel::new(1.6);
        let taps = k.taps();
        assert_eq!(taps.len() % 2, 1);
        let sum: f32 = taps.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        for i in 0..taps.len() / 2 {
            assert!((taps[i] - taps[taps.len() - 1 - i]).abs() < 1e-7);
        }
    }

    #[test]
    fn blur_preserves_constant_image() {
        let img = ImageF32::filled(12, 9, 0.7);
        let out = gaussian_blur(&img, 2.0);
        assert!(out.data.iter().all(|&v| (v - 0.7).abs() < 1e-5));
    }

    #[test]
    fn blur_spreads_an_impulse() {
        let mut img = ImageF32::new(15, 15);
        img.set(7, 7, 1.0);
        let out = gaussian_blur(&img, 1.0);
        assert!(out.get(7, 7) < 1.0);
        assert!(out.get(8, 7) > 0.0);
        assert!((out.get(8, 7) - out.get(7, 6)).abs() < 1e-6);
        let total: f32 = out.data.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }
}
