use crate::gradient::{central_gradients, Grad};
use crate::image::{ImageF32, IntegralImage};
use log::debug;
use std::f32::consts::SQRT_2;

/// Intensity scale applied before gradients are taken, so that magnitudes
/// are expressed in 8-bit grey levels.
const INTENSITY_SCALE: f32 = 255.0;

/// Gradient maps of an image resampled at ratios `√2^k`.
///
/// Level `k` is a box-filtered copy of the input at `1 / √2^k` resolution.
/// VLD sampling picks the level whose ratio keeps the sampling disc close to
/// `radius_size` pixels.
#[derive(Clone, Debug)]
pub struct GradientScales {
    levels: Vec<Grad>,
    ratios: Vec<f32>,
    radius_size: f32,
}

impl GradientScales {
    pub const DEFAULT_RADIUS_SIZE: f32 = 1.0;

    pub fn new(image: &ImageF32) -> Self {
        Self::with_radius_size(image, Self::DEFAULT_RADIUS_SIZE)
    }

    pub fn with_radius_size(image: &ImageF32, radius_size: f32) -> Self {
        let mut scaled = image.clone();
        for v in &mut scaled.data {
            *v *= INTENSITY_SCALE;
        }
        let size = image.w.max(image.h) as f32;
        let count = if size > radius_size {
            ((size / radius_size).log2() as usize + 1).max(1)
        } else {
            1
        };

        let integral = IntegralImage::new(&scaled);
        let mut levels = Vec::with_capacity(count);
        let mut ratios = Vec::with_capacity(count);
        levels.push(central_gradients(&scaled));
        ratios.push(1.0);
        for k in 1..count {
            let ratio = level_ratio(k);
            let (w, h) = (
                (image.w as f32 / ratio) as usize,
                (image.h as f32 / ratio) as usize,
            );
            if w < 3 || h < 3 {
                break;
            }
            let mut resampled = ImageF32::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    let v = integral.box_mean(
                        (x as f64 + 0.5) * ratio as f64,
                        (y as f64 + 0.5) * ratio as f64,
                        ratio as f64,
                    );
                    resampled.set(x, y, v);
                }
            }
            levels.push(central_gradients(&resampled));
            ratios.push(ratio);
        }
        debug!(
            "GradientScales {}x{} levels={}",
            image.w,
            image.h,
            levels.len()
        );
        Self {
            levels,
            ratios,
            radius_size,
        }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Width of the full-resolution level.
    pub fn width(&self) -> usize {
        self.levels.first().map_or(0, Grad::width)
    }

    pub fn height(&self) -> usize {
        self.levels.first().map_or(0, Grad::height)
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level whose ratio brings a disc of radius `r` (input pixels) closest
    /// to `radius_size` pixels without going below it.
    pub fn index_for_radius(&self, r: f32) -> usize {
        if r <= self.radius_size {
            return 0;
        }
        let mut low = self.radius_size;
        let mut index = 0;
        while r > low * SQRT_2 {
            index += 1;
            low *= SQRT_2;
        }
        index.min(self.levels.len().saturating_sub(1))
    }

    pub fn level(&self, index: usize) -> (&Grad, f32) {
        (&self.levels[index], self.ratios[index])
    }
}

/// `√2^k`, exact on even levels.
fn level_ratio(k: usize) -> f32 {
    let octave = (1u32 << (k / 2)) as f32;
    if k % 2 == 0 {
        octave
    } else {
        octave * SQRT_2
    }
}
