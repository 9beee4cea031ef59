use super::filters::gaussian_blur;
use super::options::ScaleSpaceOptions;
use crate::image::ImageF32;
use log::debug;

/// One octave of Gaussian layers and their differences.
#[derive(Clone, Debug)]
pub struct Octave {
    /// The `S + 3` blurred images
    pub gaussians: Vec<ImageF32>,
    /// The `S + 2` differences of consecutive Gaussian layers
    pub dogs: Vec<ImageF32>,
    /// Pixel spacing of this octave measured in input pixels.
    pub delta: f32,
    /// Blur of each Gaussian layer in octave pixels.
    pub sigmas: Vec<f32>,
}

impl Octave {
    pub fn width(&self) -> usize {
        self.gaussians.first().map_or(0, |g| g.w)
    }

    pub fn height(&self) -> usize {
        self.gaussians.first().map_or(0, |g| g.h)
    }

    /// Convert a (possibly fractional) layer index into a blur in octave pixels.
    pub fn sigma_at(&self, layer: f32, sigma_min: f32, ratio: f32) -> f32 {
        sigma_min * ratio.powf(layer)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ScaleSpace {
    pub octaves: Vec<Octave>,
}

impl ScaleSpace {
    pub fn build(image: &ImageF32, options: &ScaleSpaceOptions) -> Self {
        let s = options.scales_per_octave.max(1);
        let ratio = options.layer_ratio();
        let min_size = options.min_octave_size.max(4);

        let (mut base, mut delta) = match options.first_octave {
            o if o < 0 => (image.upsample_double(), 0.5f32),
            0 => (image.clone(), 1.0f32),
            o => {
                let mut img = image.clone();
                for _ in 0..o {
                    img = img.downsample_half();
                }
                (img, 2f32.powi(o))
            }
        };

        // Bring the first layer from the assumed input blur to sigma_min.
        let sigma_have = options.sigma_in / delta;
        let sigma_extra = (options.sigma_min.powi(2) - sigma_have.powi(2)).max(0.0).sqrt();
        base = gaussian_blur(&base, sigma_extra);

        let mut octaves = Vec::new();
        while octaves.len() < options.max_octaves && base.w >= min_size && base.h >= min_size {
            let mut gaussians = Vec::with_capacity(s + 3);
            let mut sigmas = Vec::with_capacity(s + 3);
            gaussians.push(base);
            sigmas.push(options.sigma_min);
            for layer in 1..s + 3 {
                let prev_sigma = sigmas[layer - 1];
                let sigma = prev_sigma * ratio;
                let step = (sigma * sigma - prev_sigma * prev_sigma).sqrt();
                let next = gaussian_blur(&gaussians[layer - 1], step);
                gaussians.push(next);
                sigmas.push(sigma);
            }
            let dogs = gaussians
                .windows(2)
                .map(|pair| pair[1].difference(&pair[0]))
                .collect();

            base = gaussians[s].downsample_half();
            debug!(
                "ScaleSpace octave {} size={}x{} delta={}",
                octaves.len(),
                gaussians[0].w,
                gaussians[0].h,
                delta
            );
            octaves.push(Octave {
                gaussians,
                dogs,
                delta,
                sigmas,
            });
            delta *= 2.0;
        }

        Self { octaves }
    }

    pub fn is_empty(&self) -> bool {
        self.octaves.is_empty()
    }
}
