use std::path::Path;

/// Small deterministic LCG so fixtures do not depend on a RNG crate.
struct Lcg(u64);

impl Lcg {
    fn next_f32(&mut self) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 40) as f32) / (1u64 << 24) as f32
    }

    fn range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }
}

/// Mid-grey image covered by overlapping anisotropic Gaussian blobs of both
/// polarities. Every neighbourhood looks different, which keeps the ratio
/// test from discarding most matches.
pub fn blob_texture_u8(width: usize, height: usize, blobs: usize, seed: u64) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");
    let mut rng = Lcg(seed);
    let params: Vec<_> = (0..blobs)
        .map(|_| {
            (
                rng.range(0.0, width as f32),
                rng.range(0.0, height as f32),
                rng.range(1.5, 6.0),
                rng.range(1.5, 6.0),
                rng.range(-90.0, 90.0),
            )
        })
        .collect();

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        for x in 0..width {
            let mut v = 128.0f32;
            for &(cx, cy, sx, sy, amp) in &params {
                let dx = (x as f32 - cx) / sx;
                let dy = (y as f32 - cy) / sy;
                let d2 = dx * dx + dy * dy;
                if d2 < 16.0 {
                    v += amp * (-0.5 * d2).exp();
                }
            }
            img[y * width + x] = v.clamp(0.0, 255.0) as u8;
        }
    }
    img
}

/// Translate by `(dx, dy)` pixels; uncovered pixels become mid-grey.
pub fn shift_u8(src: &[u8], width: usize, height: usize, dx: isize, dy: isize) -> Vec<u8> {
    let mut out = vec![128u8; width * height];
    for y in 0..height as isize {
        for x in 0..width as isize {
            let (sx, sy) = (x - dx, y - dy);
            if sx >= 0 && sy >= 0 && sx < width as isize && sy < height as isize {
                out[(y as usize) * width + x as usize] = src[(sy as usize) * width + sx as usize];
            }
        }
    }
    out
}

pub fn save_png(path: &Path, width: usize, height: usize, data: Vec<u8>) {
    let img = image::GrayImage::from_raw(width as u32, height as u32, data)
        .expect("buffer matches dimensions");
    img.save(path).expect("write png");
}
