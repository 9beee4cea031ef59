//! Summed-area table over an `ImageF32`.
//!
//! Used to resample an image at non-dyadic ratios: a box average of side
//! `ratio` centred anywhere costs four lookups.
use super::{ImageF32, ImageView};

#[derive(Clone, Debug)]
pub struct IntegralImage {
    w: usize,
    h: usize,
    // (w + 1) × (h + 1) table, first row/column zero
    table: Vec<f64>,
}

impl IntegralImage {
    pub fn new(image: &ImageF32) -> Self {
        let (w, h) = (image.w, image.h);
        let tw = w + 1;
        let mut table = vec![0.0f64; tw * (h + 1)];
        for y in 0..h {
            let mut row_sum = 0.0f64;
            for (x, &px) in image.row(y).iter().enumerate() {
                row_sum += px as f64;
                table[(y + 1) * tw + x + 1] = table[y * tw + x + 1] + row_sum;
            }
        }
        Self { w, h, table }
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    #[inline]
    fn at(&self, x: usize, y: usize) -> f64 {
        self.table[y * (self.w + 1) + x]
    }

    /// Sum over the half-open pixel rectangle `[x0, x1) × [y0, y1)`, clipped to
    /// the image.
    pub fn rect_sum(&self, x0: isize, y0: isize, x1: isize, y1: isize) -> f64 {
        let cx = |v: isize| v.clamp(0, self.w as isize) as usize;
        let cy = |v: isize| v.clamp(0, self.h as isize) as usize;
        let (x0, x1, y0, y1) = (cx(x0), cx(x1), cy(y0), cy(y1));
        if x1 <= x0 || y1 <= y0 {
            return 0.0;
        }
        self.at(x1, y1) - self.at(x0, y1) - self.at(x1, y0) + self.at(x0, y0)
    }

    /// Mean intensity of the `side × side` box centred at `(cx, cy)`.
    pub fn box_mean(&self, cx: f64, cy: f64, side: f64) -> f32 {
        let half = side * 0.5;
        let x0 = (cx - half).floor() as isize;
        let y0 = (cy - half).floor() as isize;
        let x1 = (cx + half).ceil() as isize;
        let y1 = (cy + half).ceil() as isize;
        let clip_x = (x1.min(self.w as isize) - x0.max(0)).max(0);
        let clip_y = (y1.min(self.h as isize) - y0.max(0)).max(0);
        let area = (clip_x * clip_y) as f64;
        if area <= 0.0 {
            return 0.0;
        }
        (self.rect_sum(x0, y0, x1, y1) / area) as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_sum_of_constant_image() {
        let img = ImageF32::filled(6, 4, 0.5);
        let ii = IntegralImage::new(&img);
        assert!((ii.rect_sum(0, 0, 6, 4) - 12.0).abs() < 1e-9);
        assert!((ii.rect_sum(1, 1, 3, 2) - 1.0).abs() < 1e-9);
        // clipped at the border
        assert!((ii.rect_sum(-5, -5, 2, 2) - 2.0).abs() < 1e-9);
        assert!((ii.box_mean(3.0, 2.0, 2.0) - 0.5).abs() < 1e-6);
    }
}
