use super::extrema::DiscreteKeypoint;
use crate::scale_space::Octave;
use nalgebra::{Matrix3, Vector3};

/// Sub-pixel, sub-layer keypoint location in octave coordinates.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RefinedKeypoint {
    pub octave: usize,
    /// Fractional DoG layer index.
    pub layer: f32,
    pub x: f32,
    pub y: f32,
    /// Interpolated DoG response.
    pub response: f32,
}

const MAX_OFFSET: f32 = 0.6;

fn derivatives(p: &DiscreteKeypoint, octave: &Octave) -> (Matrix3<f32>, Vector3<f32>, f32) {
    let dog = &octave.dogs[p.layer];
    let prev = &octave.dogs[p.layer - 1];
    let next = &octave.dogs[p.layer + 1];
    let (x, y) = (p.x, p.y);

    let c = dog.get(x, y);
    let (rx, lx) = (dog.get(x + 1, y), dog.get(x - 1, y));
    let (dy_, uy) = (dog.get(x, y + 1), dog.get(x, y - 1));
    let (ns, ps) = (next.get(x, y), prev.get(x, y));

    let dxx = rx + lx - 2.0 * c;
    let dyy = dy_ + uy - 2.0 * c;
    let dss = ns + ps - 2.0 * c;
    let dxy = (dog.get(x + 1, y + 1) - dog.get(x - 1, y + 1) - dog.get(x + 1, y - 1)
        + dog.get(x - 1, y - 1))
        / 4.0;
    let dxs = (next.get(x + 1, y) - next.get(x - 1, y) - prev.get(x + 1, y)
        + prev.get(x - 1, y))
        / 4.0;
    let dys = (next.get(x, y + 1) - next.get(x, y - 1) - prev.get(x, y + 1)
        + prev.get(x, y - 1))
        / 4.0;

    let hessian = Matrix3::new(dxx, dxy, dxs, dxy, dyy, dys, dxs, dys, dss);
    let gradient = Vector3::new((rx - lx) / 2.0, (dy_ - uy) / 2.0, (ns - ps) / 2.0);
    (hessian, gradient, c)
}

/// Quadratic interpolation of an extremum followed by contrast and edge tests.
///
/// The candidate moves to a neighbouring sample while the offset exceeds
/// `MAX_OFFSET` in any dimension, up to `max_steps` moves.
pub(crate) fn refine_keypoint(
    candidate: DiscreteKeypoint,
    octaves: &[Octave],
    contrast_threshold: f32,
    edge_threshold: f32,
    max_steps: usize,
) -> Option<RefinedKeypoint> {
    let octave = &octaves[candidate.octave];
    let (w, h) = (octave.width(), octave.height());
    let layers = octave.dogs.len();
    let mut point = candidate;

    for _ in 0..=max_steps {
        let (hessian, gradient, value) = derivatives(&point, octave);
        let offset = -(hessian.try_inverse()? * gradient);

        if offset.iter().all(|o| o.abs() <= MAX_OFFSET) {
            let response = value + 0.5 * gradient.dot(&offset);
            if response.abs() < contrast_threshold {
                return None;
            }
            let (dxx, dyy, dxy) = (hessian[(0, 0)], hessian[(1, 1)], hessian[(0, 1)]);
            let trace = dxx + dyy;
            let det = dxx * dyy - dxy * dxy;
            let edge_limit = (edge_threshold + 1.0).powi(2) / edge_threshold;
            if det <= 0.0 || trace * trace / det >= edge_limit {
                return None;
            }
            return Some(RefinedKeypoint {
                octave: point.octave,
                layer: point.layer as f32 + offset[2],
                x: point.x as f32 + offset[0],
                y: point.y as f32 + offset[1],
                response,
            });
        }

        let step = |o: f32| -> isize {
            if o > MAX_OFFSET {
                1
            } else if o < -MAX_OFFSET {
                -1
            } else {
                0
            }
        };
        let nx = point.x as isize + step(offset[0]);
        let ny = point.y as isize + step(offset[1]);
        let nl = point.layer as isize + step(offset[2]);
        let inside = |v: isize, len: usize| v >= 1 && v < len as isize - 1;
        if !(inside(nx, w) && inside(ny, h) && inside(nl, layers)) {
            return None;
        }
        point = DiscreteKeypoint {
            octave: point.octave,
            layer: nl as usize,
            x: nx as usize,
            y: ny as usize,
        };
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ImageF32;

    // DoG stack holding an isotropic Gaussian blob centred at (cx, cy) on
    // the middle layer, slightly weaker on the outer layers.
    fn blob_octave(cx: f32, cy: f32, amplitude: f32) -> Octave {
        let make = |scale: f32| {
            let mut img = ImageF32::new(15, 15);
            for y in 0..15 {
                for x in 0..15 {
                    let d2 = (x as f32 - cx).powi(2) + (y as f32 - cy).powi(2);
                    img.set(x, y, scale * amplitude * (-d2 / 4.0).exp());
                }
            }
            img
        };
        Octave {
            gaussians: vec![ImageF32::new(15, 15); 4],
            dogs: vec![make(0.8), make(1.0), make(0.8)],
            delta: 1.0,
            sigmas: vec![1.6; 4],
        }
    }

    #[test]
    fn refines_to_subpixel_centre() {
        let octave = blob_octave(7.3, 6.8, 0.2);
        let candidate = DiscreteKeypoint {
            octave: 0,
            layer: 1,
            x: 7,
            y: 7,
        };
        let kp = refine_keypoint(candidate, &[octave], 0.01, 10.0, 5).expect("blob refines");
        assert!((kp.x - 7.3).abs() < 0.15, "x={}", kp.x);
        assert!((kp.y - 6.8).abs() < 0.15, "y={}", kp.y);
        assert!((kp.layer - 1.0).abs() < 0.5);
        assert!(kp.response > 0.15);
    }

    #[test]
    fn low_contrast_blob_is_rejected() {
        let octave = blob_octave(7.0, 7.0, 0.005);
        let candidate = DiscreteKeypoint {
            octave: 0,
            layer: 1,
            x: 7,
            y: 7,
        };
        assert!(refine_keypoint(candidate, &[octave], 0.01, 10.0, 5).is_none());
    }
}
