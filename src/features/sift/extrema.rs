use crate::image::ImageF32;
use crate::scale_space::Octave;

/// Integer scale-space location of a DoG extremum.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct DiscreteKeypoint {
    pub octave: usize,
    /// DoG layer index within the octave.
    pub layer: usize,
    pub x: usize,
    pub y: usize,
}

fn is_extremum(dogs: &[ImageF32], layer: usize, x: usize, y: usize) -> bool {
    let current = dogs[layer].get(x, y);
    let is_max = current > 0.0;
    for dl in [layer - 1, layer, layer + 1] {
        let dog = &dogs[dl];
        for yy in y - 1..=y + 1 {
            for xx in x - 1..=x + 1 {
                if dl == layer && xx == x && yy == y {
                    continue;
                }
                let v = dog.get(xx, yy);
                if (is_max && v >= current) || (!is_max && v <= current) {
                    return false;
                }
            }
        }
    }
    true
}

/// Strict 26-neighbour extrema of the DoG stack whose magnitude reaches
/// `pre_threshold`. Border pixels and the first/last DoG layers are skipped.
pub(crate) fn find_extrema(
    octaves: &[Octave],
    pre_threshold: f32,
) -> Vec<DiscreteKeypoint> {
    let mut candidates = Vec::new();
    for (octave_idx, octave) in octaves.iter().enumerate() {
        let dogs = &octave.dogs;
        if dogs.len() < 3 {
            continue;
        }
        let (w, h) = (octave.width(), octave.height());
        if w < 3 || h < 3 {
            continue;
        }
        for layer in 1..dogs.len() - 1 {
            for y in 1..h - 1 {
                for x in 1..w - 1 {
                    if dogs[layer].get(x, y).abs() < pre_threshold {
                        continue;
                    }
                    if is_extremum(dogs, layer, x, y) {
                        candidates.push(DiscreteKeypoint {
                            octave: octave_idx,
                            layer,
                            x,
                            y,
                        });
                    }
                }
            }
        }
    }
    candidates
}
