//! Gaussian scale space with difference-of-Gaussians layers.
//!
//! The input (float, `[0, 1]`) is optionally upsampled 2× (first octave −1),
//! blurred to the nominal base blur and then, per octave, blurred in
//! `scales_per_octave + 3` steps of ratio `2^(1/S)`. Adjacent layers are
//! subtracted to form `S + 2` DoG images. The layer with twice the base blur
//! seeds the next octave after 2× decimation.
//!
//! Border samples clamp to the image extents.

pub mod filters;
pub mod octaves;
pub mod options;

pub use filters::{apply_separable, GaussianKernel, SeparableFilter};
pub use octaves::{Octave, ScaleSpace};
pub use options::ScaleSpaceOptions;
