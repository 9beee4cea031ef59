#![doc = include_str!("../README.md")]

// Tool-level surface
pub mod config;
pub mod diagnostics;
pub mod image;
pub mod pipeline;
pub mod sfm;

// Algorithm building blocks
pub mod angle;
pub mod features;
pub mod gradient;
pub mod kvld;
pub mod matching;
pub mod scale_space;

// --- High-level re-exports -------------------------------------------------

pub use crate::features::{ImageDescriber, Regions, SiftDescriber, SiftParams};
pub use crate::kvld::{kvld, KvldParameters, KvldState};
pub use crate::matching::{DistanceRatioMatcher, IndMatch, PairWiseMatches};
pub use crate::pipeline::{filter_pair, run_export, run_pair_filter};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use pairwise_matches::prelude::*;
/// use std::path::Path;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let left = load_grayscale_image(Path::new("left.png"))?.to_f32();
/// let right = load_grayscale_image(Path::new("right.png"))?.to_f32();
///
/// let describer = SiftDescriber::default();
/// let output = filter_pair(&left, &right, &describer, &PairFilterConfig::default())?;
/// for line in output.match_lines() {
///     println!("{line}");
/// }
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::config::PairFilterConfig;
    pub use crate::image::io::load_grayscale_image;
    pub use crate::image::ImageF32;
    pub use crate::{filter_pair, ImageDescriber, KvldParameters, SiftDescriber};
}
