//! Putative matching and match containers.
//!
//! - `ind_match`: index correspondences and the pairwise container.
//! - `ratio`: brute-force L2 nearest neighbour with distance-ratio pruning.
//! - `io`: text match files.
//! - `draw`: side-by-side match visualisation.

pub mod draw;
pub mod ind_match;
pub mod io;
pub mod ratio;

pub use draw::{save_matches_svg, SvgView};
pub use ind_match::{IndMatch, IndexT, Pair, PairWiseMatches};
pub use io::{load_matches, save_matches, MatchIoError};
pub use ratio::{DistanceRatioMatcher, RatioMatcherParams};
