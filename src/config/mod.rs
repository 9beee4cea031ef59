//! JSON configuration of the command-line tools.
pub mod pair_filter;

pub use pair_filter::{load_config, ConfigError, PairFilterConfig};
