//! The two tool pipelines: pairwise filtering and SfM match export.
pub mod export;
pub mod pair_filter;

/// Prefix of every match line printed on standard output.
pub const LINE_PREFIX: &str = "m:";

pub use export::{run_export, ExportError, ExportOptions, ExportSummary};
pub use pair_filter::{
    filter_pair, run_pair_filter, PairFilterError, PairFilterOptions, PairFilterOutput,
};
