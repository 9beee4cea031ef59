//! Timing and run reports emitted by the tools in debug mode.

pub mod report;
pub mod timing;

pub use report::PairFilterReport;
pub use timing::{StageTiming, TimingBreakdown};
