use super::timing::TimingBreakdown;
use crate::kvld::RelaxationRun;
use serde::Serialize;

/// Summary of one pairwise filter run, written as `kvld_report.json`.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PairFilterReport {
    pub left_image: String,
    pub right_image: String,
    pub describer: String,
    pub left_regions: usize,
    pub right_regions: usize,
    pub putative_matches: usize,
    pub kvld_matches: usize,
    pub inlier_ratio: f32,
    /// Whether the last K-VLD run met its inlier-rate threshold.
    pub accepted: bool,
    pub runs: Vec<RelaxationRun>,
    pub timings: TimingBreakdown,
}
