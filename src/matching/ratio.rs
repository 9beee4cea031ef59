//! Brute-force L2 nearest-neighbour matching with Lowe's distance-ratio test.
//!
//! Distances are squared Euclidean, so the ratio is squared before the
//! comparison: a match `(i, j)` is kept when
//! `d²(i, j) < ratio² · d²(i, second best)`.
use super::ind_match::{IndMatch, IndexT};
use crate::features::{Descriptor, Regions};
use log::debug;
use serde::Deserialize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct RatioMatcherParams {
    /// Distance ratio between the best and second best candidate.
    pub ratio: f32,
}

impl Default for RatioMatcherParams {
    fn default() -> Self {
        Self { ratio: 0.8 }
    }
}

#[inline]
fn squared_l2(a: &Descriptor, b: &Descriptor) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

/// Best and second best squared distances from `query` into `candidates`.
fn two_nearest(query: &Descriptor, candidates: &[Descriptor]) -> Option<(usize, f32, f32)> {
    let mut best: Option<(usize, f32)> = None;
    let mut second = f32::INFINITY;
    for (idx, c) in candidates.iter().enumerate() {
        let d = squared_l2(query, c);
        match best {
            Some((_, bd)) if d >= bd => {
                if d < second {
                    second = d;
                }
            }
            Some((_, bd)) => {
                second = bd;
                best = Some((idx, d));
            }
            None => best = Some((idx, d)),
        }
    }
    best.map(|(idx, d)| (idx, d, second))
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DistanceRatioMatcher {
    params: RatioMatcherParams,
}

impl DistanceRatioMatcher {
    pub fn new(params: RatioMatcherParams) -> Self {
        Self { params }
    }

    fn match_one(&self, i: usize, query: &Descriptor, right: &[Descriptor]) -> Option<IndMatch> {
        let ratio_sq = self.params.ratio * self.params.ratio;
        let (j, best, second) = two_nearest(query, right)?;
        // A lone candidate has no second neighbour to compare against.
        (second.is_finite() && best < ratio_sq * second)
            .then(|| IndMatch::new(i as IndexT, j as IndexT))
    }

    /// Putative matches from every left region to its nearest right region.
    pub fn match_regions(&self, left: &Regions, right: &Regions) -> Vec<IndMatch> {
        if left.is_empty() || right.len() < 2 {
            return Vec::new();
        }
        let rd = &right.descriptors;

        #[cfg(feature = "parallel")]
        let mut matches: Vec<IndMatch> = left
            .descriptors
            .par_iter()
            .enumerate()
            .filter_map(|(i, q)| self.match_one(i, q, rd))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let mut matches: Vec<IndMatch> = left
            .descriptors
            .iter()
            .enumerate()
            .filter_map(|(i, q)| self.match_one(i, q, rd))
            .collect();

        IndMatch::deduplicate(&mut matches);
        debug!(
            "DistanceRatioMatcher left={} right={} kept={} ratio={}",
            left.len(),
            right.len(),
            matches.len(),
            self.params.ratio
        );
        matches
    }
}
