//! K-VLD: graph-based geometric consistency filter for putative matches.
//!
//! Two matches are neighbours when their keypoints are close in at least one
//! image. A neighbour pair is consistent when the virtual line descriptors
//! joining the keypoints in each image agree (and, optionally, when the
//! similarities carried by the two matches predict each other's segment). A
//! match survives when it keeps at least `k` consistent neighbours; the
//! elimination is repeated until no match changes state.
//!
//! Pairwise scores are cached in a [`KvldState`] consistency matrix so that
//! relaxed re-runs only evaluate newly reachable pairs.
pub mod geometry;
pub mod relax;
pub mod scale;
pub mod vld;

pub use geometry::{geometric_inconsistency, neighbourhood_range};
pub use relax::{relax, Relaxation, RelaxationRun, MAX_RUNS, RELAXED_K};
pub use scale::GradientScales;
pub use vld::Vld;

use crate::features::ScaledOrientedFeature;
use crate::matching::IndMatch;
use log::{debug, warn};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum keypoint separation, in pixels, for two matches to be neighbours.
pub const MIN_DIST: f32 = 10.0;
/// Maximum VLD difference of a consistent pair.
pub const JUDGE: f32 = 0.35;
/// Maximum geometric inconsistency of a consistent pair.
pub const DISTANCE_THRES: f32 = 0.5;

/// Matrix entry of a pair that has not been evaluated.
pub const UNKNOWN: f32 = -1.0;
/// Matrix entry of a pair judged inconsistent.
pub const REJECTED: f32 = -2.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KvldParameters {
    /// Expected fraction of correct matches; sets the neighbourhood radius.
    pub inlier_rate: f32,
    /// Consistent neighbours a match needs to survive.
    pub k: usize,
    /// Also require geometric agreement of the keypoint similarities.
    pub geometry: bool,
}

impl Default for KvldParameters {
    fn default() -> Self {
        Self {
            inlier_rate: 0.04,
            k: 3,
            geometry: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum KvldError {
    #[error("match {match_index} references feature {feature} but view {view} has {count} features")]
    FeatureIndex {
        match_index: usize,
        view: usize,
        feature: u32,
        count: usize,
    },
}

/// One image as seen by the filter.
#[derive(Clone, Copy, Debug)]
pub struct KvldView<'a> {
    pub scales: &'a GradientScales,
    pub features: &'a [ScaledOrientedFeature],
}

/// Consistency matrix and validity flags over a fixed set of matches.
#[derive(Clone, Debug)]
pub struct KvldState {
    consistency: DMatrix<f32>,
    valid: Vec<bool>,
}

impl KvldState {
    pub fn new(match_count: usize) -> Self {
        Self {
            consistency: DMatrix::from_element(match_count, match_count, UNKNOWN),
            valid: vec![true; match_count],
        }
    }

    pub fn len(&self) -> usize {
        self.valid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid.is_empty()
    }

    /// Marks every match valid again; cached scores are kept.
    pub fn rearm(&mut self) {
        self.valid.iter_mut().for_each(|v| *v = true);
    }

    pub fn consistency(&self) -> &DMatrix<f32> {
        &self.consistency
    }

    pub fn valid(&self) -> &[bool] {
        &self.valid
    }

    fn set_pair(&mut self, a: usize, b: usize, value: f32) {
        self.consistency[(a, b)] = value;
        self.consistency[(b, a)] = value;
    }
}

#[derive(Clone, Debug, Default)]
pub struct KvldOutcome {
    /// Surviving matches, in input order.
    pub matches: Vec<IndMatch>,
    /// Consistent-neighbour count of each surviving match.
    pub support: Vec<usize>,
    /// `matches.len() / input length`, `0` for an empty input.
    pub inlier_ratio: f32,
}

/// Filters `matches` between `left` and `right`, updating `state` in place.
///
/// `state` must have been created for `matches`; a state of the wrong size
/// is replaced by a fresh one. Matches already flagged invalid in `state`
/// stay invalid.
pub fn kvld(
    left: KvldView<'_>,
    right: KvldView<'_>,
    matches: &[IndMatch],
    params: &KvldParameters,
    state: &mut KvldState,
) -> Result<KvldOutcome, KvldError> {
    let n = matches.len();
    if state.len() != n {
        warn!(
            "K-VLD state sized for {} matches, got {}; resetting",
            state.len(),
            n
        );
        *state = KvldState::new(n);
    }
    if n == 0 {
        return Ok(KvldOutcome::default());
    }

    let mut ends = Vec::with_capacity(n);
    for (idx, m) in matches.iter().enumerate() {
        let a = lookup(left.features, 0, idx, m.i)?;
        let b = lookup(right.features, 1, idx, m.j)?;
        ends.push((a, b));
    }

    let range_left = neighbourhood_range(
        left.scales.width(),
        left.scales.height(),
        params.inlier_rate,
        left.features.len().min(n),
    );
    let range_right = neighbourhood_range(
        right.scales.width(),
        right.scales.height(),
        params.inlier_rate,
        right.features.len().min(n),
    );
    debug!(
        "K-VLD n={} rate={} k={} range=({:.1}, {:.1})",
        n, params.inlier_rate, params.k, range_left, range_right
    );

    // one-to-many matches are ambiguous
    for a in 0..n {
        for b in a + 1..n {
            if matches[a].i == matches[b].i || matches[a].j == matches[b].j {
                state.valid[a] = false;
                state.valid[b] = false;
                state.set_pair(a, b, REJECTED);
            }
        }
    }

    let mut support = vec![0usize; n];
    loop {
        support.iter_mut().for_each(|s| *s = 0);
        for a in 0..n {
            if !state.valid[a] {
                continue;
            }
            for b in a + 1..n {
                if !state.valid[b] {
                    continue;
                }
                let (a1, a2) = (ends[a].0, ends[b].0);
                let (b1, b2) = (ends[a].1, ends[b].1);
                let d1 = a1.distance(a2);
                let d2 = b1.distance(b2);
                let neighbours =
                    d1 > MIN_DIST && d2 > MIN_DIST && (d1 < range_left || d2 < range_right);
                if !neighbours {
                    continue;
                }
                if state.consistency[(a, b)] == UNKNOWN {
                    let score = pair_score(left.scales, right.scales, (a1, a2), (b1, b2), params);
                    state.set_pair(a, b, score);
                }
                if state.consistency[(a, b)] >= 0.0 {
                    support[a] += 1;
                    support[b] += 1;
                }
            }
        }

        let mut changed = false;
        for (valid, &count) in state.valid.iter_mut().zip(support.iter()) {
            if *valid && count < params.k {
                *valid = false;
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }

    let mut outcome = KvldOutcome::default();
    for (idx, m) in matches.iter().enumerate() {
        if state.valid[idx] {
            outcome.matches.push(*m);
            outcome.support.push(support[idx]);
        }
    }
    outcome.inlier_ratio = outcome.matches.len() as f32 / n as f32;
    debug!(
        "K-VLD kept {}/{} (ratio {:.4})",
        outcome.matches.len(),
        n,
        outcome.inlier_ratio
    );
    Ok(outcome)
}

fn lookup(
    features: &[ScaledOrientedFeature],
    view: usize,
    match_index: usize,
    feature: u32,
) -> Result<&ScaledOrientedFeature, KvldError> {
    features
        .get(feature as usize)
        .ok_or(KvldError::FeatureIndex {
            match_index,
            view,
            feature,
            count: features.len(),
        })
}

/// VLD difference of the two segments, or [`REJECTED`].
fn pair_score(
    left: &GradientScales,
    right: &GradientScales,
    (a1, a2): (&ScaledOrientedFeature, &ScaledOrientedFeature),
    (b1, b2): (&ScaledOrientedFeature, &ScaledOrientedFeature),
    params: &KvldParameters,
) -> f32 {
    if params.geometry && geometric_inconsistency(a1, a2, b1, b2) >= DISTANCE_THRES {
        return REJECTED;
    }
    let vld_left = Vld::new(left, a1.position(), a2.position());
    let vld_right = Vld::new(right, b1.position(), b2.position());
    let diff = vld_left.difference(&vld_right);
    if diff < JUDGE {
        diff
    } else {
        REJECTED
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::textured;
    use super::*;

    fn grid_features(w: usize, h: usize, step: usize) -> Vec<ScaledOrientedFeature> {
        let mut out = Vec::new();
        for y in (step..h - step).step_by(step) {
            for x in (step..w - step).step_by(step) {
                out.push(ScaledOrientedFeature {
                    x: x as f32,
                    y: y as f32,
                    scale: 2.0,
                    orientation: 0.5,
                });
            }
        }
        out
    }

    fn shifted(features: &[ScaledOrientedFeature], dx: f32, dy: f32) -> Vec<ScaledOrientedFeature> {
        features
            .iter()
            .map(|f| ScaledOrientedFeature {
                x: f.x + dx,
                y: f.y + dy,
                ..*f
            })
            .collect()
    }

    fn shift_image(img: &crate::image::ImageF32, dx: usize, dy: usize) -> crate::image::ImageF32 {
        let mut out = crate::image::ImageF32::new(img.w, img.h);
        for y in 0..img.h {
            for x in 0..img.w {
                let sx = x as isize - dx as isize;
                let sy = y as isize - dy as isize;
                out.set(x, y, img.get_clamped(sx, sy));
            }
        }
        out
    }

    #[test]
    fn keeps_translation_consistent_matches() {
        let _ = env_logger::builder().is_test(true).try_init();
        let img = textured(128, 128, 3);
        let moved = shift_image(&img, 6, 4);
        let (s1, s2) = (GradientScales::new(&img), GradientScales::new(&moved));
        let f1 = grid_features(110, 110, 16);
        let f2 = shifted(&f1, 6.0, 4.0);
        let matches: Vec<IndMatch> = (0..f1.len() as u32).map(|i| IndMatch::new(i, i)).collect();

        let mut state = KvldState::new(matches.len());
        let out = kvld(
            KvldView { scales: &s1, features: &f1 },
            KvldView { scales: &s2, features: &f2 },
            &matches,
            &KvldParameters::default(),
            &mut state,
        )
        .unwrap();
        assert!(out.inlier_ratio > 0.6, "ratio={}", out.inlier_ratio);
        assert!(out.support.iter().all(|&s| s >= 3));
        assert!(state.consistency().iter().any(|&v| v >= 0.0));
    }

    #[test]
    fn rejects_scrambled_matches() {
        let img = textured(128, 128, 4);
        let s = GradientScales::new(&img);
        let f = grid_features(128, 128, 16);
        let n = f.len() as u32;
        // derangement with a large stride so neighbours do not stay neighbours
        let matches: Vec<IndMatch> = (0..n).map(|i| IndMatch::new(i, (i * 17 + 5) % n)).collect();
        let mut state = KvldState::new(matches.len());
        let view = KvldView { scales: &s, features: &f };
        let out = kvld(view, view, &matches, &KvldParameters::default(), &mut state).unwrap();
        assert!(out.inlier_ratio < 0.2, "ratio={}", out.inlier_ratio);
    }

    #[test]
    fn one_to_many_matches_are_rejected() {
        let img = textured(96, 96, 5);
        let s = GradientScales::new(&img);
        let f = grid_features(96, 96, 16);
        let matches = vec![IndMatch::new(0, 1), IndMatch::new(2, 1), IndMatch::new(3, 3)];
        let mut state = KvldState::new(matches.len());
        let view = KvldView { scales: &s, features: &f };
        let _ = kvld(view, view, &matches, &KvldParameters::default(), &mut state).unwrap();
        assert!(!state.valid()[0]);
        assert!(!state.valid()[1]);
        assert_eq!(state.consistency()[(0, 1)], REJECTED);
        assert_eq!(state.consistency()[(1, 0)], REJECTED);
    }

    #[test]
    fn rearm_keeps_cached_scores() {
        let mut state = KvldState::new(3);
        state.valid[1] = false;
        state.set_pair(0, 2, 0.1);
        state.rearm();
        assert!(state.valid().iter().all(|&v| v));
        assert_eq!(state.consistency()[(2, 0)], 0.1);
        assert_eq!(state.consistency()[(0, 1)], UNKNOWN);
    }

    #[test]
    fn out_of_range_feature_is_an_error() {
        let s = GradientScales::new(&textured(32, 32, 0));
        let f = grid_features(32, 32, 8);
        let matches = vec![IndMatch::new(0, 99)];
        let mut state = KvldState::new(1);
        let view = KvldView { scales: &s, features: &f };
        let err = kvld(view, view, &matches, &KvldParameters::default(), &mut state).unwrap_err();
        assert!(matches!(err, KvldError::FeatureIndex { view: 1, feature: 99, .. }));
    }

    #[test]
    fn empty_input_has_zero_ratio() {
        let s = GradientScales::new(&textured(32, 32, 0));
        let view = KvldView { scales: &s, features: &[] };
        let mut state = KvldState::new(0);
        let out = kvld(view, view, &[], &KvldParameters::default(), &mut state).unwrap();
        assert_eq!(out.inlier_ratio, 0.0);
        assert!(out.matches.is_empty());
    }
}
