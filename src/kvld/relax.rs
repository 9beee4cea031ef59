//! Adaptive inlier-rate relaxation around the K-VLD filter.
use super::KvldParameters;
use log::info;
use serde::Serialize;

pub const MAX_RUNS: usize = 5;
/// Neighbour count used once the first run has been relaxed.
pub const RELAXED_K: usize = 2;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelaxationRun {
    pub inlier_rate: f32,
    pub k: usize,
    pub inlier_ratio: f32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relaxation {
    pub runs: Vec<RelaxationRun>,
    /// Parameters after the last adjustment.
    pub final_params: KvldParameters,
}

impl Relaxation {
    pub fn accepted(&self) -> bool {
        self.runs
            .last()
            .is_some_and(|r| r.inlier_ratio >= r.inlier_rate)
    }
}

/// Runs `filter` until the inlier ratio it reports reaches the current
/// inlier-rate threshold or `max_runs` runs have happened.
///
/// After every failing run the threshold is halved and `k` drops to
/// [`RELAXED_K`]. Errors from `filter` stop the loop immediately.
pub fn relax<F, E>(initial: KvldParameters, max_runs: usize, mut filter: F) -> Result<Relaxation, E>
where
    F: FnMut(&KvldParameters) -> Result<f32, E>,
{
    let mut params = initial;
    let mut runs = Vec::new();
    while runs.len() < max_runs {
        let ratio = filter(&params)?;
        runs.push(RelaxationRun {
            inlier_rate: params.inlier_rate,
            k: params.k,
            inlier_ratio: ratio,
        });
        if ratio >= params.inlier_rate {
            break;
        }
        params.inlier_rate *= 0.5;
        params.k = RELAXED_K;
        info!(
            "K-VLD inlier ratio {:.4} below threshold, retrying with rate {:.5}",
            ratio, params.inlier_rate
        );
    }
    Ok(Relaxation {
        runs,
        final_params: params,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[test]
    fn stops_after_max_runs_when_never_satisfied() {
        let mut calls = 0;
        let relaxation = relax(KvldParameters::default(), MAX_RUNS, |_| {
            calls += 1;
            Ok::<_, Infallible>(0.0)
        })
        .unwrap();
        assert_eq!(calls, MAX_RUNS);
        assert_eq!(relaxation.runs.len(), MAX_RUNS);
        assert!(!relaxation.accepted());
    }

    #[test]
    fn threshold_halves_on_every_retry() {
        let relaxation =
            relax(KvldParameters::default(), MAX_RUNS, |_| Ok::<_, Infallible>(0.0)).unwrap();
        let runs = &relaxation.runs;
        assert_eq!(runs[0].k, 3);
        for pair in runs.windows(2) {
            assert_eq!(pair[1].inlier_rate, pair[0].inlier_rate * 0.5);
            assert_eq!(pair[1].k, RELAXED_K);
        }
        assert_eq!(relaxation.final_params.inlier_rate, 0.04 / 32.0);
    }

    #[test]
    fn accepted_first_run_does_not_retry() {
        let relaxation =
            relax(KvldParameters::default(), MAX_RUNS, |_| Ok::<_, Infallible>(0.5)).unwrap();
        assert_eq!(relaxation.runs.len(), 1);
        assert!(relaxation.accepted());
        assert_eq!(relaxation.final_params, KvldParameters::default());
    }

    #[test]
    fn stops_once_relaxed_threshold_is_met() {
        // ratio 0.015 passes once the rate has dropped to 0.01
        let relaxation =
            relax(KvldParameters::default(), MAX_RUNS, |_| Ok::<_, Infallible>(0.015)).unwrap();
        let rates: Vec<f32> = relaxation.runs.iter().map(|r| r.inlier_rate).collect();
        assert_eq!(rates, vec![0.04, 0.02, 0.01]);
    }

    #[test]
    fn filter_error_aborts() {
        let mut calls = 0;
        let result = relax(KvldParameters::default(), MAX_RUNS, |_| {
            calls += 1;
            if calls == 2 {
                Err("boom")
            } else {
                Ok(0.0)
            }
        });
        assert_eq!(result.unwrap_err(), "boom");
        assert_eq!(calls, 2);
    }
}
