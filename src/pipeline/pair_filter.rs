//! Pairwise filter: describe two images, match them, and keep the matches
//! K-VLD judges consistent.
use super::LINE_PREFIX;
use crate::config::PairFilterConfig;
use crate::diagnostics::{PairFilterReport, TimingBreakdown};
use crate::features::io::{save_features, FeatureIoError};
use crate::features::{save_regions_type, ImageDescriber, Regions, RegionsTypeError};
use crate::image::io::{ensure_dir, load_grayscale_image, write_json_file, ImageIoError};
use crate::image::ImageF32;
use crate::kvld::{kvld, relax, GradientScales, KvldError, KvldOutcome, KvldState, KvldView, Relaxation};
use crate::matching::{
    save_matches, save_matches_svg, DistanceRatioMatcher, IndMatch, MatchIoError, PairWiseMatches,
    SvgView,
};
use log::{info, warn};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairFilterError {
    #[error(transparent)]
    Image(#[from] ImageIoError),
    #[error(transparent)]
    Kvld(#[from] KvldError),
    #[error(transparent)]
    Matches(#[from] MatchIoError),
    #[error(transparent)]
    Features(#[from] FeatureIoError),
    #[error(transparent)]
    RegionsType(#[from] RegionsTypeError),
}

/// Everything a pairwise run produced.
#[derive(Clone, Debug)]
pub struct PairFilterOutput {
    pub left: Regions,
    pub right: Regions,
    pub putative: Vec<IndMatch>,
    pub kvld: KvldOutcome,
    pub relaxation: Relaxation,
    pub timings: TimingBreakdown,
}

impl PairFilterOutput {
    /// `m:x1,y1,x2,y2` for every surviving match.
    pub fn match_lines(&self) -> Vec<String> {
        self.kvld
            .matches
            .iter()
            .filter_map(|m| {
                let a = self.left.features.get(m.i as usize)?;
                let b = self.right.features.get(m.j as usize)?;
                Some(format_match_line(a.x, a.y, b.x, b.y))
            })
            .collect()
    }
}

pub fn format_match_line(x1: f32, y1: f32, x2: f32, y2: f32) -> String {
    let mut line = String::from(LINE_PREFIX);
    let _ = write!(line, "{x1:.6},{y1:.6},{x2:.6},{y2:.6}");
    line
}

/// Run describe → ratio matching → relaxed K-VLD on two loaded images.
pub fn filter_pair(
    left: &ImageF32,
    right: &ImageF32,
    describer: &dyn ImageDescriber,
    config: &PairFilterConfig,
) -> Result<PairFilterOutput, KvldError> {
    let t0 = Instant::now();
    let mut timings = TimingBreakdown::default();

    let left_regions = timings.measure("describe_left", || describer.describe(left));
    let right_regions = timings.measure("describe_right", || describer.describe(right));
    info!(
        "{}: {} / {} regions",
        describer.name(),
        left_regions.len(),
        right_regions.len()
    );

    let matcher = DistanceRatioMatcher::new(config.matching);
    let putative = timings.measure("ratio_matching", || {
        matcher.match_regions(&left_regions, &right_regions)
    });
    info!("{} putative matches", putative.len());
    if putative.is_empty() {
        warn!("no putative matches; K-VLD has nothing to filter");
    }

    let (left_scales, right_scales) = timings.measure("gradient_scales", || {
        (GradientScales::new(left), GradientScales::new(right))
    });
    let left_view = KvldView {
        scales: &left_scales,
        features: &left_regions.features,
    };
    let right_view = KvldView {
        scales: &right_scales,
        features: &right_regions.features,
    };

    let kvld_start = Instant::now();
    let mut state = KvldState::new(putative.len());
    let mut last = KvldOutcome::default();
    let relaxation = relax(config.kvld, config.max_runs, |params| {
        state.rearm();
        last = kvld(left_view, right_view, &putative, params, &mut state)?;
        Ok::<_, KvldError>(last.inlier_ratio)
    })?;
    timings.push("kvld", kvld_start.elapsed().as_secs_f64() * 1000.0);
    info!(
        "K-VLD kept {}/{} after {} run(s)",
        last.matches.len(),
        putative.len(),
        relaxation.runs.len()
    );

    timings.total_ms = t0.elapsed().as_secs_f64() * 1000.0;
    Ok(PairFilterOutput {
        left: left_regions,
        right: right_regions,
        putative,
        kvld: last,
        relaxation,
        timings,
    })
}

/// Inputs of the pairwise filter tool.
#[derive(Clone, Debug)]
pub struct PairFilterOptions {
    pub left_image: PathBuf,
    pub right_image: PathBuf,
    pub outdir: PathBuf,
    /// `0` prints matches only; `1` adds SVGs and a JSON report; `2` also
    /// writes a feature/match directory readable by the exporter.
    pub debug: usize,
}

/// Load both images, filter them and write the debug artefacts requested.
pub fn run_pair_filter(
    options: &PairFilterOptions,
    describer: &dyn ImageDescriber,
    config: &PairFilterConfig,
) -> Result<PairFilterOutput, PairFilterError> {
    let left_gray = load_grayscale_image(&options.left_image)?;
    let right_gray = load_grayscale_image(&options.right_image)?;
    let left = left_gray.to_f32();
    let right = right_gray.to_f32();

    let output = filter_pair(&left, &right, describer, config)?;

    if options.debug >= 1 {
        write_debug_outputs(options, describer, (&left, &right), &output)?;
    }
    Ok(output)
}

fn write_debug_outputs(
    options: &PairFilterOptions,
    describer: &dyn ImageDescriber,
    (left, right): (&ImageF32, &ImageF32),
    output: &PairFilterOutput,
) -> Result<(), PairFilterError> {
    let outdir = &options.outdir;
    ensure_dir(outdir)?;

    let left_path = options.left_image.to_string_lossy();
    let right_path = options.right_image.to_string_lossy();
    let left_points = output.left.positions();
    let right_points = output.right.positions();
    let left_svg = SvgView {
        image_path: &left_path,
        width: left.w,
        height: left.h,
        features: &left_points,
    };
    let right_svg = SvgView {
        image_path: &right_path,
        width: right.w,
        height: right.h,
        features: &right_points,
    };
    save_matches_svg(
        &left_svg,
        &right_svg,
        &output.putative,
        &outdir.join("putative_matches.svg"),
        false,
    )?;
    save_matches_svg(
        &left_svg,
        &right_svg,
        &output.kvld.matches,
        &outdir.join("kvld_matches.svg"),
        false,
    )?;

    let report = PairFilterReport {
        left_image: left_path.to_string(),
        right_image: right_path.to_string(),
        describer: describer.name().to_string(),
        left_regions: output.left.len(),
        right_regions: output.right.len(),
        putative_matches: output.putative.len(),
        kvld_matches: output.kvld.matches.len(),
        inlier_ratio: output.kvld.inlier_ratio,
        accepted: output.relaxation.accepted(),
        runs: output.relaxation.runs.clone(),
        timings: output.timings.clone(),
    };
    write_json_file(&outdir.join("kvld_report.json"), &report)?;

    if options.debug >= 2 {
        save_features(
            &outdir.join(format!("{}.feat", file_stem(&options.left_image))),
            &output.left.features,
        )?;
        save_features(
            &outdir.join(format!("{}.feat", file_stem(&options.right_image))),
            &output.right.features,
        )?;
        save_regions_type(
            &outdir.join("image_describer.json"),
            describer.name(),
            describer.regions_type(),
        )?;
        let mut putative = PairWiseMatches::new();
        putative.insert((0, 1), output.putative.clone());
        save_matches(&outdir.join("matches.putative.txt"), &putative)?;
        let mut filtered = PairWiseMatches::new();
        filtered.insert((0, 1), output.kvld.matches.clone());
        save_matches(&outdir.join("matches.f.txt"), &filtered)?;
    }
    info!("debug outputs written to {}", outdir.display());
    Ok(())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}
