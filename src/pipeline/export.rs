//! Export of pairwise correspondences from an SfM dataset to a flat text file.
use super::LINE_PREFIX;
use crate::features::io::FeatureIoError;
use crate::features::{load_regions_type, PointFeature, RegionsTypeError, ScaledOrientedFeature};
use crate::image::io::{ensure_dir, ImageIoError};
use crate::matching::{save_matches_svg, MatchIoError, Pair, SvgView};
use crate::sfm::{load_scene, FeaturesProvider, MatchesProvider, SceneError, SfmData, View};
use log::{debug, info};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const OUTPUT_FILE: &str = "matches.txt";
pub const REGIONS_TYPE_FILE: &str = "image_describer.json";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("It is an invalid output directory")]
    InvalidOutdir,
    #[error("matchdir cannot be an empty option")]
    EmptyMatchdir,
    #[error("matchfile cannot be an empty option")]
    EmptyMatchfile,
    #[error("The input SfM_Data file \"{}\" cannot be read.", .path.display())]
    Scene {
        path: PathBuf,
        #[source]
        source: SceneError,
    },
    #[error("Invalid: {} regions type file.", .path.display())]
    RegionsType {
        path: PathBuf,
        #[source]
        source: RegionsTypeError,
    },
    #[error("Cannot load view corresponding features in directory: {}.", .dir.display())]
    Features {
        dir: PathBuf,
        #[source]
        source: FeatureIoError,
    },
    #[error("Cannot load the match file: {}.", .path.display())]
    Matches {
        path: PathBuf,
        #[source]
        source: MatchIoError,
    },
    #[error("view {view} is not loaded")]
    MissingView { view: u32 },
    #[error("pair ({i}, {j}): match {index} references a feature that view {view} does not have")]
    MissingFeature {
        i: u32,
        j: u32,
        index: usize,
        view: u32,
    },
    #[error(transparent)]
    OutputDir(#[from] ImageIoError),
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Svg(MatchIoError),
}

/// Command-line inputs of the exporter, unvalidated.
#[derive(Clone, Debug, Default)]
pub struct ExportOptions {
    pub input_file: String,
    pub matchdir: String,
    pub matchfile: String,
    pub outdir: String,
    pub svg: bool,
}

impl ExportOptions {
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.outdir.is_empty() {
            return Err(ExportError::InvalidOutdir);
        }
        if self.matchdir.is_empty() {
            return Err(ExportError::EmptyMatchdir);
        }
        if self.matchfile.is_empty() {
            return Err(ExportError::EmptyMatchfile);
        }
        Ok(())
    }
}

/// Scene, features and matches ready for export.
#[derive(Clone, Debug)]
pub struct ExportInputs {
    pub scene: SfmData,
    pub features: FeaturesProvider,
    pub matches: MatchesProvider,
}

pub fn load_inputs(options: &ExportOptions) -> Result<ExportInputs, ExportError> {
    let scene_path = PathBuf::from(&options.input_file);
    let scene = load_scene(&scene_path).map_err(|source| ExportError::Scene {
        path: scene_path.clone(),
        source,
    })?;

    let matchdir = PathBuf::from(&options.matchdir);
    let regions_path = matchdir.join(REGIONS_TYPE_FILE);
    let regions_type = load_regions_type(&regions_path).map_err(|source| {
        ExportError::RegionsType {
            path: regions_path.clone(),
            source,
        }
    })?;

    let features = FeaturesProvider::load(&scene, &matchdir, regions_type).map_err(|source| {
        ExportError::Features {
            dir: matchdir.clone(),
            source,
        }
    })?;

    let match_path = PathBuf::from(&options.matchfile);
    let matches = MatchesProvider::load(&scene, &match_path).map_err(|source| {
        ExportError::Matches {
            path: match_path.clone(),
            source,
        }
    })?;

    Ok(ExportInputs {
        scene,
        features,
        matches,
    })
}

/// `view_I_path,x1,y1,view_J_path,x2,y2` for every match of every pair, in
/// ascending pair order.
pub fn collect_match_lines(inputs: &ExportInputs) -> Result<Vec<String>, ExportError> {
    let mut lines = Vec::with_capacity(inputs.matches.match_count());
    let total = inputs.matches.matches().len();
    for (done, (&pair, list)) in inputs.matches.matches().iter().enumerate() {
        debug!(
            "pair {}/{total} ({}, {}): {} matches",
            done + 1,
            pair.0,
            pair.1,
            list.len()
        );
        let (view_i, feats_i) = resolve_view(inputs, pair.0)?;
        let (view_j, feats_j) = resolve_view(inputs, pair.1)?;
        let path_i = view_i.image_path.display().to_string();
        let path_j = view_j.image_path.display().to_string();
        for (index, m) in list.iter().enumerate() {
            let a = feature_at(feats_i, m.i, pair, index, pair.0)?;
            let b = feature_at(feats_j, m.j, pair, index, pair.1)?;
            lines.push(format!(
                "{path_i},{:.6},{:.6},{path_j},{:.6},{:.6}",
                a.x, a.y, b.x, b.y
            ));
        }
    }
    Ok(lines)
}

fn resolve_view(
    inputs: &ExportInputs,
    view: u32,
) -> Result<(&View, &[ScaledOrientedFeature]), ExportError> {
    let v = inputs
        .scene
        .view(view)
        .ok_or(ExportError::MissingView { view })?;
    let f = inputs
        .features
        .get(view)
        .ok_or(ExportError::MissingView { view })?;
    Ok((v, f))
}

fn feature_at(
    features: &[ScaledOrientedFeature],
    feature: u32,
    pair: Pair,
    index: usize,
    view: u32,
) -> Result<&ScaledOrientedFeature, ExportError> {
    features
        .get(feature as usize)
        .ok_or(ExportError::MissingFeature {
            i: pair.0,
            j: pair.1,
            index,
            view,
        })
}

/// Contents of `matches.txt`: each line newline-terminated.
pub fn render_text(lines: &[String]) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        let _ = writeln!(out, "{line}");
    }
    out
}

pub fn stdout_line(line: &str) -> String {
    format!("{LINE_PREFIX}{line}")
}

#[derive(Clone, Debug)]
pub struct ExportSummary {
    pub pairs: usize,
    pub lines: Vec<String>,
    pub text: String,
    pub output: PathBuf,
}

/// Validate, load, export and (optionally) render every pair.
///
/// Nothing is written before all inputs have loaded and every match has been
/// resolved.
pub fn run_export(options: &ExportOptions) -> Result<ExportSummary, ExportError> {
    options.validate()?;
    let inputs = load_inputs(options)?;
    let lines = collect_match_lines(&inputs)?;
    let text = render_text(&lines);

    let outdir = PathBuf::from(&options.outdir);
    ensure_dir(&outdir)?;
    let output = outdir.join(OUTPUT_FILE);
    fs::write(&output, &text).map_err(|source| ExportError::Write {
        path: output.clone(),
        source,
    })?;
    info!(
        "exported {} matches of {} pairs to {}",
        lines.len(),
        inputs.matches.matches().len(),
        output.display()
    );

    if options.svg {
        write_pair_svgs(&inputs, &outdir)?;
    }

    Ok(ExportSummary {
        pairs: inputs.matches.matches().len(),
        lines,
        text,
        output,
    })
}

/// File name of the SVG rendering of a pair.
pub fn pair_svg_name((i, j): Pair, count: usize) -> String {
    format!("{i}_{j}_{count}_.svg")
}

fn write_pair_svgs(inputs: &ExportInputs, outdir: &Path) -> Result<(), ExportError> {
    for (&pair, list) in inputs.matches.matches() {
        if list.is_empty() {
            continue;
        }
        let (view_i, feats_i) = resolve_view(inputs, pair.0)?;
        let (view_j, feats_j) = resolve_view(inputs, pair.1)?;
        let points_i: Vec<PointFeature> = feats_i.iter().map(|f| f.position()).collect();
        let points_j: Vec<PointFeature> = feats_j.iter().map(|f| f.position()).collect();
        let image_i = inputs.scene.image_path(view_i).display().to_string();
        let image_j = inputs.scene.image_path(view_j).display().to_string();
        let left = SvgView {
            image_path: &image_i,
            width: view_i.width,
            height: view_i.height,
            features: &points_i,
        };
        let right = SvgView {
            image_path: &image_j,
            width: view_j.width,
            height: view_j.height,
            features: &points_j,
        };
        let path = outdir.join(pair_svg_name(pair, list.len()));
        save_matches_svg(&left, &right, list, &path, false).map_err(ExportError::Svg)?;
    }
    Ok(())
}
