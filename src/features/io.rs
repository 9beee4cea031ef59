//! Plain-text `.feat` files: one keypoint per line, whitespace-separated
//! `x y scale orientation`.
use super::regions_type::RegionsType;
use super::types::ScaledOrientedFeature;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeatureIoError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: expected exactly {expected} numeric columns")]
    Malformed {
        path: PathBuf,
        line: usize,
        expected: usize,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn parse_line(line: &str, columns: usize) -> Option<ScaledOrientedFeature> {
    let values: Vec<f32> = line
        .split_whitespace()
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;
    // other layouts (e.g. affine) must not be read as scale/orientation
    if values.len() != columns {
        return None;
    }
    match values[..] {
        [x, y, scale, orientation] => Some(ScaledOrientedFeature {
            x,
            y,
            scale,
            orientation,
        }),
        _ => None,
    }
}

/// Read the features stored in `path` for the given regions type.
pub fn load_features(
    path: &Path,
    regions_type: RegionsType,
) -> Result<Vec<ScaledOrientedFeature>, FeatureIoError> {
    let data = fs::read_to_string(path).map_err(|source| FeatureIoError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let columns = regions_type.feature_columns();
    data.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            parse_line(line, columns).ok_or_else(|| FeatureIoError::Malformed {
                path: path.to_path_buf(),
                line: idx + 1,
                expected: columns,
            })
        })
        .collect()
}

pub fn save_features(path: &Path, features: &[ScaledOrientedFeature]) -> Result<(), FeatureIoError> {
    let mut out = String::with_capacity(features.len() * 32);
    for f in features {
        let _ = writeln!(out, "{} {} {} {}", f.x, f.y, f.scale, f.orientation);
    }
    fs::write(path, out).map_err(|source| FeatureIoError::Write {
        path: path.to_path_buf(),
        source,
    })
}
