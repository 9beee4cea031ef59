//! Per-view feature positions loaded from `<matchdir>/<stem>.feat`.
use super::scene::SfmData;
use crate::features::io::{load_features, FeatureIoError};
use crate::features::{RegionsType, ScaledOrientedFeature};
use crate::matching::IndexT;
use log::{debug, info};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

#[derive(Clone, Debug, Default)]
pub struct FeaturesProvider {
    features: BTreeMap<IndexT, Vec<ScaledOrientedFeature>>,
}

/// Feature file of a view inside `matchdir`.
pub fn feature_file(matchdir: &Path, stem: &str) -> PathBuf {
    matchdir.join(format!("{stem}.feat"))
}

impl FeaturesProvider {
    /// Load the feature file of every view in `scene`.
    ///
    /// Fails on the first missing or malformed file.
    pub fn load(
        scene: &SfmData,
        matchdir: &Path,
        regions_type: RegionsType,
    ) -> Result<Self, FeatureIoError> {
        let jobs: Vec<(IndexT, PathBuf)> = scene
            .views
            .iter()
            .map(|(&id, view)| (id, feature_file(matchdir, &view.stem())))
            .collect();

        let load = |(id, path): &(IndexT, PathBuf)| {
            load_features(path, regions_type).map(|f| {
                debug!("view {id}: {} features from {}", f.len(), path.display());
                (*id, f)
            })
        };
        #[cfg(feature = "parallel")]
        let loaded: Result<Vec<_>, _> = jobs.par_iter().map(load).collect();
        #[cfg(not(feature = "parallel"))]
        let loaded: Result<Vec<_>, _> = jobs.iter().map(load).collect();

        let features: BTreeMap<_, _> = loaded?.into_iter().collect();
        info!("loaded features for {} views", features.len());
        Ok(Self { features })
    }

    pub fn get(&self, view: IndexT) -> Option<&[ScaledOrientedFeature]> {
        self.features.get(&view).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
