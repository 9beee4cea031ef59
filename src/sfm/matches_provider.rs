//! Pairwise matches restricted to the views of a scene.
use super::scene::SfmData;
use crate::matching::{load_matches, MatchIoError, Pair, PairWiseMatches};
use log::{info, warn};
use std::path::Path;

#[derive(Clone, Debug, Default)]
pub struct MatchesProvider {
    matches: PairWiseMatches,
}

impl MatchesProvider {
    /// Load `path` and drop pairs that reference views missing from `scene`.
    pub fn load(scene: &SfmData, path: &Path) -> Result<Self, MatchIoError> {
        let all = load_matches(path)?;
        let total = all.len();
        let provider = Self::filtered(scene, all);
        if provider.matches.len() < total {
            warn!(
                "dropped {} pairs referencing views outside the scene",
                total - provider.matches.len()
            );
        }
        info!(
            "loaded {} pairs ({} matches) from {}",
            provider.matches.len(),
            provider.match_count(),
            path.display()
        );
        Ok(provider)
    }

    pub fn filtered(scene: &SfmData, matches: PairWiseMatches) -> Self {
        let matches = matches
            .into_iter()
            .filter(|((i, j), _)| scene.views.contains_key(i) && scene.views.contains_key(j))
            .collect();
        Self { matches }
    }

    pub fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.matches.keys().copied()
    }

    pub fn matches(&self) -> &PairWiseMatches {
        &self.matches
    }

    pub fn match_count(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}
