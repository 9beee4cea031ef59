use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Index type used for views and features.
pub type IndexT = u32;

/// Ordered pair of view ids `(I, J)`.
pub type Pair = (IndexT, IndexT);

/// Correspondence between feature `i` of the left view and feature `j` of the
/// right view.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndMatch {
    pub i: IndexT,
    pub j: IndexT,
}

impl IndMatch {
    pub fn new(i: IndexT, j: IndexT) -> Self {
        Self { i, j }
    }

    /// Remove duplicated correspondences, keeping the first occurrence order.
    pub fn deduplicate(matches: &mut Vec<IndMatch>) {
        let mut seen = std::collections::HashSet::with_capacity(matches.len());
        matches.retain(|m| seen.insert(*m));
    }
}

/// Matches of every view pair, iterated in ascending pair order.
pub type PairWiseMatches = BTreeMap<Pair, Vec<IndMatch>>;
