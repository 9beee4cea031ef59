//! Loaders for a structure-from-motion dataset: scene, features and matches.
pub mod features_provider;
pub mod matches_provider;
pub mod scene;

pub use features_provider::{feature_file, FeaturesProvider};
pub use matches_provider::MatchesProvider;
pub use scene::{load_scene, parse_scene, Intrinsic, SceneError, SfmData, View};
