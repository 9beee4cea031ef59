//! Keypoints, descriptors and the region describer.

pub mod describer;
pub mod io;
pub mod regions_type;
pub mod sift;
pub mod types;

pub use describer::{describer_for_preset, DescriberPreset, ImageDescriber, UnknownPreset};
pub use regions_type::{load_regions_type, save_regions_type, RegionsType, RegionsTypeError};
pub use sift::{SiftDescriber, SiftParams};
pub use types::{Descriptor, PointFeature, Regions, ScaledOrientedFeature, DESCRIPTOR_LEN};
