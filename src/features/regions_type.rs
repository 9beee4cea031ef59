//! Regions-type descriptor stored as `image_describer.json` next to the
//! feature files of a dataset.
//!
//! Only `regions_type.polymorphic_name` is interpreted; it decides how the
//! `.feat` files are parsed.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RegionsTypeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("unsupported regions type '{0}'")]
    Unsupported(String),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegionsType {
    Sift,
    SiftFloat,
    AkazeFloat,
    AkazeLiop,
    AkazeBinary,
}

const KNOWN_TYPES: [(&str, RegionsType); 5] = [
    ("SIFT_Regions", RegionsType::Sift),
    ("SIFT_Float_Regions", RegionsType::SiftFloat),
    ("AKAZE_Float_Regions", RegionsType::AkazeFloat),
    ("AKAZE_Liop_Regions", RegionsType::AkazeLiop),
    ("AKAZE_Binary_Regions", RegionsType::AkazeBinary),
];

impl RegionsType {
    pub fn from_name(name: &str) -> Option<Self> {
        KNOWN_TYPES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, t)| *t)
    }

    pub fn name(self) -> &'static str {
        KNOWN_TYPES
            .iter()
            .find(|(_, t)| *t == self)
            .map(|(n, _)| *n)
            .unwrap_or("SIFT_Regions")
    }

    /// Number of columns per line in the `.feat` files of this regions type
    /// (`x y scale orientation` for every supported type).
    pub fn feature_columns(self) -> usize {
        4
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct DescriberFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_describer: Option<PolymorphicName>,
    regions_type: PolymorphicName,
}

#[derive(Debug, Serialize, Deserialize)]
struct PolymorphicName {
    polymorphic_name: String,
}

pub fn load_regions_type(path: &Path) -> Result<RegionsType, RegionsTypeError> {
    let data = fs::read_to_string(path).map_err(|source| RegionsTypeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file: DescriberFile =
        serde_json::from_str(&data).map_err(|source| RegionsTypeError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    let name = file.regions_type.polymorphic_name;
    RegionsType::from_name(&name).ok_or(RegionsTypeError::Unsupported(name))
}

/// Write `image_describer.json` describing `describer_name` regions of `regions_type`.
pub fn save_regions_type(
    path: &Path,
    describer_name: &str,
    regions_type: RegionsType,
) -> Result<(), RegionsTypeError> {
    let file = DescriberFile {
        image_describer: Some(PolymorphicName {
            polymorphic_name: format!("{describer_name}_Image_describer"),
        }),
        regions_type: PolymorphicName {
            polymorphic_name: regions_type.name().to_string(),
        },
    };
    let json = serde_json::to_string_pretty(&file).map_err(|source| RegionsTypeError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| RegionsTypeError::Write {
        path: path.to_path_buf(),
        source,
    })
}
