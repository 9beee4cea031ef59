//! Scene description: views and intrinsics of an SfM dataset.
//!
//! Only the parts needed to resolve image paths and sizes are read; poses,
//! structure and control points are ignored.
use crate::matching::IndexT;
use log::debug;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Index value the serializer writes for "no intrinsic" / "no pose".
pub const UNDEFINED_INDEX: IndexT = IndexT::MAX;

#[derive(Debug, Error)]
pub enum SceneError {
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
    #[error("{path}: intrinsic {key} has no model name")]
    UnnamedIntrinsic { path: PathBuf, key: IndexT },
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub id_view: IndexT,
    /// Image path relative to the scene root.
    pub image_path: PathBuf,
    pub width: usize,
    pub height: usize,
    pub id_intrinsic: Option<IndexT>,
    pub id_pose: Option<IndexT>,
}

impl View {
    /// File name without extension; names the view's feature file.
    pub fn stem(&self) -> String {
        self.image_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Intrinsic {
    pub model: String,
    pub width: usize,
    pub height: usize,
    pub focal_length: Option<f64>,
    pub principal_point: Option<[f64; 2]>,
}

#[derive(Clone, Debug, Default)]
pub struct SfmData {
    pub root_path: PathBuf,
    pub views: BTreeMap<IndexT, View>,
    pub intrinsics: BTreeMap<IndexT, Intrinsic>,
}

impl SfmData {
    pub fn view(&self, id: IndexT) -> Option<&View> {
        self.views.get(&id)
    }

    /// Absolute (root-joined) image path of a view.
    pub fn image_path(&self, view: &View) -> PathBuf {
        self.root_path.join(&view.image_path)
    }

    pub fn intrinsic_of(&self, view: &View) -> Option<&Intrinsic> {
        view.id_intrinsic.and_then(|id| self.intrinsics.get(&id))
    }
}

// --- serialized layout ------------------------------------------------------

#[derive(Deserialize)]
struct RawScene {
    #[serde(default)]
    root_path: String,
    #[serde(default)]
    views: Vec<RawEntry<RawView>>,
    #[serde(default)]
    intrinsics: Vec<RawEntry<RawIntrinsic>>,
}

#[derive(Deserialize)]
struct RawEntry<T> {
    key: IndexT,
    value: RawPolymorphic<T>,
}

#[derive(Deserialize)]
struct RawPolymorphic<T> {
    #[serde(default)]
    polymorphic_id: Option<u64>,
    #[serde(default)]
    polymorphic_name: Option<String>,
    ptr_wrapper: RawPtr<T>,
}

#[derive(Deserialize)]
struct RawPtr<T> {
    data: T,
}

#[derive(Deserialize)]
struct RawView {
    #[serde(default)]
    local_path: String,
    filename: String,
    width: usize,
    height: usize,
    id_view: IndexT,
    #[serde(default = "undefined_index")]
    id_intrinsic: IndexT,
    #[serde(default = "undefined_index")]
    id_pose: IndexT,
}

#[derive(Deserialize)]
struct RawIntrinsic {
    width: usize,
    height: usize,
    #[serde(default)]
    focal_length: Option<f64>,
    #[serde(default)]
    principal_point: Option<[f64; 2]>,
}

fn undefined_index() -> IndexT {
    UNDEFINED_INDEX
}

fn defined(index: IndexT) -> Option<IndexT> {
    (index != UNDEFINED_INDEX).then_some(index)
}

/// Parse a scene from its JSON text; `path` is used for error messages.
pub fn parse_scene(text: &str, path: &Path) -> Result<SfmData, SceneError> {
    let raw: RawScene = serde_json::from_str(text).map_err(|source| SceneError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let views = raw
        .views
        .into_iter()
        .map(|entry| {
            let data = entry.value.ptr_wrapper.data;
            let view = View {
                id_view: data.id_view,
                image_path: Path::new(&data.local_path).join(&data.filename),
                width: data.width,
                height: data.height,
                id_intrinsic: defined(data.id_intrinsic),
                id_pose: defined(data.id_pose),
            };
            (entry.key, view)
        })
        .collect();

    // the serializer names a polymorphic type once and refers to it by id later
    let mut names: BTreeMap<u64, String> = BTreeMap::new();
    let mut intrinsics = BTreeMap::new();
    for entry in raw.intrinsics {
        let value = entry.value;
        let model = match (value.polymorphic_name, value.polymorphic_id) {
            (Some(name), id) => {
                if let Some(id) = id {
                    names.insert(id & !POLYMORPHIC_FIRST_BIT, name.clone());
                }
                name
            }
            (None, Some(id)) => names
                .get(&(id & !POLYMORPHIC_FIRST_BIT))
                .cloned()
                .ok_or_else(|| SceneError::UnnamedIntrinsic {
                    path: path.to_path_buf(),
                    key: entry.key,
                })?,
            (None, None) => {
                return Err(SceneError::UnnamedIntrinsic {
                    path: path.to_path_buf(),
                    key: entry.key,
                })
            }
        };
        let data = value.ptr_wrapper.data;
        intrinsics.insert(
            entry.key,
            Intrinsic {
                model,
                width: data.width,
                height: data.height,
                focal_length: data.focal_length,
                principal_point: data.principal_point,
            },
        );
    }

    Ok(SfmData {
        root_path: PathBuf::from(raw.root_path),
        views,
        intrinsics,
    })
}

/// Set on the id of the first occurrence of a polymorphic type.
const POLYMORPHIC_FIRST_BIT: u64 = 1 << 31;

pub fn load_scene(path: &Path) -> Result<SfmData, SceneError> {
    let text = fs::read_to_string(path).map_err(|source| SceneError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let scene = parse_scene(&text, path)?;
    debug!(
        "scene {}: {} views, {} intrinsics",
        path.display(),
        scene.views.len(),
        scene.intrinsics.len()
    );
    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "sfm_data_version": "0.3",
        "root_path": "/data/images",
        "views": [
            {"key": 0, "value": {"polymorphic_id": 1073741824, "ptr_wrapper": {"id": 2147483649, "data": {
                "local_path": "", "filename": "a.jpg", "width": 640, "height": 480,
                "id_view": 0, "id_intrinsic": 0, "id_pose": 0}}}},
            {"key": 1, "value": {"polymorphic_id": 1073741824, "ptr_wrapper": {"id": 2147483650, "data": {
                "local_path": "sub", "filename": "b.png", "width": 320, "height": 240,
                "id_view": 1, "id_intrinsic": 4294967295, "id_pose": 4294967295}}}}
        ],
        "intrinsics": [
            {"key": 0, "value": {"polymorphic_id": 2147483649, "polymorphic_name": "pinhole_radial_k3",
                "ptr_wrapper": {"id": 2147483651, "data": {"width": 640, "height": 480,
                "focal_length": 700.5, "principal_point": [320.0, 240.0], "disto_k3": [0.0, 0.0, 0.0]}}}},
            {"key": 1, "value": {"polymorphic_id": 1,
                "ptr_wrapper": {"id": 2147483652, "data": {"width": 320, "height": 240}}}}
        ],
        "extrinsics": [],
        "structure": [],
        "control_points": []
    }"#;

    #[test]
    fn parses_views_and_intrinsics() {
        let scene = parse_scene(SCENE, Path::new("scene.json")).unwrap();
        assert_eq!(scene.root_path, PathBuf::from("/data/images"));
        assert_eq!(scene.views.len(), 2);

        let a = scene.view(0).unwrap();
        assert_eq!(a.image_path, PathBuf::from("a.jpg"));
        assert_eq!((a.width, a.height), (640, 480));
        assert_eq!(a.stem(), "a");
        assert_eq!(scene.image_path(a), PathBuf::from("/data/images/a.jpg"));
        let k = scene.intrinsic_of(a).unwrap();
        assert_eq!(k.model, "pinhole_radial_k3");
        assert_eq!(k.focal_length, Some(700.5));

        let b = scene.view(1).unwrap();
        assert_eq!(b.image_path, PathBuf::from("sub/b.png"));
        assert_eq!(b.id_intrinsic, None);
        assert_eq!(b.id_pose, None);
        assert!(scene.intrinsic_of(b).is_none());

        // second intrinsic refers to the first by id
        assert_eq!(scene.intrinsics[&1].model, "pinhole_radial_k3");
        assert_eq!(scene.intrinsics[&1].principal_point, None);
    }

    #[test]
    fn rejects_malformed_json() {
        let err = parse_scene("{\"views\": 3}", Path::new("bad.json")).unwrap_err();
        assert!(matches!(err, SceneError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_scene(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, SceneError::Read { .. }));
    }

    #[test]
    fn empty_scene_is_valid() {
        let scene = parse_scene("{}", Path::new("empty.json")).unwrap();
        assert!(scene.views.is_empty());
        assert!(scene.intrinsics.is_empty());
    }
}
