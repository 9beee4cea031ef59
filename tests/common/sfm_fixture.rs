use std::fs;
use std::path::{Path, PathBuf};

/// Paths of a small on-disk SfM dataset.
pub struct SfmFixture {
    pub scene: PathBuf,
    pub matchdir: PathBuf,
    pub matchfile: PathBuf,
}

fn view_json(id: u32, filename: &str) -> String {
    format!(
        r#"{{"key": {id}, "value": {{"polymorphic_id": 1073741824, "ptr_wrapper": {{"id": {}, "data": {{
            "local_path": "", "filename": "{filename}", "width": 200, "height": 100,
            "id_view": {id}, "id_intrinsic": 0, "id_pose": {id}}}}}}}}}"#,
        2147483649u32 + id
    )
}

/// Three views `a`, `b`, `c` with four features each and matches for the
/// pairs (0, 1), (0, 2), an empty (1, 2) block and a pair referencing a view
/// outside the scene.
pub fn write_sfm_fixture(dir: &Path) -> SfmFixture {
    let views = [view_json(0, "a.jpg"), view_json(1, "b.jpg"), view_json(2, "c.jpg")].join(",");
    let scene = format!(
        r#"{{
            "sfm_data_version": "0.3",
            "root_path": "{}",
            "views": [{views}],
            "intrinsics": [
                {{"key": 0, "value": {{"polymorphic_id": 2147483649, "polymorphic_name": "pinhole",
                  "ptr_wrapper": {{"id": 2147483660, "data": {{"width": 200, "height": 100,
                  "focal_length": 180.0, "principal_point": [100.0, 50.0]}}}}}}}}
            ],
            "extrinsics": [],
            "structure": [],
            "control_points": []
        }}"#,
        dir.join("images").display()
    );
    let scene_path = dir.join("sfm_data.json");
    fs::write(&scene_path, scene).unwrap();

    let matchdir = dir.join("matches");
    fs::create_dir_all(&matchdir).unwrap();
    fs::write(
        matchdir.join("image_describer.json"),
        r#"{"image_describer": {"polymorphic_name": "SIFT_Image_describer"},
            "regions_type": {"polymorphic_name": "SIFT_Regions"}}"#,
    )
    .unwrap();
    for (stem, base) in [("a", 0.0f32), ("b", 100.0), ("c", 200.0)] {
        let mut body = String::new();
        for k in 0..4 {
            let k = k as f32;
            body.push_str(&format!("{} {} 1.5 0.25\n", base + k + 0.5, k * 10.0 + 0.25));
        }
        fs::write(matchdir.join(format!("{stem}.feat")), body).unwrap();
    }

    let matchfile = matchdir.join("matches.f.txt");
    fs::write(
        &matchfile,
        "0 1\n3\n0 1\n1 2\n3 3\n0 2\n2\n2 0\n3 1\n1 2\n0\n1 9\n1\n0 0\n",
    )
    .unwrap();

    SfmFixture {
        scene: scene_path,
        matchdir,
        matchfile,
    }
}
