mod common;

use common::synthetic_image::{blob_texture_u8, save_png, shift_u8};
use pairwise_matches::config::PairFilterConfig;
use pairwise_matches::features::{load_regions_type, RegionsType, SiftDescriber};
use pairwise_matches::image::io::GrayImageU8;
use pairwise_matches::matching::load_matches;
use pairwise_matches::pipeline::{filter_pair, run_pair_filter, PairFilterOptions};
use std::process::Command;

const W: usize = 192;
const H: usize = 160;
const DX: isize = 7;
const DY: isize = 5;

fn shifted_pair() -> (Vec<u8>, Vec<u8>) {
    let base = blob_texture_u8(W, H, 220, 11);
    let moved = shift_u8(&base, W, H, DX, DY);
    (base, moved)
}

#[test]
fn kvld_keeps_translation_consistent_matches() {
    let _ = env_logger::builder().is_test(true).try_init();
    let (a, b) = shifted_pair();
    let left = GrayImageU8::new(W, H, a).unwrap().to_f32();
    let right = GrayImageU8::new(W, H, b).unwrap().to_f32();

    let describer = SiftDescriber::default();
    let output = filter_pair(&left, &right, &describer, &PairFilterConfig::default()).unwrap();

    assert!(output.left.len() > 20, "left regions: {}", output.left.len());
    assert!(
        output.putative.len() >= 10,
        "putative: {}",
        output.putative.len()
    );
    assert!(
        output.kvld.matches.len() >= 5,
        "kept: {}",
        output.kvld.matches.len()
    );
    assert!(output.relaxation.runs.len() <= 5);

    let consistent = output
        .kvld
        .matches
        .iter()
        .filter(|m| {
            let p = &output.left.features[m.i as usize];
            let q = &output.right.features[m.j as usize];
            (q.x - p.x - DX as f32).abs() < 1.5 && (q.y - p.y - DY as f32).abs() < 1.5
        })
        .count();
    assert!(
        consistent * 10 >= output.kvld.matches.len() * 9,
        "{consistent} of {} kept matches follow the shift",
        output.kvld.matches.len()
    );
    assert_eq!(output.match_lines().len(), output.kvld.matches.len());
}

#[test]
fn flat_images_produce_no_matches() {
    let flat = GrayImageU8::new(96, 96, vec![128; 96 * 96]).unwrap().to_f32();
    let output = filter_pair(
        &flat,
        &flat,
        &SiftDescriber::default(),
        &PairFilterConfig::default(),
    )
    .unwrap();
    assert!(output.putative.is_empty());
    assert!(output.kvld.matches.is_empty());
    assert_eq!(output.relaxation.runs.len(), 5);
}

#[test]
fn debug_level_two_writes_exporter_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = shifted_pair();
    let left_path = dir.path().join("left.png");
    let right_path = dir.path().join("right.png");
    save_png(&left_path, W, H, a);
    save_png(&right_path, W, H, b);
    let outdir = dir.path().join("debug");

    let options = PairFilterOptions {
        left_image: left_path,
        right_image: right_path,
        outdir: outdir.clone(),
        debug: 2,
    };
    let describer = SiftDescriber::default();
    let output = run_pair_filter(&options, &describer, &PairFilterConfig::default()).unwrap();

    for name in [
        "putative_matches.svg",
        "kvld_matches.svg",
        "kvld_report.json",
        "left.feat",
        "right.feat",
    ] {
        assert!(outdir.join(name).is_file(), "{name} missing");
    }
    assert_eq!(
        load_regions_type(&outdir.join("image_describer.json")).unwrap(),
        RegionsType::SiftFloat
    );
    let filtered = load_matches(&outdir.join("matches.f.txt")).unwrap();
    assert_eq!(filtered[&(0, 1)], output.kvld.matches);

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(outdir.join("kvld_report.json")).unwrap())
            .unwrap();
    assert_eq!(report["kvldMatches"], output.kvld.matches.len());
    assert_eq!(report["runs"][0]["inlierRate"], 0.04f32 as f64);
}

#[test]
fn cli_prints_one_line_per_kept_match() {
    let dir = tempfile::tempdir().unwrap();
    let (a, b) = shifted_pair();
    let left_path = dir.path().join("left.png");
    let right_path = dir.path().join("right.png");
    save_png(&left_path, W, H, a);
    save_png(&right_path, W, H, b);

    let out = Command::new(env!("CARGO_BIN_EXE_kvld_filter"))
        .arg("-i")
        .arg(&left_path)
        .arg("-j")
        .arg(&right_path)
        .arg("-f")
        .arg("high")
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(!stdout.is_empty());
    for line in stdout.lines() {
        let fields: Vec<&str> = line.strip_prefix("m:").unwrap().split(',').collect();
        assert_eq!(fields.len(), 4, "{line}");
        for field in fields {
            let (_, decimals) = field.split_once('.').unwrap();
            assert_eq!(decimals.len(), 6, "{line}");
        }
    }
}
