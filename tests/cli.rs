mod common;

use common::sfm_fixture::write_sfm_fixture;
use std::process::Command;

const KVLD: &str = env!("CARGO_BIN_EXE_kvld_filter");
const EXPORT: &str = env!("CARGO_BIN_EXE_export_matches");

#[test]
fn kvld_filter_without_arguments_prints_usage() {
    let out = Command::new(KVLD).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
    assert!(out.stdout.is_empty());
}

#[test]
fn kvld_filter_rejects_unknown_preset() {
    let out = Command::new(KVLD)
        .args(["-i", "a.png", "-j", "b.png", "-f", "sparse"])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn kvld_filter_fails_on_unreadable_image() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.png");
    let out = Command::new(KVLD)
        .arg("-i")
        .arg(&missing)
        .arg("-j")
        .arg(&missing)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("missing.png"));
}

#[test]
fn export_without_arguments_exits_one() {
    let out = Command::new(EXPORT).output().unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Usage"));
}

#[test]
fn export_missing_required_flags_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_sfm_fixture(dir.path());
    let outdir = dir.path().join("out");
    let scene = fixture.scene.display().to_string();
    let matchdir = fixture.matchdir.display().to_string();
    let matchfile = fixture.matchfile.display().to_string();
    let out_str = outdir.display().to_string();
    let (scene, matchdir, matchfile, out_str) = (
        scene.as_str(),
        matchdir.as_str(),
        matchfile.as_str(),
        out_str.as_str(),
    );

    let cases: [(&[&str], &str); 3] = [
        (
            &["-i", scene, "-d", matchdir, "-m", matchfile],
            "It is an invalid output directory",
        ),
        (
            &["-i", scene, "-m", matchfile, "-o", out_str],
            "matchdir cannot be an empty option",
        ),
        (
            &["-i", scene, "-d", matchdir, "-o", out_str],
            "matchfile cannot be an empty option",
        ),
    ];
    for (args, message) in cases {
        let out = Command::new(EXPORT)
            .env("RUST_LOG", "error")
            .args(args)
            .output()
            .unwrap();
        assert_eq!(out.status.code(), Some(1), "args {args:?}");
        let stderr = String::from_utf8_lossy(&out.stderr);
        assert!(stderr.contains(message), "stderr: {stderr}");
        assert!(!outdir.join("matches.txt").exists());
    }
}

#[test]
fn export_prints_prefixed_lines() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = write_sfm_fixture(dir.path());
    let outdir = dir.path().join("out");
    let out = Command::new(EXPORT)
        .arg("-i")
        .arg(&fixture.scene)
        .arg("-d")
        .arg(&fixture.matchdir)
        .arg("-m")
        .arg(&fixture.matchfile)
        .arg("-o")
        .arg(&outdir)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(0));

    let stdout = String::from_utf8(out.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.starts_with("m:a.jpg,")));

    let written = std::fs::read_to_string(outdir.join("matches.txt")).unwrap();
    let unprefixed: Vec<&str> = lines.iter().map(|l| &l[2..]).collect();
    assert_eq!(written.lines().collect::<Vec<_>>(), unprefixed);
}
