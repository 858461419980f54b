use std::io::Write;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::{NamedTempFile, tempdir};

fn map_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write map");
    file
}

#[test]
fn render_command_writes_tile_bytes_end_to_end() {
    let map = map_file(
        r#"{
            "name": "demo",
            "layers": [
                { "name": "water", "features": ["POLYGON((0 0,1 0,1 1,0 0))"] },
                { "name": "roads", "features": ["LINESTRING(0 0,2 2)"] }
            ]
        }"#,
    );
    let out_dir = tempdir().expect("tmp dir");
    let out = out_dir.path().join("demo.tile");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tilebridge"));
    cmd.arg("render")
        .arg("--map")
        .arg(map.path())
        .arg("--out")
        .arg(&out)
        .assert()
        .success();

    let bytes = std::fs::read(&out).expect("tile file should exist");
    assert!(!bytes.is_empty());
    assert_eq!(&bytes[..4], b"TBW1");
}

#[test]
fn missing_map_file_fails_fast() {
    let out_dir = tempdir().expect("tmp dir");
    let out = out_dir.path().join("never.tile");

    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tilebridge"));
    cmd.arg("render")
        .arg("--map")
        .arg("does-not-exist.json")
        .arg("--out")
        .arg(&out)
        .assert()
        .failure()
        .stdout(contains("failed to read map"));

    assert!(!out.exists());
}
