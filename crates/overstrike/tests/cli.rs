#![cfg(feature = "cli")]

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

/// `' '` with no ink and `'#'` with uniform mid-level ink, default 4x3x8 geometry.
fn write_table(dir: &Path) -> PathBuf {
    let block = |v: f32| json!(vec![vec![vec![v; 8]; 3]; 4]);
    let table = json!({ " ": block(0.0), "#": block(0.5) });
    let path = dir.join("chars.json");
    fs::write(&path, table.to_string()).expect("write table");
    path
}

fn write_image(dir: &Path, name: &str, img: GrayImage) -> PathBuf {
    let path = dir.join(name);
    img.save(&path).expect("write png");
    path
}

fn checker() -> GrayImage {
    GrayImage::from_fn(64, 48, |x, y| {
        Luma([if (x / 4 + y / 4) % 2 == 0 { 255 } else { 0 }])
    })
}

#[test]
fn blank_picture_prints_only_framing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = write_table(dir.path());
    let image = write_image(dir.path(), "black.png", GrayImage::new(30, 20));

    let expected = format!("{}\r\r\n{}", "\r\n".repeat(7), "\r\n".repeat(6));
    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .args(["--width", "2", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::eq(expected.as_bytes()));
}

#[test]
fn white_picture_with_partial_block_prints_only_framing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = write_table(dir.path());
    // 20 px tall resizes to 48 rows, padded to one 64 px glyph row.
    let white = GrayImage::from_pixel(30, 20, Luma([255]));
    let image = write_image(dir.path(), "white.png", white);

    let expected = format!("{}\r\r\n{}", "\r\n".repeat(7), "\r\n".repeat(6));
    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .args(["--width", "2", "--output", "-"])
        .assert()
        .success()
        .stdout(predicate::eq(expected.as_bytes()));
}

#[test]
fn textured_picture_prints_ink() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = write_table(dir.path());
    let image = write_image(dir.path(), "checker.png", checker());

    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .args(["--width", "2", "--layers", "1", "--title", "CHECK", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#").and(predicate::str::contains("CHECK")));
}

#[test]
fn output_defaults_to_image_name() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = write_table(dir.path());
    let image = write_image(dir.path(), "checker.png", checker());

    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .args(["--width", "2", "--indent", "3"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let written = fs::read_to_string(dir.path().join("checker.png.txt")).expect("output file");
    assert!(written.starts_with(&"\r\n".repeat(7)));
    assert!(written.contains("   #"));
}

#[test]
fn config_file_is_applied() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = write_table(dir.path());
    let image = write_image(dir.path(), "black.png", GrayImage::new(30, 20));
    let config = dir.path().join("overstrike.json");
    fs::write(
        &config,
        json!({ "render": { "layers": 1 }, "job": { "lead_feeds": 0, "trail_feeds": 0 } })
            .to_string(),
    )
    .expect("write config");

    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .arg("--config")
        .arg(&config)
        .args(["--width", "2", "-o", "-"])
        .assert()
        .success()
        .stdout(predicate::eq("\r\n\r\n".as_bytes()));
}

#[test]
fn bad_table_fails_without_output() {
    let dir = tempfile::tempdir().expect("tempdir");
    let table = dir.path().join("broken.json");
    fs::write(&table, r##"{ "#": [[[0.5]]] }"##).expect("write table");
    let image = write_image(dir.path(), "black.png", GrayImage::new(30, 20));

    Command::cargo_bin("overstrike")
        .expect("binary")
        .arg(&image)
        .arg("--table")
        .arg(&table)
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
    assert!(!dir.path().join("black.png.txt").exists());
}
