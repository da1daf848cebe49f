//! Integration tests for `cfgsync colors` and `cfgsync paths`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_colors_prints_builtin_table() {
    let env = TestEnv::new();

    env.cfgsync()
        .arg("colors")
        .assert()
        .success()
        .stdout(predicate::str::contains("White"))
        .stdout(predicate::str::contains("FFFFFFFF"));
}

#[test]
fn test_colors_drops_malformed_entries() {
    let env = TestEnv::new();
    fs::write(
        env.colors_file(),
        "version = \"0.1.0\"\n\n[searchColors]\nsearchColors = [\"Red:FF0000FF\", \"BadEntry\", \"Bad:NOTHEX\"]\n",
    )
    .unwrap();

    env.cfgsync()
        .arg("colors")
        .assert()
        .success()
        .stdout(predicate::str::contains("Red"))
        .stdout(predicate::str::contains("FF0000FF"))
        .stdout(predicate::str::contains("BadEntry").not())
        .stdout(predicate::str::contains("NOTHEX").not());
}

#[test]
fn test_colors_human_output_aligned() {
    let env = TestEnv::new();
    fs::write(
        env.colors_file(),
        "version = \"0.1.0\"\n\n[searchColors]\nsearchColors = [\"Red:FF0000FF\"]\n",
    )
    .unwrap();

    env.cfgsync()
        .args(["colors", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Red          FF0000FF"));
}

#[test]
fn test_paths_reports_missing_then_present() {
    let env = TestEnv::new();

    env.cfgsync()
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overlay_exists\": false"));

    env.cfgsync().arg("sync").assert().success();

    env.cfgsync()
        .arg("paths")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"overlay_exists\": true"))
        .stdout(predicate::str::contains("overlay.toml"))
        .stdout(predicate::str::contains("search-colors.toml"));
}
