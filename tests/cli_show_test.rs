//! Integration tests for `cfgsync show`.

mod common;

use common::TestEnv;
use predicates::prelude::*;
use std::fs;

#[test]
fn test_show_defaults_as_json() {
    let env = TestEnv::new();

    env.cfgsync()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"maxColumns\": 9"))
        .stdout(predicate::str::contains("\"giveMode\": \"INVENTORY\""))
        .stdout(predicate::str::contains("\"debugModeEnabled\": false"));
}

#[test]
fn test_show_is_default_command() {
    let env = TestEnv::new();

    env.cfgsync()
        .assert()
        .success()
        .stdout(predicate::str::contains("\"maxColumns\": 9"));
}

#[test]
fn test_show_reflects_stored_values() {
    let env = TestEnv::new();
    fs::write(
        env.overlay_file(),
        "version = \"0.4.0\"\n\n[advanced]\nmaxColumns = 24\ngiveMode = \"MOUSE_PICKUP\"\n",
    )
    .unwrap();

    env.cfgsync()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"maxColumns\": 24"))
        .stdout(predicate::str::contains("\"giveMode\": \"MOUSE_PICKUP\""));
}

#[test]
fn test_show_falls_back_on_unknown_enum_label() {
    let env = TestEnv::new();
    fs::write(
        env.overlay_file(),
        "version = \"0.4.0\"\n\n[advanced]\ngiveMode = \"TELEPORT\"\n",
    )
    .unwrap();

    env.cfgsync()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"giveMode\": \"INVENTORY\""));
}

#[test]
fn test_show_human_output() {
    let env = TestEnv::new();

    env.cfgsync()
        .args(["show", "-H"])
        .assert()
        .success()
        .stdout(predicate::str::contains("maxColumns"))
        .stdout(predicate::str::contains("INVENTORY"));
}
