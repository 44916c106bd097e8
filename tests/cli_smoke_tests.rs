mod common;

use std::fs;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

use common::{legacy_document, sample_project};

fn cli() -> Command {
    Command::cargo_bin("costplan_cli").expect("binary builds")
}

#[test]
fn new_then_show_reports_zero_totals() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("demo.json");

    cli()
        .args(["--store-dir"])
        .arg(temp.path())
        .args(["new", "Demo"])
        .arg("--output")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("New project created"));

    cli()
        .args(["--store-dir"])
        .arg(temp.path())
        .arg("show")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("Demo"))
        .stdout(contains("4 months"));
}

#[test]
fn export_writes_the_sectioned_report() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("rollout.json");
    fs::write(&file, serde_json::to_string_pretty(&sample_project()).unwrap()).unwrap();

    cli()
        .args(["--store-dir"])
        .arg(temp.path())
        .arg("export")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("PROJECT COST ESTIMATE"))
        .stdout(contains("SUMMARY"))
        .stdout(contains("Grand total"));
}

#[test]
fn check_surfaces_legacy_migrations() {
    let temp = tempdir().unwrap();
    let file = temp.path().join("legacy.json");
    fs::write(&file, serde_json::to_string_pretty(&legacy_document()).unwrap()).unwrap();

    cli()
        .args(["--store-dir"])
        .arg(temp.path())
        .arg("check")
        .arg(&file)
        .assert()
        .success()
        .stdout(contains("migrated:"));
}
