use assert_cmd::Command;
use predicates::prelude::*;

const BODIES: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/bodies");
const BODIES_YAML: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/bodies.yaml");
const PLANNER: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../configs/planner.toml");

#[test]
fn mission_prints_four_segment_plan() {
    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.args(["--from", "earth", "--to", "moon", "--bodies", BODIES, "--planner", PLANNER]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== Flight Plan: EARTH -> MOON ==="))
        .stdout(predicate::str::contains("hohmann_transfer"))
        .stdout(predicate::str::contains("periapsis_reached"))
        .stdout(predicate::str::contains("(prograde)"));
}

#[test]
fn mission_exports_csv_and_json() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("plan.csv");
    let json = dir.path().join("plan.json");

    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.args(["--from", "EARTH", "--to", "MOON", "--bodies", BODIES_YAML])
        .args(["--capture-sense", "retrograde", "--samples", "3"])
        .arg("--csv")
        .arg(&csv)
        .arg("--json")
        .arg(&json);
    cmd.assert().success();

    let rows = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(rows.lines().count(), 1 + 4 * 3);
    assert!(rows.starts_with("time_s,segment,phase,reference_body"));

    let summary = std::fs::read_to_string(&json).unwrap();
    assert!(summary.contains("\"capture_sense\": \"retrograde\""));
    assert!(summary.contains("\"destination\": \"MOON\""));
}

#[test]
fn mission_rejects_pairs_that_are_not_planet_and_moon() {
    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.args(["--from", "MOON", "--to", "EARTH", "--bodies", BODIES]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("does not orbit"));
}

#[test]
fn mission_reports_unknown_bodies() {
    let mut cmd = Command::cargo_bin("mission").expect("mission bin");
    cmd.args(["--from", "EARTH", "--to", "EUROPA", "--bodies", BODIES]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("EUROPA"));
}

#[test]
fn transfer_prints_burns_and_launch_window() {
    let mut cmd = Command::cargo_bin("transfer").expect("transfer bin");
    cmd.args(["--body", "EARTH", "--r1-km", "6571", "--r2-km", "384400"])
        .args(["--target", "MOON", "--time", "1000", "--bodies", BODIES]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("=== Hohmann Transfer about EARTH ==="))
        .stdout(predicate::str::contains("dv1 = 3.1"))
        .stdout(predicate::str::contains("to meet MOON at apoapsis"));
}

#[test]
fn transfer_requires_positive_radii() {
    let mut cmd = Command::cargo_bin("transfer").expect("transfer bin");
    cmd.args(["--body", "EARTH", "--r1-km", "0", "--r2-km", "42164", "--bodies", BODIES]);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("radii must be positive"));
}
