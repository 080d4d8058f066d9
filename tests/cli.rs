use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;

fn rooms_csv() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/data/rooms.csv")
}

fn stdout_json(output: &std::process::Output) -> Value {
    let stdout = String::from_utf8(output.stdout.clone()).expect("stdout is not UTF-8");
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("invalid JSON ({e}): {stdout}"))
}

#[test]
fn risk_for_a_registry_room() {
    let output = cargo_bin_cmd!("roomrisk")
        .arg("risk")
        .arg("--rooms")
        .arg(rooms_csv())
        .args(["--room", "CENTR 101", "--occupants", "30", "--hours", "1"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["ventilation_cfm"], 600.0);
    assert_eq!(result["occupants"], 30);
    let risk = result["risk"].as_f64().unwrap();
    assert!(risk > 0.0 && risk < 1.0);
    assert_eq!(result["imputations"].as_array().unwrap().len(), 0);
}

#[test]
fn risk_reports_imputations_and_logs_them() {
    let output = cargo_bin_cmd!("roomrisk")
        .args(["--log-level", "warn", "risk", "--rooms"])
        .arg(rooms_csv())
        .args(["--room", "CENTR 115", "--occupants", "12", "--hours", "2"])
        .args(["--activity", "Social Event", "--cfm", "nan"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["ventilation_cfm"], 1200.0);
    let kinds: Vec<&str> = result["imputations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["kind"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, ["room_height", "ventilation_unavailable"]);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("WARN"), "{stderr}");
}

#[test]
fn unknown_room_fails() {
    let output = cargo_bin_cmd!("roomrisk")
        .arg("risk")
        .arg("--rooms")
        .arg(rooms_csv())
        .args(["--room", "NOPE 1", "--occupants", "5", "--hours", "1"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("room not found"), "{stderr}");
}

#[test]
fn unknown_activity_fails() {
    cargo_bin_cmd!("roomrisk")
        .arg("risk")
        .arg("--rooms")
        .arg(rooms_csv())
        .args(["--room", "CENTR 101", "--occupants", "5", "--hours", "1"])
        .args(["--activity", "Dancing"])
        .assert()
        .failure();
}

#[test]
fn planner_round_trip() {
    let planner_args = [
        "--volume",
        "300",
        "--ceiling-height",
        "3",
        "--air-exchange-rate",
        "2",
        "--emission-rate",
        "100",
    ];
    let output = cargo_bin_cmd!("roomrisk")
        .args(["max-occupancy", "--hours", "4", "--transient"])
        .args(planner_args)
        .output()
        .unwrap();
    assert!(output.status.success());
    let occupancy = stdout_json(&output);
    let n_max = occupancy["max_occupancy"].as_f64().unwrap();
    assert!(n_max > 1.0);

    let output = cargo_bin_cmd!("roomrisk")
        .args(["max-time", "--occupants", &n_max.to_string()])
        .args(planner_args)
        .output()
        .unwrap();
    assert!(output.status.success());
    let exposure = stdout_json(&output);
    let hours = exposure["max_exposure_hours"].as_f64().unwrap();
    assert!((hours - 4.0).abs() < 1e-6, "{hours}");
}

#[test]
fn planner_needs_a_room() {
    cargo_bin_cmd!("roomrisk")
        .args(["max-time", "--occupants", "10", "--air-exchange-rate", "2"])
        .assert()
        .failure();
}

#[test]
fn negative_cfm_clamps_to_room_minimum() {
    let output = cargo_bin_cmd!("roomrisk")
        .arg("risk")
        .arg("--rooms")
        .arg(rooms_csv())
        .args(["--room", "CENTR 101", "--occupants", "30", "--hours", "1", "--cfm=-4"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result = stdout_json(&output);
    assert_eq!(result["ventilation_cfm"], 600.0);
    let imputations = result["imputations"].as_array().unwrap();
    assert_eq!(imputations.len(), 1);
    assert_eq!(imputations[0]["kind"], "ventilation_out_of_range");
    assert_eq!(imputations[0]["requested_cfm"], -4.0);
}

#[test]
fn planner_reports_imputed_room_height() {
    let output = cargo_bin_cmd!("roomrisk")
        .args(["max-time", "--occupants", "10", "--rooms"])
        .arg(rooms_csv())
        .args(["--room", "CENTR 115", "--air-exchange-rate", "3"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let report = stdout_json(&output);
    let imputations = report["imputations"].as_array().unwrap();
    assert_eq!(imputations.len(), 1);
    assert_eq!(imputations[0]["kind"], "room_height");
    assert_eq!(imputations[0]["substitute_ft"], 10.0);
    let height = report["inputs"]["ceiling_height_m"].as_f64().unwrap();
    assert!((height - 3.048).abs() < 1e-12, "{height}");
}
