//! Integration tests for the eofloods binary against the in-memory platform
//!
//! Every session runs with `--platform memory`, so no network is involved.

use std::path::Path;
use std::process::{Command, Output};

const ROTTERDAM: &str = "--bbox=4.221067,51.949474,4.471006,52.073727";

fn eofloods(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_eofloods"))
        .current_dir(dir)
        .args(args)
        .env_remove("EOFLOODS_PLATFORM")
        .env_remove("EOFLOODS_ZOOM")
        .env_remove("EOFLOODS_PLOT_TIMEOUT")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command")
}

fn session_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["--platform", "memory", "--start", "2023-04-01", "--end", "2023-04-30", ROTTERDAM];
    args.extend_from_slice(extra);
    args
}

fn json_data(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("Output should be valid JSON");
    assert_eq!(parsed["status"], "success");
    parsed["data"].clone()
}

#[test]
fn test_available_json() {
    let dir = tempfile::tempdir().unwrap();
    let output = eofloods(dir.path(), &session_args(&["--dataset", "Sentinel-1", "--json", "available"]));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let data = json_data(&output);
    assert_eq!(data["provider"], "Hydrafloods");
    let datasets = data["data"].as_array().unwrap();
    assert_eq!(datasets.len(), 1);
    assert_eq!(datasets[0]["name"], "Sentinel-1");
    assert!(!datasets[0]["images"].as_array().unwrap().is_empty());
}

#[test]
fn test_unknown_dataset_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = eofloods(dir.path(), &session_args(&["--dataset", "Sentinel-5P", "available"]));

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not recognized"), "stderr: {}", stderr);
}

#[test]
fn test_missing_window_fails() {
    let dir = tempfile::tempdir().unwrap();
    let output = eofloods(dir.path(), &["--platform", "memory", ROTTERDAM, "available"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("--start"));
}

#[test]
fn test_export_json_lists_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let output = eofloods(dir.path(), &session_args(&["--dataset", "Sentinel-1", "--json", "export"]));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let data = json_data(&output);
    assert_eq!(data["provider"], "Hydrafloods");
    let tasks = data["data"]["tasks"].as_array().unwrap();
    assert!(!tasks.is_empty());
    assert!(tasks.iter().all(|t| t["dataset"] == "Sentinel-1"));
}

#[test]
fn test_preview_writes_html() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("preview.html");
    let map_arg = map_path.display().to_string();

    let output =
        eofloods(dir.path(), &session_args(&["--dataset", "Sentinel-1", "preview", "--output", map_arg.as_str()]));
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let html = std::fs::read_to_string(&map_path).unwrap();
    assert!(html.contains("<html>"));
    assert!(html.contains("Sentinel-1"));
}

#[test]
fn test_flood_extents_map_json() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("extents.json");
    let map_arg = map_path.display().to_string();

    let output = eofloods(
        dir.path(),
        &session_args(&["--dataset", "Sentinel-1", "flood-extents", "-o", map_arg.as_str()]),
    );
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let map: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&map_path).unwrap()).unwrap();
    let names: Vec<_> = map["layers"].as_array().unwrap().iter().filter_map(|l| l["name"].as_str()).collect();
    assert!(names.contains(&"Sentinel-1 max flood extent"), "layers: {:?}", names);
}

#[test]
fn test_config_reports_sources() {
    let dir = tempfile::tempdir().unwrap();
    let output = eofloods(dir.path(), &["--platform", "memory", "--json", "config"]);
    assert!(output.status.success());

    let data = json_data(&output);
    assert_eq!(data["platform"]["value"], "memory");
    assert_eq!(data["platform"]["source"], "cli");
    assert_eq!(data["zoom"]["source"], "default");
}

#[test]
fn test_config_file_is_picked_up() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("eofloods.toml"), "zoom = 11\n").unwrap();

    let output = eofloods(dir.path(), &["--json", "config"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let data = json_data(&output);
    assert_eq!(data["zoom"]["value"], "11");
    assert_eq!(data["zoom"]["source"], "file");
}

#[test]
fn test_gfm_available_products() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_eofloods"))
        .current_dir(dir.path())
        .args([
            "--platform",
            "memory",
            "--provider",
            "gfm",
            "--start",
            "2022-10-01",
            "--end",
            "2022-10-15",
            ROTTERDAM,
            "--json",
            "available",
        ])
        .env_remove("EOFLOODS_PLATFORM")
        .env("GFM_EMAIL", "user@example.org")
        .env("GFM_PWD", "hunter2")
        .env("RUST_LOG", "warn")
        .output()
        .expect("Failed to execute command");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let data = json_data(&output);
    assert_eq!(data["provider"], "GFM");
    assert_eq!(data["data"].as_array().unwrap().len(), 5);
}
