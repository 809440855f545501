//! Smoke tests for the `mlw` CLI surface.

use std::process::Command;

fn mlw() -> Command {
    Command::new(env!("CARGO_BIN_EXE_mlw"))
}

#[test]
fn help_prints_usage() {
    let output = mlw().arg("--help").output().expect("run mlw --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("Usage: mlw"),
        "missing help banner: {stdout}"
    );
}

#[test]
fn config_show_renders_toml_sections() {
    let output = mlw()
        .args(["config", "show"])
        .output()
        .expect("run mlw config show");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[monitor]"), "missing monitor section: {stdout}");
    assert!(
        stdout.contains("[channels.email]"),
        "missing channel section: {stdout}"
    );
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("mlw.toml");

    let first = mlw()
        .args(["config", "init", "--path"])
        .arg(&path)
        .output()
        .expect("run mlw config init");
    assert!(first.status.success(), "first init must succeed");
    assert!(path.exists());

    let second = mlw()
        .args(["config", "init", "--path"])
        .arg(&path)
        .output()
        .expect("run mlw config init again");
    assert!(!second.status.success(), "second init must refuse");
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("MLW-1001"), "missing error code: {stderr}");
}

#[test]
fn check_summarizes_matches_as_json() {
    let dir = tempfile::tempdir().expect("tempdir");
    let log = dir.path().join("sample.log");
    std::fs::write(
        &log,
        "ERROR: database timeout on query\n\
         ERROR: database corruption in index\n\
         WARN: transcode queue saturated\n\
         INFO: library scan complete\n",
    )
    .expect("write sample log");

    let output = mlw()
        .arg("check")
        .arg(&log)
        .arg("--json")
        .output()
        .expect("run mlw check");
    assert!(output.status.success());
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("check output is JSON");
    assert_eq!(value["totalLines"], 4);
    let matches = value["matches"].as_array().expect("matches array");
    assert!(
        matches.iter().any(|entry| entry["pattern"] == "database_error"
            && entry["count"] == 2
            && entry["severity"] == "error"),
        "database_error summary missing: {value}"
    );
    assert!(
        matches
            .iter()
            .any(|entry| entry["pattern"] == "transcoding_warning" && entry["count"] == 1),
        "transcoding_warning summary missing: {value}"
    );
}

#[test]
fn unconfigured_channel_test_fails_cleanly() {
    let output = mlw()
        .args(["test-channel", "discord"])
        .output()
        .expect("run mlw test-channel");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("MLW-3001"), "missing error code: {stderr}");
}

#[test]
fn completions_cover_the_binary_name() {
    let output = mlw()
        .args(["completions", "bash"])
        .output()
        .expect("run mlw completions");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("mlw"), "missing completion script: {stdout}");
}
