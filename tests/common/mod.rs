#![allow(dead_code)]

use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use serde_json::Value;
use tempfile::TempDir;

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

pub fn fixture_text(name: &str) -> String {
    fs::read_to_string(fixture_path(name)).expect("fixture should be readable")
}

/// Copies a fixture into a fresh temp dir so `--write` runs never touch the checked-in file.
pub fn copy_fixture_to_temp_dir(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("temp dir should be created");
    let target = dir.path().join(name);
    fs::copy(fixture_path(name), &target).expect("fixture copy should succeed");
    (dir, target)
}

pub fn run_update(args: &[&str]) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_usacloud-update"));
    command.env_remove("USACLOUD_UPDATE_LOG");
    command.args(args);
    command.output().expect("failed to run usacloud-update binary")
}

pub fn run_update_with_stdin(args: &[&str], input: &str) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_usacloud-update"));
    command.env_remove("USACLOUD_UPDATE_LOG");
    command.args(args);
    command.stdin(Stdio::piped());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .expect("failed to spawn usacloud-update binary");
    let stdin = child.stdin.as_mut().expect("stdin should be available");
    stdin
        .write_all(input.as_bytes())
        .expect("stdin write should succeed");
    child
        .wait_with_output()
        .expect("failed to read process output")
}

pub fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).expect("stdout should be valid JSON")
}

pub fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "command should succeed: stdout={} stderr={}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
}

pub fn assert_error_type(output: &Output, expected_type: &str) {
    assert!(!output.status.success(), "command should fail");
    let response = stdout_json(output);
    assert_eq!(response["error"]["type"], expected_type);
}
