//! Integration tests for configuration handling of the binary.
//!
//! These run the built binary with `--check-config` / `--show-config`.

use std::io::Write;
use tempfile::Builder;

/// Helper to get the binary path
fn binary_path() -> std::path::PathBuf {
    std::path::PathBuf::from(env!("CARGO_BIN_EXE_herakles-log-collector"))
}

fn run(args: &[&str]) -> (bool, String, String) {
    let output = std::process::Command::new(binary_path())
        .args(args)
        .output()
        .expect("Failed to execute command");
    (
        output.status.success(),
        String::from_utf8_lossy(&output.stdout).into_owned(),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

#[test]
fn test_defaults_are_valid() {
    let (ok, stdout, stderr) = run(&["--no-config", "--check-config"]);
    assert!(ok, "stdout: {stdout}\nstderr: {stderr}");
    assert!(stdout.contains("Configuration is valid"));
}

#[test]
fn test_zero_max_logs_rejected() {
    let (ok, stdout, stderr) = run(&["--no-config", "--max-logs", "0", "--check-config"]);
    assert!(!ok);
    assert!(
        stderr.contains("max_logs must be at least 1"),
        "stdout: '{stdout}', stderr: '{stderr}'"
    );
}

#[test]
fn test_oversized_max_logs_rejected() {
    let (ok, stdout, stderr) = run(&[
        "--no-config",
        "--max-logs",
        "18446744073709551615",
        "--check-config",
    ]);
    assert!(!ok, "stdout: '{stdout}'");
    assert!(
        stderr.contains("max_logs must be at most"),
        "stdout: '{stdout}', stderr: '{stderr}'"
    );
}

#[test]
fn test_port_clash_rejected() {
    let (ok, _, stderr) = run(&[
        "--no-config",
        "--port",
        "9300",
        "--http-port",
        "9300",
        "--check-config",
    ]);
    assert!(!ok);
    assert!(stderr.contains("Configuration invalid"), "stderr: '{stderr}'");

    let (ok, _, _) = run(&[
        "--no-config",
        "--port",
        "9300",
        "--http-port",
        "9300",
        "--disable-http",
        "--check-config",
    ]);
    assert!(ok);
}

#[test]
fn test_invalid_file_thresholds_rejected() {
    let mut file = Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(
        file,
        "health:\n  client_roster:\n    warn_percent: 90.0\n    critical_percent: 50.0"
    )
    .unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    let (ok, _, stderr) = run(&["-c", path, "--check-config"]);
    assert!(!ok);
    assert!(stderr.contains("client_roster"), "stderr: '{stderr}'");
}

#[test]
fn test_show_config_merges_file_and_cli() {
    let mut file = Builder::new().suffix(".json").tempfile().unwrap();
    write!(file, r#"{{"max_logs": 42, "port": 7001}}"#).unwrap();
    file.flush().unwrap();

    let path = file.path().to_str().unwrap();
    let (ok, stdout, _) = run(&["-c", path, "--port", "7002", "--show-config"]);
    assert!(ok);
    assert!(stdout.contains("max_logs: 42"), "{stdout}");
    assert!(stdout.contains("port: 7002"), "{stdout}");
}

#[test]
fn test_config_subcommand_to_stdout() {
    let (ok, stdout, _) = run(&["config", "-o", "-", "--format", "toml"]);
    assert!(ok);
    assert!(stdout.contains("max_logs = 10000"), "{stdout}");
}
