use std::process::Command;

fn lagsync_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lagsync"))
}

#[test]
fn test_version_flag() {
    let output = lagsync_bin().arg("--version").output().expect("failed to run lagsync");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("lagsync"));
}

#[test]
fn test_help_flag() {
    let output = lagsync_bin().arg("--help").output().expect("failed to run lagsync");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("status"));
    assert!(stdout.contains("correlate"));
}

#[test]
fn test_run_help_lists_overrides() {
    let output = lagsync_bin()
        .args(["run", "--help"])
        .output()
        .expect("failed to run lagsync");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--ffmpeg-path"));
    assert!(stdout.contains("--resolver-cmd"));
    assert!(stdout.contains("--min-confidence"));
}

#[test]
fn test_status_json() {
    let output = lagsync_bin()
        .args(["status", "--json"])
        .output()
        .expect("failed to run lagsync");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(&stdout).expect("status output is not valid JSON");
    assert_eq!(value.get("status").and_then(|v| v.as_str()), Some("idle"));
}

#[test]
fn test_correlate_missing_file_fails() {
    let output = lagsync_bin()
        .args(["correlate", "/nonexistent/source.f64le", "/nonexistent/sample.f64le"])
        .output()
        .expect("failed to run lagsync");
    assert!(!output.status.success());
}
