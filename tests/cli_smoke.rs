//! CLI smoke tests: verify all commands that work without API keys.
//!
//! These tests run the compiled binary against a throwaway workspace and
//! verify exit codes and output. No API keys or network access required.

use std::path::Path;
use std::process::Command;

use tempfile::tempdir;

const DUMMY_KEY: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// Helper: run nines with given args and return (exit_code, stdout, stderr).
fn run_cli(workspace: &Path, args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_nines");
    let output = Command::new(bin)
        .args(args)
        .env("RUST_LOG", "") // suppress tracing noise
        .env("NINES_WORKSPACE", workspace)
        // Dummy 32-byte hex key so config commands never prompt or fail.
        .env("NINES_CONFIG_KEY", DUMMY_KEY)
        // Keep a developer's update mirror out of the test run.
        .env("NINES_UPDATE_URL", "")
        .output()
        .expect("failed to execute nines binary");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

/// Same as run_cli but with no config key in the environment.
fn run_cli_without_key(workspace: &Path, args: &[&str]) -> (i32, String, String) {
    let bin = env!("CARGO_BIN_EXE_nines");
    let output = Command::new(bin)
        .args(args)
        .env("RUST_LOG", "")
        .env("NINES_WORKSPACE", workspace)
        .env_remove("NINES_CONFIG_KEY")
        .env("NINES_UPDATE_URL", "")
        .output()
        .expect("failed to execute nines binary");
    let code = output.status.code().unwrap_or(-1);
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    (code, stdout, stderr)
}

// ============================================================================
// Help & Version
// ============================================================================

#[test]
fn cli_help_flag() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("Commands:"));
}

#[test]
fn cli_version_flag() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("nines"));
    // Should contain a semver-like version string
    assert!(stdout.contains('.'));
}

#[test]
fn cli_run_help() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["run", "--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no-update"));
}

// ============================================================================
// Interactive Session
// ============================================================================

/// With stdin closed the session must greet, hit EOF, and exit cleanly,
/// bootstrapping the workspace along the way.
#[test]
fn cli_no_args_session_exits_on_eof() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &[]);
    assert_eq!(code, 0);
    assert!(stdout.contains("9S online"), "got: {}", stdout);
    assert!(stdout.contains("Goodbye!"), "got: {}", stdout);
    assert!(dir.path().join("config").join("personality.json").is_file());
    assert!(dir.path().join("obsidian_vault").is_dir());
}

// ============================================================================
// Status
// ============================================================================

#[test]
fn cli_status_on_fresh_workspace() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Nines Status"));
    assert!(stdout.contains("Version:"));
    // Nothing bootstrapped yet
    assert!(stdout.contains("missing"));
    assert!(stdout.contains("none recorded yet"));
}

#[test]
fn cli_status_must_not_create_database() {
    let dir = tempdir().unwrap();
    let (code, _stdout, _stderr) = run_cli(dir.path(), &["status"]);
    assert_eq!(code, 0);
    assert!(!dir.path().join("memory_db").join("memory.sqlite").exists());
}

// ============================================================================
// Memory
// ============================================================================

#[test]
fn cli_memory_empty() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["memory"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("No interactions recorded yet."));
}

#[test]
fn cli_memory_with_limit() {
    let dir = tempdir().unwrap();
    let (code, _stdout, _stderr) = run_cli(dir.path(), &["memory", "--limit", "5"]);
    assert_eq!(code, 0);
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn cli_config_set_then_get_api_key() {
    let dir = tempdir().unwrap();

    let (code, stdout, _stderr) = run_cli(
        dir.path(),
        &["config", "set", "api_key", "sk-1234567890abcdef"],
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("api_key updated"));

    let (code, stdout, _stderr) = run_cli(dir.path(), &["config", "get", "api_key"]);
    assert_eq!(code, 0);
    // Secrets are masked on the way out
    assert!(stdout.contains("sk-1...cdef"), "got: {}", stdout);
    assert!(!stdout.contains("sk-1234567890abcdef"));
}

#[test]
fn cli_config_set_then_get_preference() {
    let dir = tempdir().unwrap();

    let (code, stdout, _stderr) = run_cli(dir.path(), &["config", "set", "tone", "formal"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("tone updated"));

    let (code, stdout, _stderr) = run_cli(dir.path(), &["config", "get", "tone"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("formal"));
}

#[test]
fn cli_config_get_unset_preference() {
    let dir = tempdir().unwrap();
    let (code, stdout, _stderr) = run_cli(dir.path(), &["config", "get", "tone"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("tone is not set"));
}

#[test]
fn cli_config_requires_key() {
    let dir = tempdir().unwrap();
    let (code, _stdout, stderr) = run_cli_without_key(dir.path(), &["config", "get", "api_key"]);
    assert_ne!(code, 0);
    assert!(
        stderr.contains("NINES_CONFIG_KEY"),
        "Expected missing-key error, got stderr: {}",
        stderr
    );
}

#[test]
fn cli_config_store_survives_restart() {
    let dir = tempdir().unwrap();

    run_cli(dir.path(), &["config", "set", "city", "Osaka"]);
    let (code, stdout, _stderr) = run_cli(dir.path(), &["config", "get", "city"]);

    assert_eq!(code, 0);
    assert!(stdout.contains("Osaka"));
    // The on-disk blob must not leak the plaintext
    let blob = std::fs::read_to_string(dir.path().join("config").join("encrypted.cfg")).unwrap();
    assert!(!blob.contains("Osaka"));
}

// ============================================================================
// Invalid commands & edge cases
// ============================================================================

#[test]
fn cli_invalid_command() {
    let dir = tempdir().unwrap();
    let (code, _stdout, stderr) = run_cli(dir.path(), &["nonexistent-command"]);
    assert_ne!(code, 0);
    assert!(
        stderr.contains("error") || stderr.contains("unrecognized"),
        "Expected error message for invalid command, got stderr: {}",
        stderr
    );
}
