//! Integration tests for the `scoutly` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! and error handling — all without requiring a live Scout account.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `scoutly` binary with env isolation.
///
/// Clears all `SCOUT_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn scoutly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("scoutly");
    cmd.env("HOME", "/tmp/scoutly-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/scoutly-cli-test-nonexistent")
        .env_remove("SCOUT_PROFILE")
        .env_remove("SCOUT_EMAIL")
        .env_remove("SCOUT_LOCATION")
        .env_remove("SCOUT_OUTPUT")
        .env_remove("SCOUT_TIMEOUT")
        .env_remove("SCOUT_PASSWORD");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = scoutly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    scoutly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Scout")
            .and(predicate::str::contains("devices"))
            .and(predicate::str::contains("sensors"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    scoutly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("scoutly"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    scoutly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    scoutly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = scoutly_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_sensors_list_no_config() {
    scoutly_cmd()
        .args(["sensors", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("profile")),
        );
}

#[test]
fn test_unknown_profile_is_reported() {
    // A typo'd --profile must be diagnosed as such, not fall through to
    // the missing-config error.
    scoutly_cmd()
        .args(["--profile", "nosuch", "sensors", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("nosuch").and(predicate::str::contains("not found")),
        );
}

#[test]
fn test_config_show_no_config() {
    // `config show` uses load_config_or_default() so it succeeds even
    // when no config file exists — it just renders the default config.
    scoutly_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_config_path_prints_location() {
    scoutly_cmd()
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_invalid_output_format() {
    let output = scoutly_cmd()
        .args(["--output", "invalid", "sensors", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly — the failure should be about
    // missing config, not about argument parsing.
    scoutly_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--timeout",
            "60",
            "sensors",
            "list",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("profile")),
        );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_devices_subcommands_exist() {
    scoutly_cmd()
        .args(["devices", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("show")));
}

#[test]
fn test_sensors_subcommands_exist() {
    scoutly_cmd()
        .args(["sensors", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("list").and(predicate::str::contains("show")));
}

#[test]
fn test_config_subcommands_exist() {
    scoutly_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("path")),
        );
}
