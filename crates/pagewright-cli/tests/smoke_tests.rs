//! Smoke tests for the pagewright binary

#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn pagewright() -> Command {
    let mut cmd = Command::cargo_bin("pagewright").expect("binary builds");
    cmd.env_remove("RUST_LOG")
        .env_remove("TEST_EMAIL")
        .env_remove("TEST_PASSWORD")
        .env_remove("PAGEWRIGHT_BASE_URL")
        .env_remove("PAGEWRIGHT_TIMEOUT_MS");
    cmd
}

#[test]
fn test_help() {
    pagewright()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("compliance"));
}

#[test]
fn test_version() {
    pagewright()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_no_subcommand_fails() {
    pagewright().assert().failure();
}

#[test]
fn test_compliance_help_lists_screenshot() {
    pagewright()
        .args(["compliance", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--screenshot"));
}

#[test]
fn test_config_prints_without_password() {
    pagewright()
        .args(["config", "--base-url", "https://staging.test/", "--color", "never"])
        .env("TEST_EMAIL", "qa@example.com")
        .env("TEST_PASSWORD", "hunter2")
        .assert()
        .success()
        .stdout(predicate::str::contains("https://staging.test"))
        .stdout(predicate::str::contains("qa@example.com"))
        .stdout(predicate::str::contains("hunter2").not());
}

#[test]
fn test_bad_base_url_exits_nonzero() {
    pagewright()
        .args(["config", "--base-url", "not-a-url"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("base URL"));
}

#[test]
fn test_bad_timeout_env_exits_nonzero() {
    pagewright()
        .arg("config")
        .env("PAGEWRIGHT_TIMEOUT_MS", "soon")
        .assert()
        .failure()
        .stderr(predicate::str::contains("PAGEWRIGHT_TIMEOUT_MS"));
}
