// ABOUTME: Integration tests for the caravel CLI commands.
// ABOUTME: Validates --help output and argument validation before any remote call.

use assert_cmd::Command;
use predicates::prelude::*;

fn caravel_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("caravel"))
}

#[test]
fn help_shows_commands() {
    caravel_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("provision"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("redeploy"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn deploy_help_documents_target_defaults() {
    caravel_cmd()
        .args(["deploy", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default: app"))
        .stdout(predicate::str::contains("default: us-east-1"))
        .stdout(predicate::str::contains("default: micro"));
}

// Target resolution runs before any platform call, so the validation
// tests below are safe without credentials or a daemon.

#[test]
fn unknown_power_tier_is_rejected() {
    caravel_cmd()
        .args(["--non-interactive", "deploy", "app", "us-east-1", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown power tier: turbo"));
}

#[test]
fn malformed_region_is_rejected() {
    caravel_cmd()
        .args(["--non-interactive", "provision", "app", "EU-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid region"));
}

#[test]
fn invalid_service_name_is_rejected() {
    caravel_cmd()
        .args(["--non-interactive", "status", "Bad_Name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("service name"));
}

#[test]
fn zero_scale_is_rejected() {
    caravel_cmd()
        .args(["--non-interactive", "deploy", "--scale", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("scale must be between"));
}

#[test]
fn config_errors_name_their_stage() {
    caravel_cmd()
        .args(["deploy", "app", "us-east-1", "turbo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("[config stage]"));
}
