//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn leveltest() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("leveltest").unwrap()
}

#[test]
fn help_output() {
    leveltest()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("test session runner"))
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("run"));
}

#[test]
fn version_output() {
    leveltest()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("leveltest"));
}

#[test]
fn whoami_without_a_persisted_token() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::str::contains("Not logged in"));
}

#[test]
fn logout_without_a_session_is_fine() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .arg("logout")
        .assert()
        .success()
        .stdout(predicate::str::contains("Logged out"));
}

#[test]
fn classroom_run_requires_a_test_id() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .args(["run", "--variant", "classroom"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--test-id"));
}

#[test]
fn unknown_variant_is_rejected() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .args(["run", "--variant", "oral-exam"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown variant"));
}

#[test]
fn guarded_variant_refuses_to_run_logged_out() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .args(["run", "--variant", "practice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("log in"));
}

#[test]
fn missing_config_file_is_an_error() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .args(["--config", "no/such/leveltest.toml", "whoami"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config file not found"));
}

#[test]
fn register_rejects_unknown_roles() {
    let home = TempDir::new().unwrap();

    leveltest()
        .env("LEVELTEST_HOME", home.path())
        .args([
            "register",
            "--username",
            "maria",
            "--email",
            "maria@example.org",
            "--password",
            "pw",
            "--role",
            "admin",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown role"));
}
