//! End-to-end checks of the command line. Apart from `off`, none of these
//! reach a step that changes the host: they stop at usage or argument
//! validation.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

// A service name no host has enabled, so the is-enabled query never refuses.
const SERVICE: &str = "sshtunnel-integration-test.service";

fn sshtunnel() -> Command {
    Command::cargo_bin("sshtunnel").unwrap()
}

fn on(args: &[&str]) -> Command {
    let mut cmd = sshtunnel();
    cmd.args(["--service-name", SERVICE, "on"]).args(args);
    cmd
}

#[test]
fn no_arguments_prints_usage() {
    sshtunnel()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("reverse SSH tunnel"));
}

#[test]
fn help_flag_and_word_print_usage() {
    for arg in ["-h", "help"] {
        sshtunnel()
            .arg(arg)
            .assert()
            .code(1)
            .stdout(predicate::str::contains("Usage"));
    }
}

#[test]
fn help_with_trailing_words_prints_usage() {
    sshtunnel()
        .args(["help", "foo"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("unknown parameter").not());
}

#[test]
fn unknown_flag_as_first_parameter() {
    sshtunnel()
        .arg("--bogus")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown parameter '--bogus'"));

    sshtunnel()
        .arg("--strict")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown parameter '--strict'"));
}

#[test]
fn unknown_parameter_is_not_an_error() {
    sshtunnel()
        .arg("restart")
        .assert()
        .success()
        .stdout(predicate::str::contains("unknown parameter 'restart'"));
}

#[test]
fn version_flag() {
    sshtunnel()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn on_without_target() {
    on(&[])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[USER]@[SERVER] missing"));
}

#[test]
fn on_with_malformed_target() {
    for target in ["userhost", "a@b@c"] {
        on(&[target, "8080:80"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("[USER]@[SERVER] wrong"));
    }
}

#[test]
fn on_without_ports() {
    on(&["user@example.com"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[INTERNAL-PORT]:[EXTERNAL-PORT] missing"));
}

#[test]
fn on_with_malformed_ports() {
    on(&["user@example.com", "8080"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("wrong format '8080'"));

    on(&["user@example.com", "abc:80"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("internal not number 'abc:80'"));

    on(&["user@example.com", "80:xyz"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("external not number '80:xyz'"));
}

#[test]
fn on_with_negative_port() {
    on(&["user@example.com", "-1:80"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("internal not number '-1:80'"));
}

#[test]
fn on_with_hyphenated_target() {
    on(&["-user", "8080:80"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("[USER]@[SERVER] wrong '-user'"));
}

// Runs the real flow: as root it ends with "OK Done", otherwise it stops at
// the privilege check. Either way trailing words are not rejected by clap.
#[test]
fn off_ignores_trailing_arguments() {
    let tmp = TempDir::new().unwrap();

    let output = sshtunnel()
        .args(["--service-name", SERVICE, "--unit-dir"])
        .arg(tmp.path())
        .args(["off", "now"])
        .output()
        .unwrap();

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains(&format!("*** Disabling systemd service: {SERVICE}")));
    match output.status.code() {
        Some(0) => assert!(stdout.contains("OK Done")),
        Some(1) => assert!(stderr.contains("root permissions")),
        code => panic!("unexpected exit {code:?}: {stderr}"),
    }
}

#[test]
fn validation_leaves_stdout_empty() {
    on(&["user@example.com", "8080:80", "nope"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty());
}
