use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("docchat")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("ask"))
        .stdout(predicate::str::contains("upload"))
        .stdout(predicate::str::contains("ping"))
        .stdout(predicate::str::contains("config"))
        .stdout(predicate::str::contains("--backend-url"));
}

#[test]
fn test_ask_help_shows_file_flag() {
    cargo_bin_cmd!("docchat")
        .args(["ask", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("QUESTION"));
}

#[test]
fn test_ask_requires_a_file() {
    cargo_bin_cmd!("docchat")
        .args(["ask", "What is this?"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--file"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("docchat")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("0.1"));
}

#[test]
fn test_chat_requires_a_terminal() {
    let home = tempfile::tempdir().unwrap();

    cargo_bin_cmd!("docchat")
        .env("DOCCHAT_HOME", home.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("interactive terminal"));
}
