use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_describes_both_modes() {
    let mut cmd = Command::cargo_bin("docmerge").expect("binary exists");
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run").and(predicate::str::contains("once")));
}

#[test]
fn once_fails_fast_without_required_environment() {
    let mut cmd = Command::cargo_bin("docmerge").expect("binary exists");
    cmd.arg("once").env_clear();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("REMOTE_SPREADSHEET"));
}

#[test]
fn invalid_interval_is_rejected_at_startup() {
    let mut cmd = Command::cargo_bin("docmerge").expect("binary exists");
    cmd.arg("once")
        .env_clear()
        .env("REMOTE_SPREADSHEET", "drive:input/people.xlsx")
        .env("REMOTE_TEMPLATE", "drive:input/template.docx")
        .env("REMOTE_OUTPUT_DIR", "drive:out")
        .env("NAME_FIELD", "name")
        .env("INTERVAL_MINUTES", "soon");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("INTERVAL_MINUTES"));
}
