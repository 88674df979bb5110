use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{FRODO, PIPPIN, Sandbox};

#[test]
fn test_kiosk_signs_each_line() {
    let sb = Sandbox::new();

    sb.testdb()
        .arg("kiosk")
        .write_stdin(format!("{PIPPIN}\n\n{FRODO}\nquit\n"))
        .assert()
        .success()
        .stdout(
            contains("Welcome to the Tutoring Center")
                .and(contains("Enter Student ID:"))
                .and(contains("Signed in: Pippin Took"))
                .and(contains("Signed in: Frodo Baggins")),
        );

    sb.testdb()
        .arg("status")
        .assert()
        .success()
        .stdout(contains("Frodo Baggins").and(contains("Pippin Took")));
}

#[test]
fn test_kiosk_survives_bad_input() {
    let sb = Sandbox::new();

    sb.testdb()
        .arg("kiosk")
        .write_stdin(format!("hello\n888999999\n{PIPPIN}\n"))
        .assert()
        .success()
        .stdout(
            contains("'hello' is not a valid ID. Please try again.")
                .and(contains("ID 888999999 is not registered."))
                .and(contains("Signed in: Pippin Took")),
        );
}

#[test]
fn test_kiosk_exits_on_eof() {
    let sb = Sandbox::new();
    sb.testdb().arg("kiosk").write_stdin("").assert().success();
}
