#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const PLAYERS: &str = "\
name,email,group
Alice,alice@example.org,A
Bob,bob@example.org,A
Chloé,chloe@example.org,B
David,david@example.org,B
";

fn cli() -> Command {
    Command::cargo_bin("lutin-cli").unwrap()
}

#[test]
fn draw_prints_one_line_per_participant() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();

    let out = cli()
        .args(["draw", "--group", "group", "--seed", "4", "--players"])
        .arg(&players)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let out = String::from_utf8(out).unwrap();
    assert_eq!(out.lines().count(), 4);
    for line in out.lines() {
        let groups: Vec<&str> = line.split(" in group ").skip(1).collect();
        assert_eq!(groups.len(), 2);
        assert_ne!(groups[0].split(' ').next(), groups[1].split(' ').next());
    }
}

#[test]
fn infeasible_draw_fails_with_explicit_error() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let rules = dir.path().join("rules.txt");
    fs::write(&rules, "group A gets group A\n").unwrap();

    cli()
        .args(["draw", "--max-attempts", "20", "--players"])
        .arg(&players)
        .arg("--rules")
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no valid assignment found after 20 attempts"));
}

#[test]
fn send_writes_outbox_without_prompt_when_confirmed() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let message = dir.path().join("message.txt");
    fs::write(&message, "Père Noël secret\nTu offres à {name}.\n").unwrap();
    let outbox = dir.path().join("outbox");

    cli()
        .args(["send", "--yes", "--from", "lutin@example.org", "--players"])
        .arg(&players)
        .arg("--message")
        .arg(&message)
        .arg("--outbox")
        .arg(&outbox)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 message(s) written"));

    assert_eq!(fs::read_dir(&outbox).unwrap().count(), 4);
}

#[test]
fn send_aborts_when_not_confirmed() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let message = dir.path().join("message.txt");
    fs::write(&message, "Sujet\nPour {name}\n").unwrap();
    let outbox = dir.path().join("outbox");

    cli()
        .args(["send", "--players"])
        .arg(&players)
        .arg("--message")
        .arg(&message)
        .arg("--outbox")
        .arg(&outbox)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Aborting"));

    assert!(!outbox.exists());
}

#[test]
fn check_rules_reports_malformed_line() {
    let dir = tempdir().unwrap();
    let rules = dir.path().join("rules.txt");
    fs::write(&rules, "# ok\ngroup A gets group\n").unwrap();

    cli()
        .args(["check-rules", "--rules"])
        .arg(&rules)
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed rule on line 2"));
}

#[test]
fn check_rules_validates_the_group_column() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let rules = dir.path().join("rules.txt");
    fs::write(&rules, "group A never group A\n").unwrap();

    cli()
        .args(["check-rules", "--group", "team", "--rules"])
        .arg(&rules)
        .arg("--players")
        .arg(&players)
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown column: team"));

    cli()
        .args(["check-rules", "--group", "group", "--rules"])
        .arg(&rules)
        .arg("--players")
        .arg(&players)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK: 1 rule(s)"));
}

#[test]
fn send_with_missing_credentials_fails_before_any_draw() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let message = dir.path().join("message.txt");
    fs::write(&message, "Sujet\nPour {name}\n").unwrap();

    cli()
        .args(["send", "--players"])
        .arg(&players)
        .arg("--message")
        .arg(&message)
        .arg("--credfile")
        .arg(dir.path().join("absent.txt"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("reading credentials"));
}

#[test]
fn smtp_send_aborts_when_not_confirmed() {
    let dir = tempdir().unwrap();
    let players = dir.path().join("players.csv");
    fs::write(&players, PLAYERS).unwrap();
    let message = dir.path().join("message.txt");
    fs::write(&message, "Sujet\nPour {name}\n").unwrap();
    let creds = dir.path().join("creds.txt");
    fs::write(&creds, "santa@example.org\nhunter2\n").unwrap();

    cli()
        .args(["send", "--server", "smtp.example.invalid", "--players"])
        .arg(&players)
        .arg("--message")
        .arg(&message)
        .arg("--credfile")
        .arg(&creds)
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Send 4 email(s) via smtp.example.invalid:587?"))
        .stdout(predicate::str::contains("Aborting"));
}
