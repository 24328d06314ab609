mod common;

use std::fs;

use common::{KioskDir, fixture_path, spawn_command, stdout};

// ============================================================================
// version / completions
// ============================================================================

#[test]
fn version_human() {
    let output = spawn_command(&["version"]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim(),
        format!("raffle {}", env!("CARGO_PKG_VERSION"))
    );
}

#[test]
fn version_json() {
    let output = spawn_command(&["version", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be valid JSON");
    assert_eq!(parsed["name"], "raffle");
}

#[test]
fn completions_bash() {
    let output = spawn_command(&["completions", "bash"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("raffle"));
}

// ============================================================================
// validate
// ============================================================================

#[test]
fn validate_clean_bank() {
    let bank = fixture_path("morning.tsv");
    let output = spawn_command(&["validate", bank.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "validate should succeed for a clean bank: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout(&output).contains("4 record(s)"));
}

#[test]
fn validate_bad_bank_reports_lines() {
    let bank = fixture_path("bad_bank.tsv");
    let output = spawn_command(&["validate", bank.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));

    let text = stdout(&output);
    assert!(text.contains("FAIL"), "{text}");
    assert!(text.contains("line 2:"), "{text}");
    assert!(text.contains("line 3:"), "{text}");
}

#[test]
fn validate_json_output() {
    let good = fixture_path("morning.tsv");
    let bad = fixture_path("bad_bank.tsv");
    let output = spawn_command(&[
        "validate",
        "--format",
        "json",
        good.to_str().unwrap(),
        bad.to_str().unwrap(),
    ]);
    assert!(!output.status.success());

    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be valid JSON");
    let reports = parsed.as_array().expect("one report per file");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["issues"].as_array().unwrap().len(), 0);
    assert_eq!(reports[1]["issues"][0]["line"], 2);
}

#[test]
fn validate_save_and_roster_kinds() {
    let save = fixture_path("save4821.tsv");
    let output = spawn_command(&["validate", "--kind", "save", save.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stdout(&output));

    let roster = fixture_path("pins.tsv");
    let output = spawn_command(&["validate", "--kind", "roster", roster.to_str().unwrap()]);
    assert!(output.status.success(), "{}", stdout(&output));
    assert!(stdout(&output).contains("2 record(s)"));
}

#[test]
fn validate_missing_file() {
    let output = spawn_command(&["validate", "/tmp/nonexistent_raffle_bank.tsv"]);
    assert!(!output.status.success());
}

// ============================================================================
// summary
// ============================================================================

#[test]
fn summary_human() {
    let kiosk = KioskDir::new();
    kiosk.install_save("save4821.tsv", "4821");

    let output = kiosk.run(&["summary", "4821"]);
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let text = stdout(&output);
    assert!(text.starts_with("Falcons (4821, morning session)"), "{text}");
    assert!(text.contains("Tickets to redeem: 1"), "{text}");
}

#[test]
fn summary_json() {
    let kiosk = KioskDir::new();
    kiosk.install_save("save4821.tsv", "4821");

    let output = kiosk.run(&["summary", "4821", "--format", "json"]);
    assert!(output.status.success());
    let parsed: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be valid JSON");
    assert_eq!(parsed["team"], "Falcons");
    assert_eq!(parsed["correct"], 2);
    assert_eq!(parsed["tickets_redeemed"], 1);
    assert_eq!(parsed["categories"].as_array().unwrap().len(), 3);
}

#[test]
fn summary_without_save_fails() {
    let kiosk = KioskDir::new();
    let output = kiosk.run(&["summary", "5150"]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no save found for team 5150"));
    assert!(!kiosk.save_path("5150").exists());
}

#[test]
fn missing_config_file_is_a_config_error() {
    let output = spawn_command(&["--config", "/nonexistent/raffle.yaml", "summary", "1"]);
    assert_eq!(output.status.code(), Some(2));
}

// ============================================================================
// play
// ============================================================================

#[test]
fn play_login_shows_starter_question() {
    let kiosk = KioskDir::new();
    let output = kiosk.run_with_input(&["play", "--seed", "7"], "login 4821\nscore\n");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let text = stdout(&output);
    assert!(text.contains("Welcome, Falcons (morning session)!"), "{text}");
    assert!(text.contains("[Starter] What colour is the sky?"), "{text}");
    assert!(text.contains("Tickets to redeem: 0"), "{text}");

    let save = fs::read_to_string(kiosk.save_path("4821")).expect("save written on exit");
    assert!(save.starts_with("TEAM:4821:0\n"));
    assert!(save.contains("CATEGORY:Starter:UNLOCKED"));
    assert!(save.contains("CATEGORY:Math:LOCKED"));
}

#[test]
fn play_answer_is_recorded() {
    let kiosk = KioskDir::new();
    let output = kiosk.run_with_input(&["play", "--seed", "7"], "login 4821\n1\n");
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(
        text.contains("Correct!") || text.contains("Not quite. The answer was: Blue"),
        "{text}"
    );

    let save = fs::read_to_string(kiosk.save_path("4821")).unwrap();
    let starter_row = save
        .lines()
        .find(|l| l.starts_with("Starter\t"))
        .expect("starter row saved");
    assert_eq!(starter_row.split('\t').count(), 7);
}

#[test]
fn play_redeem_updates_save() {
    let kiosk = KioskDir::new();
    kiosk.install_save("save4821.tsv", "4821");

    let output = kiosk.run_with_input(
        &["play"],
        "login 4821\nredeem 1111\nredeem 2020\nquit\n",
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("error: invalid admin login"), "{text}");
    assert!(text.contains("Redeemed 1 ticket(s)."), "{text}");
    assert!(text.contains("Goodbye, Falcons. Progress saved."), "{text}");

    let save = fs::read_to_string(kiosk.save_path("4821")).unwrap();
    assert!(save.starts_with("TEAM:4821:2\n"));
}

#[test]
fn play_unknown_pin_keeps_running() {
    let kiosk = KioskDir::new();
    let output = kiosk.run_with_input(&["play"], "login 1\nhelp\n");
    assert!(output.status.success());

    let text = stdout(&output);
    assert!(text.contains("error: pin 1 is not valid"), "{text}");
    assert!(text.contains("login <pin>"), "{text}");
    assert!(!kiosk.path().join("saves").exists());
}
