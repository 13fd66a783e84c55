use assert_cmd::Command;
use predicates::prelude::*;

/// The binary with `xcrun` unreachable and a throwaway home directory.
fn isolated(home: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("plateup-sim").unwrap();
    cmd.env("PATH", "")
        .env("HOME", home.path())
        .env_remove("RUST_LOG")
        .env_remove("PLATEUP_SIM_DEVICE")
        .env_remove("PLATEUP_SIM_LAUNCH_LINK")
        .env_remove("PLATEUP_SIM_TARGET_LINK")
        .env_remove("PLATEUP_SIM_DELAY_MS");
    cmd
}

#[test]
fn test_help_exits_zero() {
    Command::cargo_bin("plateup-sim")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("plateup-sim"));
}

#[test]
fn test_unknown_subcommand() {
    Command::cargo_bin("plateup-sim")
        .unwrap()
        .arg("totally-fake-command")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_xcrun_still_completes_both_steps() {
    let home = tempfile::tempdir().unwrap();
    let assert = isolated(&home)
        .args(["--delay-ms", "0", "--format", "json"])
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    let steps = report["steps"].as_array().unwrap();

    assert_eq!(steps.len(), 2);
    assert_eq!(steps[0]["step"], "launch");
    assert_eq!(steps[0]["status"], "spawn_failed");
    assert_eq!(steps[0]["invocation"]["args"][1], "spawn");
    assert_eq!(steps[1]["step"], "navigate");
    assert_eq!(steps[1]["status"], "spawn_failed");
    assert_eq!(steps[1]["invocation"]["args"][3], "plateup://checkin/morning");
}

#[test]
fn test_text_report_lists_both_commands() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .args(["--delay-ms", "0", "--device", "iPhone 16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("xcrun simctl spawn 'iPhone 16' uiopen plateup://focus"))
        .stdout(predicate::str::contains(
            "xcrun simctl openurl 'iPhone 16' plateup://checkin/morning",
        ));
}

#[test]
fn test_config_file_is_read() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".plateup-sim");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("config.json"),
        r#"{"device": "iPhone SE", "target_link": "plateup://checkin/evening", "delay_ms": 0}"#,
    )
    .unwrap();

    isolated(&home)
        .assert()
        .success()
        .stdout(predicate::str::contains("'iPhone SE'"))
        .stdout(predicate::str::contains("plateup://checkin/evening"));
}

#[test]
fn test_invalid_link_fails_before_running() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .args(["--target-link", "checkin/morning"])
        .assert()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("target_link"));
}

#[test]
fn test_quiet_suppresses_text_report() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .args(["--delay-ms", "0", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_list_devices_without_xcrun_fails() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .arg("list-devices")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("simctl error"));
}

#[test]
fn test_env_overrides_flow_into_both_commands() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .env("PLATEUP_SIM_DEVICE", "iPhone 15")
        .env("PLATEUP_SIM_DELAY_MS", "0")
        .env("PLATEUP_SIM_TARGET_LINK", "plateup://checkin/lunch")
        .assert()
        .success()
        .stdout(predicate::str::contains("xcrun simctl spawn 'iPhone 15' uiopen plateup://focus"))
        .stdout(predicate::str::contains(
            "xcrun simctl openurl 'iPhone 15' plateup://checkin/lunch",
        ));
}

#[test]
fn test_flag_beats_env() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .env("PLATEUP_SIM_DEVICE", "iPhone 15")
        .args(["--device", "iPhone SE", "--delay-ms", "0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("'iPhone SE'"))
        .stdout(predicate::str::contains("'iPhone 15'").not());
}

#[test]
fn test_unparsable_config_falls_back_to_defaults() {
    let home = tempfile::tempdir().unwrap();
    let dir = home.path().join(".plateup-sim");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.json"), "{ not json").unwrap();

    let assert = isolated(&home)
        .env("PLATEUP_SIM_DELAY_MS", "0")
        .args(["--format", "json"])
        .assert()
        .success()
        .stderr(predicate::str::contains("ignoring unreadable config"));

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let report: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(report["device"], "iPhone 16 Pro");
    assert_eq!(
        report["steps"][0]["invocation"]["args"],
        serde_json::json!(["simctl", "spawn", "iPhone 16 Pro", "uiopen", "plateup://focus"])
    );
    assert_eq!(
        report["steps"][1]["invocation"]["args"],
        serde_json::json!(["simctl", "openurl", "iPhone 16 Pro", "plateup://checkin/morning"])
    );
}

#[test]
fn test_padded_link_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .args(["--delay-ms", "0", "--target-link", " plateup://checkin/morning"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("surrounding whitespace"));
}

#[test]
fn test_bad_delay_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    isolated(&home)
        .args(["--delay-ms", "abc"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());

    isolated(&home)
        .env("PLATEUP_SIM_DELAY_MS", "abc")
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty());
}
