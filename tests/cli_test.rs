// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_text_output_lists_every_trace() {
    let mut cmd = Command::cargo_bin("tracegen").unwrap();
    cmd.args(["--model", "vending"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Total 6 traces for Composite Machine",
        ))
        .stdout(predicate::str::contains("trace #6 with 3 events"));
}

#[test]
fn test_json_output_is_parseable() {
    let output = Command::cargo_bin("tracegen")
        .unwrap()
        .args(["--model", "handshake", "--format", "json", "--quiet"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let traces = value["traces"].as_array().unwrap();
    assert_eq!(traces.len(), 2);
    // Each trace is events, inside pairs, follows pairs.
    for trace in traces {
        assert_eq!(trace.as_array().unwrap().len(), 3);
    }
}

#[test]
fn test_scope_flag_reaches_the_model() {
    let mut cmd = Command::cargo_bin("tracegen").unwrap();
    cmd.args(["--model", "relay", "--scope", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("pulse_4"));
}

#[test]
fn test_unknown_model_fails_and_lists_models() {
    let mut cmd = Command::cargo_bin("tracegen").unwrap();
    cmd.args(["--model", "bogus"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("handshake"))
        .stderr(predicate::str::contains("relay"));
}
