use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "repair-lab-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_scenarios_writes_output() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-scenarios", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available scenarios"));
    assert!(content.contains("combo-ramp"));
}

#[test]
fn cli_runs_all_scenarios_with_json_report() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let output_path = temp_path("logic");
    let output = Command::new(exe)
        .args([
            "--scenarios",
            "all",
            "--iterations",
            "2",
            "--seeds",
            "1,0x2a",
            "--report",
            "json",
            "--output",
        ])
        .arg(&output_path)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stdout)
    );
    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read report"))
            .expect("json report");
    let results = report.as_array().expect("array");
    assert!(results.len() >= 20);
    assert!(results.iter().all(|r| r["passed"] == true));
}

#[test]
fn cli_unknown_scenario_is_reported_but_not_fatal() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let output = Command::new(exe)
        .args(["--scenarios", "moonwalk", "--iterations", "1"])
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown scenario"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No logic scenarios executed."));
}

#[test]
fn cli_rejects_bad_seeds() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let output = Command::new(exe)
        .args(["--seeds", "banana"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
}

#[test]
fn cli_emit_normalizes_query_parameters() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let output_path = temp_path("emit");
    let status = Command::new(exe)
        .args([
            "--mode",
            "emit",
            "--emit",
            "fix,forecast",
            "--intensity",
            "99",
            "--weather",
            "RAINY",
            "--days",
            "5.5",
            "--output",
        ])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let payload: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(output_path).expect("read payload"))
            .expect("json payload");
    assert_eq!(payload["fix"]["intensity"], 10);
    assert_eq!(payload["fix"]["weather"], "rainy");
    assert_eq!(payload["forecast"]["days"], 6);
}

#[test]
fn cli_session_mode_accumulates_across_runs() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let dir = temp_path("session");
    let state_file = dir.join("state.json");
    let summary = dir.join("summary.json");

    for _ in 0..2 {
        let status = Command::new(exe)
            .args(["--mode", "session", "--actions", "fix,status", "--state-file"])
            .arg(&state_file)
            .arg("--output")
            .arg(&summary)
            .status()
            .expect("run cli");
        assert!(status.success());
    }

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&summary).expect("read summary"))
            .expect("json summary");
    assert_eq!(value["state"]["fixesCount"], 2);
    assert_eq!(value["achievements"][0]["id"], "first-fix");
    assert_eq!(value["achievements"][0]["unlocked"], true);
}

#[test]
fn cli_session_mode_logs_snapshot_saves_at_debug() {
    let exe = env!("CARGO_BIN_EXE_repair-lab-tester");
    let state_file = temp_path("logged").join("state.json");
    let output = Command::new(exe)
        .env("RUST_LOG", "debug")
        .args(["--mode", "session", "--actions", "fix", "--state-file"])
        .arg(&state_file)
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("byte snapshot to"), "{stderr}");
}
