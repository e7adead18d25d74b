use assert_cmd::Command;
use std::fs;
use std::net::TcpListener;
use tempfile::TempDir;

// Accepts TCP connections (via the backlog) but never answers.
fn silent_server() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}/", listener.local_addr().unwrap());
    (listener, url)
}

fn json_stdout(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_batch_rejects_zero_concurrency() {
    let mut cmd = Command::cargo_bin("fanout").unwrap();

    cmd.args(["batch", "http://127.0.0.1:9/", "--max-concurrency", "0"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_batch_requires_keys_or_file() {
    let mut cmd = Command::cargo_bin("fanout").unwrap();

    cmd.args(["batch"]).assert().failure().code(2);
}

#[test]
fn test_batch_missing_file() {
    let mut cmd = Command::cargo_bin("fanout").unwrap();
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("missing.txt");

    cmd.args(["batch", "--file", path.to_str().unwrap()])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_batch_empty_file_succeeds() {
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("urls.txt");
    fs::write(&path, "# nothing to fetch\n").unwrap();

    let output = Command::cargo_bin("fanout")
        .unwrap()
        .args(["batch", "--file", path.to_str().unwrap(), "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0));
    let report = json_stdout(&output);
    assert_eq!(report["summary"]["total"], 0);
}

#[test]
fn test_batch_reports_invalid_key_as_transport_failure() {
    let output = Command::cargo_bin("fanout")
        .unwrap()
        .args(["batch", "not-a-url", "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let report = json_stdout(&output);
    assert_eq!(report["summary"]["failed"], 1);
    assert_eq!(report["results"][0]["key"], "not-a-url");
    assert_eq!(report["results"][0]["outcome"]["kind"], "transport");
}

#[test]
fn test_batch_deadline_times_out_every_key() {
    let (_listener, url) = silent_server();
    let tmp_dir = TempDir::new().unwrap();
    let path = tmp_dir.path().join("urls.json");
    let keys: Vec<String> = (0..4).map(|i| format!("{url}{i}")).collect();
    fs::write(&path, serde_json::to_string(&keys).unwrap()).unwrap();

    let output = Command::cargo_bin("fanout")
        .unwrap()
        .args([
            "batch",
            "--file",
            path.to_str().unwrap(),
            "--max-concurrency",
            "2",
            "--deadline-ms",
            "200",
            "--metrics",
            "--format",
            "json",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let report = json_stdout(&output);
    assert_eq!(report["summary"]["total"], 4);
    assert_eq!(report["summary"]["timed_out"], 4);
    assert_eq!(report["metrics"]["deadline_expired"], true);
}

#[test]
fn test_batch_text_output() {
    let mut cmd = Command::cargo_bin("fanout").unwrap();

    let assert = cmd.args(["batch", "not-a-url"]).assert().failure().code(3);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("Failed to fetch not-a-url"));
    assert!(stdout.contains("0 fetched, 1 failed (0 timed out) of 1"));
}

#[test]
fn test_single_times_out() {
    let (_listener, url) = silent_server();

    let output = Command::cargo_bin("fanout")
        .unwrap()
        .args(["single", &url, "--budget-ms", "100", "--format", "json"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let report = json_stdout(&output);
    assert_eq!(report["outcome"]["kind"], "deadline_exceeded");
    assert_eq!(report["budget_ms"], 100);
}

#[test]
fn test_quiet_suppresses_output() {
    let mut cmd = Command::cargo_bin("fanout").unwrap();

    let assert = cmd.args(["batch", "not-a-url", "--quiet"]).assert().code(3);
    assert!(assert.get_output().stdout.is_empty());
}
