use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::TempDir;

fn sample_tree() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    fs::write(temp.path().join("a.txt"), vec![b'a'; 100]).expect("write a.txt");
    let sub = temp.path().join("sub");
    fs::create_dir(&sub).expect("create sub");
    fs::write(sub.join("b.txt"), vec![b'b'; 300]).expect("write b.txt");
    temp
}

fn dirlens() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin("dirlens"));
    cmd.env_remove("DIRLENS_CONFIG")
        .env_remove("DIRLENS_LOCK_TIMEOUT_MS");
    cmd
}

#[test]
fn list_json_reports_proportions() {
    let temp = sample_tree();
    let output = dirlens()
        .args(["list", "--json"])
        .arg(temp.path())
        .output()
        .expect("run dirlens");
    assert!(output.status.success());

    let response: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(response["status"], "ok");
    let entries = response["data"]["entries"].as_array().expect("entries");
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "sub");
    assert_eq!(entries[0]["proportion"], 0.75);
    assert_eq!(entries[1]["name"], "a.txt");
    assert_eq!(entries[1]["proportion"], 0.25);
    assert_eq!(response["data"]["summary"]["total_bytes"], 400);
}

#[test]
fn list_text_prints_headline() {
    let temp = sample_tree();
    dirlens()
        .arg("list")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("75.00%"))
        .stdout(predicate::str::contains("found 400 B across 2 files."));
}

#[test]
fn list_missing_path_fails_with_not_found() {
    let temp = TempDir::new().expect("tempdir");
    dirlens()
        .args(["list", "--json"])
        .arg(temp.path().join("missing"))
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""code":"not_found""#));
}

#[test]
fn size_json_counts_recursively() {
    let temp = sample_tree();
    dirlens()
        .args(["size", "--json"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""file_count":2"#))
        .stdout(predicate::str::contains(r#""byte_total":400"#));
}

#[test]
fn negative_capacity_in_config_is_fatal() {
    let temp = sample_tree();
    let config = temp.path().join("dirlens.toml");
    fs::write(&config, "size_cache_capacity = -3\n").expect("write config");

    dirlens()
        .arg("--config")
        .arg(&config)
        .arg("size")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("must not be negative"));
}

#[test]
fn serve_stdio_answers_each_line() {
    let temp = sample_tree();
    let mut child = dirlens()
        .arg("serve-stdio")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn dirlens");

    {
        let mut stdin = child.stdin.take().expect("stdin");
        let list = serde_json::json!({"action": "list", "path": temp.path()});
        writeln!(stdin, "{list}").expect("write list");
        writeln!(stdin, r#"{{"action":"status"}}"#).expect("write status");
    }

    let output = child.wait_with_output().expect("wait");
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).expect("utf8");
    let responses: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(responses.len(), 2);
    assert!(responses.iter().all(|r| r["status"] == "ok"));
    assert!(responses
        .iter()
        .any(|r| r["data"]["entries"].as_array().is_some_and(|e| e.len() == 2)));
}
