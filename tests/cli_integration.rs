//! CLI integration tests using assert_cmd to exercise the actual binary.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with HOME and the stats file pointed into `tmp`.
fn inputshield(tmp: &Path) -> Command {
    let config = tmp.join("config.yml");
    if !config.exists() {
        std::fs::write(
            &config,
            format!(
                "stats_path: {}\nbackend:\n  candidates: [\"http://127.0.0.1:1\"]\n  enrichment_timeout_secs: 1\n  probe_timeout_ms: 100\n",
                tmp.join("stats.json").display()
            ),
        )
        .unwrap();
    }
    let mut cmd = Command::cargo_bin("inputshield").unwrap();
    cmd.env("HOME", tmp).arg("--config").arg(&config);
    cmd
}

// ---------------------------------------------------------------------------
// sanitize
// ---------------------------------------------------------------------------

#[test]
fn cli_sanitize_strips_script() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "<script>alert(1)</script> hello"])
        .assert()
        .success()
        .stdout("hello\n")
        .stderr(predicate::str::contains("Suspicious input sanitized."));

    assert!(tmp.path().join("stats.json").exists());
}

#[test]
fn cli_sanitize_reads_stdin() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "--paste"])
        .write_stdin("admin' OR '1'='1\n")
        .assert()
        .success()
        .stdout("admin\n")
        .stderr(predicate::str::contains("Suspicious paste sanitized."));
}

#[test]
fn cli_sanitize_leaves_prose() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "hello, how are you today?"])
        .assert()
        .success()
        .stdout("hello, how are you today?\n");

    assert!(!tmp.path().join("stats.json").exists());
}

// ---------------------------------------------------------------------------
// analyze / decode
// ---------------------------------------------------------------------------

#[test]
fn cli_analyze_offline_reports_caution() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["analyze", "--offline", "http://example.com/login?next=http://evil.com"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"Caution\""))
        .stdout(predicate::str::contains("Open-redirect parameter"))
        .stdout(predicate::str::contains("\"finalUrl\""));
}

#[test]
fn cli_analyze_without_backend_degrades() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["analyze", "https://user@xn--exmple-cua.com/malware.exe"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"verdict\": \"Unsafe\""))
        .stdout(predicate::str::contains("Backend enrichment unavailable"));
}

#[test]
fn cli_decode_shows_trace() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args([
            "decode",
            "--profile",
            "url",
            "https://example.com/?u=aHR0cDovL2V2aWwuY29tL2V2aWwuZXhl",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"kind\": \"base64\""))
        .stdout(predicate::str::contains("http://evil.com/evil.exe"));
}

// ---------------------------------------------------------------------------
// scan
// ---------------------------------------------------------------------------

#[test]
fn cli_scan_reports_payload_lines() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("fixtures");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("comments.txt"),
        "nice post\n<script>alert(1)</script>\nsee you\n",
    )
    .unwrap();

    inputshield(tmp.path())
        .arg("scan")
        .arg(&dir)
        .assert()
        .failure()
        .stderr(predicate::str::contains("comments.txt:2: xss/script-block"))
        .stderr(predicate::str::contains("1 suspicious line(s) found"));
}

#[test]
fn cli_scan_clean_file() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("clean.txt");
    std::fs::write(&file, "just some words\nand more words\n").unwrap();

    inputshield(tmp.path())
        .arg("scan")
        .arg(&file)
        .assert()
        .success()
        .stderr(predicate::str::contains("scan clean"));
}

#[test]
fn cli_scan_missing_path_fails() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["scan", "/nonexistent/inputshield/path"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("path not found"));
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn cli_stats_counts_and_resets() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "<script>alert(1)</script> hello"])
        .assert()
        .success();

    inputshield(tmp.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sanitized today: 1"))
        .stdout(predicate::str::contains("xss: 1"));

    inputshield(tmp.path())
        .args(["stats", "--reset"])
        .assert()
        .success();

    inputshield(tmp.path())
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sanitized today: 0"));
}

#[test]
fn cli_stats_rejects_oversized_window() {
    let tmp = TempDir::new().unwrap();

    inputshield(tmp.path())
        .args(["stats", "--days", "4000000000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--days"));

    inputshield(tmp.path())
        .args(["stats", "--days", "366"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Last 366 day(s):"));
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

#[test]
fn cli_malformed_config_fails() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.yml"), "enabled: [oops").unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config parse error"));
}

#[test]
fn cli_disabled_shield_passes_text_through() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
        tmp.path().join("config.yml"),
        format!(
            "enabled: false\nstats_path: {}\n",
            tmp.path().join("stats.json").display()
        ),
    )
    .unwrap();

    inputshield(tmp.path())
        .args(["sanitize", "<script>x</script>"])
        .assert()
        .success()
        .stdout("<script>x</script>\n");
}
