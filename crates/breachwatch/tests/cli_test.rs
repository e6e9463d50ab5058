//! Integration tests for the `breachwatch` CLI binary.
//!
//! Offline mode and argument handling need no backend; online paths run
//! against a wiremock server or a closed local port.
#![allow(clippy::unwrap_used)]

use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// Nothing listens on the discard port.
const DEAD_BACKEND: &str = "http://127.0.0.1:9";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `breachwatch` binary with env isolation.
///
/// Clears all `BREACHWATCH_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn bw_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("breachwatch");
    cmd.env("HOME", "/tmp/breachwatch-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/breachwatch-cli-test-nonexistent")
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .env_remove("BREACHWATCH_PROFILE")
        .env_remove("BREACHWATCH_API_URL")
        .env_remove("BREACHWATCH_OUTPUT")
        .env_remove("BREACHWATCH_INSECURE")
        .env_remove("BREACHWATCH_TIMEOUT");
    cmd
}

/// Same as [`bw_cmd`] but with a config file under `dir`.
fn bw_cmd_with_config(dir: &Path, toml: &str) -> assert_cmd::Command {
    let config_dir = dir.join("breachwatch");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), toml).unwrap();
    let mut cmd = bw_cmd();
    cmd.env("XDG_CONFIG_HOME", dir);
    cmd
}

fn stdout_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn backend_record(id: i64, domain: &str) -> Value {
    json!({
        "id": id,
        "uri": format!("https://{domain}/login"),
        "domain": domain,
        "ip_address": "203.0.113.10",
        "port": 443,
        "tags": ["critical"],
        "is_accessible": true,
        "is_breached": true,
        "created_at": "2024-01-15T10:30:00Z"
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = bw_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    assert!(stderr_of(&output).contains("Usage") || stdout_of(&output).contains("Usage"));
}

#[test]
fn test_help_lists_commands() {
    bw_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("search")
            .and(predicate::str::contains("stats"))
            .and(predicate::str::contains("facets")),
    );
}

#[test]
fn test_version_flag() {
    bw_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("breachwatch"));
}

#[test]
fn test_completions_zsh() {
    bw_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Facets ──────────────────────────────────────────────────────────

#[test]
fn test_facets_plain_for_one_kind() {
    bw_cmd()
        .args(["facets", "status", "-o", "plain"])
        .assert()
        .success()
        .stdout(
            "status:unresolved\nstatus:accessible\nstatus:login_form\nstatus:parked\nstatus:breached\n",
        );
}

#[test]
fn test_facets_json_marks_free_form_kinds() {
    let output = bw_cmd().args(["facets", "-o", "json"]).output().unwrap();
    assert!(output.status.success());
    let entries: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let domain = entries.iter().find(|e| e["kind"] == "domain").unwrap();
    assert!(domain["value"].is_null());
}

#[test]
fn test_facets_unknown_kind_is_usage_error() {
    bw_cmd()
        .args(["facets", "colour"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown facet kind"));
}

// ── Offline search ──────────────────────────────────────────────────

#[test]
fn test_offline_search_applies_default_exclusions() {
    bw_cmd()
        .args(["search", "--offline", "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n4\n5\n6\n")
        .stderr(predicate::str::contains("Offline"));
}

#[test]
fn test_offline_search_text_query() {
    bw_cmd()
        .args(["search", "admin", "--offline", "--no-default-exclusions", "-o", "plain"])
        .assert()
        .success()
        .stdout("1\n2\n");
}

#[test]
fn test_offline_search_facets_combine() {
    bw_cmd()
        .args([
            "search",
            "--offline",
            "--no-default-exclusions",
            "--status",
            "breached",
            "-t",
            "priority:critical",
            "-o",
            "plain",
        ])
        .assert()
        .success()
        .stdout("3\n");
}

#[test]
fn test_offline_search_json_never_leaks_password() {
    let output = bw_cmd()
        .args(["search", "--offline", "--no-default-exclusions", "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let records: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(records.len(), 6);
    assert_eq!(records[0]["domain"], "example.com");
    assert!(records.iter().all(|r| r.get("password").is_none()));
    assert!(!stdout_of(&output).contains("redacted"));
}

#[test]
fn test_offline_table_has_footer() {
    bw_cmd()
        .args(["search", "--offline", "--application", "citrix"])
        .assert()
        .success()
        .stdout(predicate::str::contains("vpn.globex.io"))
        .stderr(predicate::str::contains("1 result of 1"));
}

#[test]
fn test_invalid_exclusion_is_usage_error() {
    bw_cmd()
        .args(["search", "--offline", "-x", "300.1.1.1"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a valid IPv4 range"));
}

#[test]
fn test_duplicate_exclusion_is_usage_error() {
    bw_cmd()
        .args(["search", "--offline", "-x", "10.0.0.0/8"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("already excluded"));
}

#[test]
fn test_offline_conflicts_with_strict() {
    bw_cmd()
        .args(["search", "--offline", "--strict"])
        .assert()
        .code(2);
}

// ── Backend failures ────────────────────────────────────────────────

#[test]
fn test_unreachable_backend_falls_back() {
    bw_cmd()
        .args(["search", "-u", DEAD_BACKEND, "-o", "plain"])
        .assert()
        .success()
        .stdout("3\n4\n5\n6\n")
        .stderr(predicate::str::contains("backend unavailable"));
}

#[test]
fn test_unreachable_backend_strict_exits_with_connection_code() {
    bw_cmd()
        .args(["search", "-u", DEAD_BACKEND, "--strict"])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("Could not reach the backend"));
}

#[test]
fn test_stats_fallback_without_backend() {
    let output = bw_cmd()
        .args(["stats", "-u", DEAD_BACKEND, "-o", "json"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["source"], "fallback");
    assert_eq!(report["metrics"]["total"], 6);
}

// ── Configuration ───────────────────────────────────────────────────

#[test]
fn test_unknown_profile_exits_with_config_code() {
    bw_cmd()
        .args(["-p", "nope", "search", "--offline"])
        .assert()
        .code(9)
        .stderr(predicate::str::contains("Profile 'nope' not found"));
}

#[test]
fn test_broken_config_exits_with_config_code() {
    let dir = tempfile::tempdir().unwrap();
    bw_cmd_with_config(dir.path(), "this is = = not toml")
        .args(["search", "--offline"])
        .assert()
        .code(9);
}

#[test]
fn test_config_path_works_with_broken_config() {
    let dir = tempfile::tempdir().unwrap();
    bw_cmd_with_config(dir.path(), "[[[")
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_config_output_default_applies() {
    let dir = tempfile::tempdir().unwrap();
    bw_cmd_with_config(dir.path(), "[defaults]\noutput = \"plain\"\n")
        .args(["search", "--offline", "--status", "parked"])
        .assert()
        .success()
        .stdout("4\n");
}

#[test]
fn test_config_profiles_lists_sorted() {
    let dir = tempfile::tempdir().unwrap();
    let toml = r#"
default_profile = "prod"

[profiles.prod]
api_url = "https://breach.example.com"

[profiles.lab]
api_url = "http://lab.internal:5000"
"#;
    bw_cmd_with_config(dir.path(), toml)
        .args(["config", "profiles", "-o", "plain"])
        .assert()
        .success()
        .stdout("lab\nprod\n");
}

// ── Live backend (wiremock) ─────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_search_against_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .and(query_param("q", "login"))
        .and(query_param("status", "breached"))
        .and(query_param("page", "2"))
        .and(query_param("per_page", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 12,
            "pages": 2,
            "current_page": 2,
            "results": [backend_record(41, "shop.example.net"), backend_record(42, "mail.example.net")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let output = bw_cmd()
        .args([
            "search",
            "login",
            "--status",
            "breached",
            "--page",
            "2",
            "--per-page",
            "10",
            "-u",
            &server.uri(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success(), "stderr: {}", stderr_of(&output));
    let stdout = stdout_of(&output);
    assert!(stdout.contains("shop.example.net"));
    assert!(stdout.contains("mail.example.net"));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("2 results of 12 · page 2/2"), "stderr: {stderr}");
    assert!(!stderr.contains("backend unavailable"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_profile_selects_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [backend_record(7, "profiled.example.com")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        "default_profile = \"lab\"\n\n[profiles.lab]\napi_url = \"{}\"\nexcluded_ip_ranges = []\n",
        server.uri()
    );
    bw_cmd_with_config(dir.path(), &toml)
        .args(["search", "--strict", "-o", "plain"])
        .assert()
        .success()
        .stdout("7\n");

    let requests = server.received_requests().await.unwrap();
    assert!(
        requests[0]
            .url
            .query_pairs()
            .all(|(k, _)| k != "exclude_ip")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn test_backend_error_strict_is_general_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database offline"))
        .mount(&server)
        .await;

    bw_cmd()
        .args(["search", "--strict", "-u", &server.uri()])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("database offline"));
}

/// Runs a default-mode search against a backend that answers with
/// `response`, expecting the offline sample result set.
async fn assert_search_falls_back(response: ResponseTemplate) {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/search"))
        .respond_with(response)
        .expect(1)
        .mount(&server)
        .await;

    let output = bw_cmd()
        .args(["search", "-u", &server.uri(), "-o", "plain"])
        .output()
        .unwrap();

    let stderr = stderr_of(&output);
    assert!(output.status.success(), "stderr: {stderr}");
    assert_eq!(stdout_of(&output), "3\n4\n5\n6\n");
    assert!(stderr.contains("backend unavailable"), "stderr: {stderr}");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_server_error_falls_back() {
    assert_search_falls_back(ResponseTemplate::new(500).set_body_string("database offline")).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_results_field_falls_back() {
    assert_search_falls_back(ResponseTemplate::new(200).set_body_json(json!({ "total": 3 }))).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_json_falls_back() {
    assert_search_falls_back(
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/json")
            .set_body_string("{\"results\": [oops"),
    )
    .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_stats_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total_records": 120,
            "accessible_domains": 80,
            "unique_domains": 95,
            "login_forms": 40,
            "resolved_cases": 30,
            "login_form_types": { "basic": 25, "otp": 15 }
        })))
        .mount(&server)
        .await;

    bw_cmd()
        .args(["stats", "-u", &server.uri()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Source:               backend")
                .and(predicate::str::contains("Unresolved:           90"))
                .and(predicate::str::contains("Inaccessible:         40")),
        );
}
