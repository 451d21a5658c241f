//! End-to-end CLI tests for the findable binary.

// `Command::cargo_bin` is deprecated in assert_cmd >=2.0.17 in favor of
// `cargo::cargo_bin_cmd!` macro. Suppressed until migration to the new API.
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;

fn write_findable_config(config_home: &std::path::Path, contents: &str) {
    let config_dir = config_home.join("findable");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), contents).unwrap();
}

/// Binary with an isolated, empty config home.
fn findable_cmd(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("findable").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path())
        .env_remove("RUST_LOG")
        .arg("--no-progress");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let mut cmd = Command::cargo_bin("findable").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage"))
        .stdout(predicate::str::contains("--format"));
}

#[test]
fn test_binary_version_displays_version() {
    let mut cmd = Command::cargo_bin("findable").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_binary_empty_stdin_exits_zero_with_no_report() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_binary_rejects_out_of_range_concurrency() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-c", "0", "ZZZ123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("concurrency"));
}

#[test]
fn test_binary_unsupported_accession_summary_scores_zero() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-f", "summary", "ZZZ123"])
        .assert()
        .success()
        .stdout("ZZZ123\t0\n");
}

#[test]
fn test_binary_table_header_and_error_column() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .write_stdin("identifier,type,repo\nZZZ123,accession,Nowhere\n")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "identifier\tdeclared_type\tresolved_type\trepo\tresolved_url\thttp_status\tfinal_url\telapsed_seconds\terror\tfindable\n",
        ))
        .stdout(predicate::str::contains(
            "ZZZ123\taccession\taccession\tNowhere\t\t\t\t0.000\tunsupported\t0",
        ));
}

#[test]
fn test_binary_json_output_is_array() {
    let config_home = TempDir::new().unwrap();
    let output = findable_cmd(&config_home)
        .args(["--format", "json", "ZZZ123"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json[0]["identifier"]["raw_value"], "ZZZ123");
    assert_eq!(json[0]["resolution"]["error"], "unsupported");
    assert_eq!(json[0]["findable_score"], 0);
}

#[test]
fn test_binary_reads_input_file() {
    let config_home = TempDir::new().unwrap();
    let input_dir = TempDir::new().unwrap();
    let input_path = input_dir.path().join("ids.txt");
    std::fs::write(&input_path, "# dataset list\nZZZ1\n\nZZZ2\n").unwrap();

    findable_cmd(&config_home)
        .args(["-f", "summary", "--input"])
        .arg(&input_path)
        .assert()
        .success()
        .stdout("ZZZ1\t0\nZZZ2\t0\n");
}

#[test]
fn test_binary_missing_input_file_fails() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["--input", "/nonexistent/findable/ids.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read input file"));
}

#[test]
fn test_binary_explicit_missing_config_fails() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["--config", "/nonexistent/findable.toml", "ZZZ123"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_binary_invalid_default_config_fails() {
    let config_home = TempDir::new().unwrap();
    write_findable_config(config_home.path(), "unknown_key = 1\n");
    findable_cmd(&config_home)
        .arg("ZZZ123")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));
}

#[test]
fn test_binary_positional_identifiers_are_verbatim() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-f", "summary", "id", "ZZZ1,accession,Repo"])
        .assert()
        .success()
        .stdout("id\t0\nZZZ1,accession,Repo\t0\n");
}

#[test]
fn test_binary_stdin_quoted_url_keeps_commas() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-f", "summary"])
        .write_stdin("\"http://127.0.0.1:9/?ids=1,2\",url\nhttp://127.0.0.1:9/?ids=3,4\n")
        .assert()
        .success()
        .stdout("http://127.0.0.1:9/?ids=1,2\t0\nhttp://127.0.0.1:9/?ids=3,4\t0\n");
}

#[test]
fn test_binary_prints_failure_hints_on_stderr() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-f", "summary", "ZZZ1", "ZZZ2"])
        .assert()
        .success()
        .stdout("ZZZ1\t0\nZZZ2\t0\n")
        .stderr(predicate::str::contains(
            "unsupported (2 identifiers): Unsupported accession",
        ))
        .stderr(predicate::str::contains("  Fix: "));
}

#[test]
fn test_binary_verbose_flag_emits_debug_logs() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-v", "ZZZ123"])
        .assert()
        .success()
        .stderr(predicate::str::contains("CLI arguments parsed"));
}

#[test]
fn test_binary_quiet_flag_suppresses_info_logs() {
    let config_home = TempDir::new().unwrap();
    findable_cmd(&config_home)
        .args(["-q", "ZZZ123"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Findability check complete").not())
        .stderr(predicate::str::contains("Fix:").not());
}

#[tokio::test(flavor = "multi_thread")]
async fn test_binary_end_to_end_against_mocked_services() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/api/works/10.1234%2Fdata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": { "URL": format!("{}/landing/doi", server.uri()) }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing/doi"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repo/XYZ42"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/landing/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config_home = TempDir::new().unwrap();
    write_findable_config(
        config_home.path(),
        &format!(
            "crossref_base_url = \"{uri}/api\"\ndoi_resolver_base_url = \"{uri}/doi\"\naccession.XYZ = \"{uri}/repo/{{acc}}\"\n",
            uri = server.uri()
        ),
    );

    let stdin = format!(
        "10.1234/data,DOI,Dryad\nXYZ42\n{}/landing/missing\n",
        server.uri()
    );
    let expected = format!(
        "10.1234/data\t1\nXYZ42\t1\n{}/landing/missing\t0\n",
        server.uri()
    );

    let assert = tokio::task::spawn_blocking(move || {
        findable_cmd(&config_home)
            .args(["-f", "summary", "-c", "2"])
            .write_stdin(stdin)
            .assert()
    })
    .await
    .unwrap();
    assert.success().stdout(expected);
}
