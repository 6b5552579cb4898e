//
//  bitbucket-scm-client
//  tests/cli.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use std::path::Path;

use assert_cmd::Command;
use mockito::Matcher;
use predicates::prelude::*;
use tempfile::TempDir;

/// `bbscm` with an isolated config file and no credentials from the host.
fn bbscm(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bbscm").unwrap();
    cmd.env_remove("BBSCM_SERVER")
        .env_remove("BBSCM_TOKEN")
        .env_remove("BBSCM_USERNAME")
        .env_remove("BBSCM_PASSWORD")
        .env_remove("BBSCM_LOG")
        .env("NO_COLOR", "1")
        .arg("--config")
        .arg(config);
    cmd
}

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_version() {
    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_server_is_usage_error() {
    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .args(["repo", "list", "PROJ"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No Bitbucket server configured"));
}

#[test]
fn test_invalid_state_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .args(["status", "post", "abc", "--state", "BROKEN", "--name", "ci", "--url", "x"])
        .assert()
        .code(2);
}

#[test]
fn test_repo_list_json_hides_archived() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/rest/api/1.0/projects/PROJ/repos")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_body(
            r#"{"values":[
                {"slug":"zeta","name":"zeta","project":{"key":"PROJ"},"archived":false},
                {"slug":"old","name":"old","project":{"key":"PROJ"},"archived":true},
                {"slug":"alpha","name":"alpha","project":{"key":"PROJ"}}
            ],"isLastPage":true}"#,
        )
        .create();

    let dir = TempDir::new().unwrap();
    let output = bbscm(&dir.path().join("none.toml"))
        .args(["--server", &server.url(), "--token", "secret-token", "--json"])
        .args(["repo", "list", "PROJ"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let repos: serde_json::Value = serde_json::from_slice(&output).unwrap();
    let slugs: Vec<&str> = repos
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["alpha", "zeta"]);
    mock.assert();
}

#[test]
fn test_token_with_trailing_newline_is_trimmed() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/rest/api/1.0/projects/PROJ")
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_body(r#"{"key":"PROJ","name":"Project"}"#)
        .create();

    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .env("BBSCM_TOKEN", "secret-token\n")
        .args(["--server", &server.url(), "project", "view", "PROJ"])
        .assert()
        .success();
    mock.assert();
}

#[test]
fn test_malformed_token_is_usage_error() {
    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .args(["--server", "https://bitbucket.example.com", "--token", "two words"])
        .args(["project", "view", "PROJ"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Token is malformed"));
}

#[test]
fn test_default_project_from_config() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/rest/api/1.0/projects/CFG")
        .with_status(200)
        .with_body(r#"{"key":"CFG","name":"Configured Project"}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("[server]\nurl = \"{}\"\ndefault_project = \"CFG\"\n", server.url()),
    );

    bbscm(&config)
        .args(["project", "view"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configured Project"));
    mock.assert();
}

#[test]
fn test_rate_limit_exit_code() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/api/1.0/projects/PROJ")
        .with_status(429)
        .with_body(r#"{"errors":[{"message":"Rate limit exceeded"}]}"#)
        .create();

    let dir = TempDir::new().unwrap();
    let config = write_config(
        &dir,
        &format!("[server]\nurl = \"{}\"\n\n[retry]\nmax_attempts = 1\n", server.url()),
    );

    bbscm(&config)
        .args(["project", "view", "PROJ"])
        .assert()
        .code(32)
        .stderr(predicate::str::contains("Rate limit exceeded"))
        .stderr(predicate::str::contains("Bitbucket server API rate limit reached"));
}

#[test]
fn test_file_exists_missing_fails() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/rest/api/1.0/projects/PROJ/repos/app/browse/nope.txt")
        .match_query(Matcher::Any)
        .with_status(404)
        .create();

    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .args(["--server", &server.url()])
        .args(["file", "exists", "PROJ", "app", "nope.txt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("missing"));
}

#[test]
fn test_status_post() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/rest/build-status/1.0/commits/abc123")
        .match_body(Matcher::PartialJsonString(
            r#"{"state":"INPROGRESS","key":"abc123","name":"ci/build"}"#.to_string(),
        ))
        .with_status(204)
        .create();

    let dir = TempDir::new().unwrap();
    bbscm(&dir.path().join("none.toml"))
        .args(["--server", &server.url()])
        .args([
            "status", "post", "abc123", "--state", "in-progress", "--name", "ci/build", "--url",
            "https://ci.example.com/1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Posted INPROGRESS for abc123"));
    mock.assert();
}
