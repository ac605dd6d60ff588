//! Integration tests for the sociaux CLI
//!
//! Provider traffic goes to a wiremock server named in the config file's
//! `api_url`, so nothing here touches the network.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Isolated config directory with a twitter provider section
struct TestEnv {
    _temp_dir: TempDir,
    config_path: PathBuf,
}

impl TestEnv {
    fn new(api_url: &str) -> Self {
        Self::with_config(&format!(
            r#"
[providers.twitter]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
api_url = "{}"
"#,
            api_url
        ))
    }

    fn with_config(content: &str) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, content).unwrap();

        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("sociaux").unwrap();
        cmd.env("SOCIAUX_CONFIG", &self.config_path);
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

fn user_json(id: u64, screen_name: &str, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "id_str": id.to_string(),
        "name": name,
        "screen_name": screen_name,
        "protected": false
    })
}

#[test]
fn test_help_lists_subcommands() {
    Command::cargo_bin("sociaux")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("whoami"))
        .stdout(predicate::str::contains("followers"))
        .stdout(predicate::str::contains("dms"))
        .stdout(predicate::str::contains("EXIT CODES"));
}

#[test]
fn test_missing_config_file() {
    Command::cargo_bin("sociaux")
        .unwrap()
        .args(["--config", "/nonexistent/sociaux/config.toml", "whoami"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read config file"));
}

#[test]
fn test_missing_provider_section() {
    let env = TestEnv::with_config("[cache]\nttl_seconds = 60\n");

    env.cmd()
        .arg("whoami")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("providers.twitter"));
}

#[test]
fn test_missing_credential_key() {
    let env = TestEnv::with_config(
        r#"
[providers.twitter]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
"#,
    );

    env.cmd()
        .arg("whoami")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("twitter.access_token_secret"));
}

#[test]
fn test_unknown_provider() {
    let env = TestEnv::with_config("[providers.myspace]\ntoken = \"t\"\n");

    env.cmd()
        .args(["--provider", "myspace", "whoami"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unknown provider 'myspace'"));
}

#[test]
fn test_user_without_lookup_is_invalid_request() {
    // Validation happens before any request, so the URL is never contacted
    let env = TestEnv::new("http://127.0.0.1:9/1.1");

    env.cmd()
        .arg("user")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Either username or user_id must be provided."));
}

#[test]
fn test_config_env_path_expands_tilde() {
    let home = TempDir::new().unwrap();
    fs::create_dir(home.path().join("sociaux")).unwrap();
    fs::write(
        home.path().join("sociaux/config.toml"),
        r#"
[providers.twitter]
consumer_key = "ck"
consumer_secret = "cs"
access_token = "at"
access_token_secret = "ats"
api_url = "http://127.0.0.1:9/1.1"
"#,
    )
    .unwrap();

    // Reaching request validation means the config file was found and parsed
    Command::cargo_bin("sociaux")
        .unwrap()
        .env("HOME", home.path())
        .env("SOCIAUX_CONFIG", "~/sociaux/config.toml")
        .env_remove("RUST_LOG")
        .arg("user")
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Either username or user_id must be provided."));
}

#[tokio::test]
async fn test_whoami_text_and_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json(1, "ferris", "Ferris Crab")))
        .mount(&server)
        .await;
    let env = TestEnv::new(&format!("{}/1.1", server.uri()));

    env.cmd()
        .arg("whoami")
        .assert()
        .success()
        .stdout(predicate::eq("1\t@ferris (Ferris Crab)\n"));

    let output = env.cmd().args(["--format", "json", "whoami"]).output().unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["service"], "twitter");
    assert_eq!(value["username"], "ferris");
    assert_eq!(value["is_private"], false);
}

#[tokio::test]
async fn test_followers_one_per_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/followers/list.json"))
        .and(query_param("screen_name", "rustlang"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [user_json(2, "alice", "Alice"), user_json(3, "bob", "Bob")],
            "next_cursor": 0
        })))
        .mount(&server)
        .await;
    let env = TestEnv::new(&format!("{}/1.1", server.uri()));

    env.cmd()
        .args(["followers", "rustlang"])
        .assert()
        .success()
        .stdout(predicate::eq("2\t@alice (Alice)\n3\t@bob (Bob)\n"));
}

#[tokio::test]
async fn test_service_errors_set_exit_codes() {
    let server = MockServer::start().await;
    Mock::given(path("/1.1/account/verify_credentials.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "errors": [{ "code": 89, "message": "Invalid or expired token." }]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/1.1/users/show.json"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "errors": [{ "code": 50, "message": "User not found." }]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/1.1/blocks/list.json"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "errors": [{ "code": 88, "message": "Rate limit exceeded" }]
        })))
        .mount(&server)
        .await;
    Mock::given(path("/1.1/mutes/users/list.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let env = TestEnv::new(&format!("{}/1.1", server.uri()));

    env.cmd()
        .arg("whoami")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("89 - Invalid or expired token."));

    env.cmd()
        .args(["user", "--username", "ghost"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("50 - User not found."));

    env.cmd()
        .arg("blocked")
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Quota exceeded"));

    env.cmd()
        .arg("muted")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Service error"));
}

#[tokio::test]
async fn test_dms_filtered_by_participant() {
    let server = MockServer::start().await;
    let event = |id: &str, sender: &str, recipient: &str, text: &str| {
        json!({
            "type": "message_create",
            "id": id,
            "created_timestamp": "1548807386000",
            "message_create": {
                "target": { "recipient_id": recipient },
                "sender_id": sender,
                "message_data": { "text": text }
            }
        })
    };

    Mock::given(path("/1.1/direct_messages/events/list.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "events": [event("m1", "2", "1", "hi"), event("m2", "3", "1", "yo")]
        })))
        .mount(&server)
        .await;
    for (id, name) in [("1", "me"), ("2", "alice"), ("3", "bob")] {
        Mock::given(path("/1.1/users/show.json"))
            .and(query_param("user_id", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(user_json(id.parse().unwrap(), name, name)))
            .mount(&server)
            .await;
    }
    let env = TestEnv::new(&format!("{}/1.1", server.uri()));

    env.cmd()
        .args(["dms", "--with", "alice"])
        .assert()
        .success()
        .stdout(predicate::str::contains("m1\t2019-01-30 00:16:26\t@alice to @me\thi"))
        .stdout(predicate::str::contains("m2").not());
}
