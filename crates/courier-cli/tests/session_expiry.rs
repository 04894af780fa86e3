//! Integration tests for session expiry handling.


use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fixtures::*;

/// Test: startup revalidation 401 clears the stored session and the command
/// lands on the signed-out path.
#[tokio::test]
async fn test_startup_revalidation_401_clears_session() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-stale-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));

    assert!(
        !session_path(temp.path()).exists(),
        "rejected session should be cleared"
    );
}

/// Test: a 401 later in the run (after a successful revalidation) also clears
/// the session, with explicit expiry guidance.
#[tokio::test]
async fn test_mid_run_expiry_clears_session() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-revoked-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gmail/history"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["history", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Session expired"))
        .stderr(predicate::str::contains("courier login"));

    assert!(
        !session_path(temp.path()).exists(),
        "revoked session should be cleared"
    );
}

/// Test: a corrupt session file is cleared on startup and the command is
/// treated as signed out.
#[tokio::test]
async fn test_corrupt_session_file_recovered() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;

    std::fs::create_dir_all(temp.path()).unwrap();
    std::fs::write(session_path(temp.path()), "{not valid json").unwrap();

    // No profile call may be made for a corrupt session.
    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .arg("whoami")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));

    assert!(
        !session_path(temp.path()).exists(),
        "corrupt session file should be removed"
    );
}

/// Test: protected commands with no session never call the gateway.
#[tokio::test]
async fn test_protected_command_without_session() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["send", "--to", "x@y.com", "--subject", "hi", "--body", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"))
        .stderr(predicate::str::contains("courier login"));
}
