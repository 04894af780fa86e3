//! Integration tests for send, bulk and history commands.


use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer};

use fixtures::*;

/// Test: single send posts the message and reports the receipt.
#[tokio::test]
async fn test_send_email_success() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-send-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/send"))
        .and(body_partial_json(serde_json::json!({
            "to": "x@y.com",
            "subject": "Hello"
        })))
        .respond_with(json_ok(r#"{"message": "Email sent successfully"}"#))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args([
            "send",
            "--to",
            "x@y.com",
            "--subject",
            "Hello",
            "--body",
            "Hi there",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("✓ Email sent to x@y.com"))
        .stdout(predicate::str::contains("Email sent successfully"));
}

/// Test: a send rejected by the gateway surfaces the error message.
#[tokio::test]
async fn test_send_email_gateway_error() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-send-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/send"))
        .respond_with(gateway_error(400, "Gmail account not connected"))
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["send", "--to", "x@y.com", "--subject", "s", "--body", "b"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Gmail account not connected"));
}

/// Test: history list forwards pagination and filter parameters.
#[tokio::test]
async fn test_history_list_pagination() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-history-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gmail/history"))
        .and(query_param("page", "2"))
        .and(query_param("page_size", "5"))
        .and(query_param("type", "single"))
        .respond_with(json_ok(
            r#"{
                "history": [{
                    "id": 42, "user_id": 1, "email_type": "single",
                    "recipient_email": "x@y.com", "recipient_name": "X",
                    "subject": "Quarterly update", "body": "",
                    "status": "sent", "error_message": "", "batch_id": "",
                    "sent_at": "2025-06-01T09:30:00Z",
                    "created_at": "", "updated_at": ""
                }],
                "total_count": 11, "page": 2, "page_size": 5, "total_pages": 3
            }"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args([
            "history",
            "list",
            "--page",
            "2",
            "--page-size",
            "5",
            "--type",
            "single",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("x@y.com"))
        .stdout(predicate::str::contains("Quarterly update"))
        .stdout(predicate::str::contains("Page 2 of 3 (11 total)"));
}

/// Test: empty history page renders the empty-case message.
#[tokio::test]
async fn test_history_list_empty() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-history-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gmail/history"))
        .respond_with(json_ok(
            r#"{"history": [], "total_count": 0, "page": 1, "page_size": 20, "total_pages": 0}"#,
        ))
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["history", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No send history found."));
}

/// Test: history stats renders the aggregate counters.
#[tokio::test]
async fn test_history_stats() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-stats-1234567890");

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/gmail/history/stats"))
        .respond_with(json_ok(
            r#"{"total_sent": 120, "total_failed": 4, "single_emails": 80,
                "bulk_emails": 44, "last_7_days_sent": 12, "last_7_days_failed": 1}"#,
        ))
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["history", "stats"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Sent:    120"))
        .stdout(predicate::str::contains("Last 7 days: 12 sent, 1 failed"));
}

/// Test: bulk check uploads the CSV and prints the validation result.
#[tokio::test]
async fn test_bulk_check_reports_validation() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-bulk-1234567890");

    let csv_path = temp.path().join("recipients.csv");
    std::fs::write(&csv_path, "email,name\na@b.com,A\nbad-row,\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/process-csv"))
        .respond_with(json_ok(
            r#"{"total_records": 2,
                "valid_emails": [{"email": "a@b.com", "name": "A"}],
                "errors": ["row 2: invalid email"]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args(["bulk", "check", csv_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("2 row(s), 1 valid recipient(s)"))
        .stdout(predicate::str::contains("a@b.com"))
        .stdout(predicate::str::contains("row 2: invalid email"));
}

/// Test: bulk send with --yes validates, sends and reports failures.
#[tokio::test]
async fn test_bulk_send_reports_outcome() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-bulk-1234567890");

    let csv_path = temp.path().join("recipients.csv");
    std::fs::write(&csv_path, "email,name\na@b.com,A\nx@y.com,X\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/process-csv"))
        .respond_with(json_ok(
            r#"{"total_records": 2,
                "valid_emails": [{"email": "a@b.com", "name": "A"},
                                 {"email": "x@y.com", "name": "X"}]}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/send-bulk"))
        .and(body_partial_json(serde_json::json!({"subject": "News"})))
        .respond_with(json_ok(
            r#"{"total_emails": 2, "success_count": 1, "failure_count": 1,
                "results": [
                    {"email": "a@b.com", "success": true},
                    {"email": "x@y.com", "success": false, "error": "bounced"}
                ],
                "processing_time": "1.8s"}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args([
            "bulk",
            "send",
            csv_path.to_str().unwrap(),
            "--subject",
            "News",
            "--body",
            "Body text",
            "--yes",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk send complete: 1/2 delivered"))
        .stdout(predicate::str::contains("x@y.com  bounced"));
}

/// Test: declining the bulk confirmation sends nothing.
#[tokio::test]
async fn test_bulk_send_declined_confirmation() {
    let temp = tempdir().unwrap();
    let server = MockServer::start().await;
    seed_session(temp.path(), "jwt-bulk-1234567890");

    let csv_path = temp.path().join("recipients.csv");
    std::fs::write(&csv_path, "email,name\na@b.com,A\n").unwrap();

    Mock::given(method("GET"))
        .and(path("/api/profile"))
        .respond_with(profile_ok())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/process-csv"))
        .respond_with(json_ok(
            r#"{"total_records": 1, "valid_emails": [{"email": "a@b.com", "name": "A"}]}"#,
        ))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/gmail/send-bulk"))
        .respond_with(json_ok("{}"))
        .expect(0)
        .mount(&server)
        .await;

    cargo_bin_cmd!("courier")
        .env("COURIER_HOME", temp.path())
        .env("COURIER_GATEWAY_URL", gateway_url(&server))
        .args([
            "bulk",
            "send",
            csv_path.to_str().unwrap(),
            "--subject",
            "News",
            "--body",
            "Body",
        ])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Bulk send cancelled."));
}
