//! Bulk-send command handlers.
//!
//! The CSV itself is validated by the gateway; these handlers upload it,
//! surface the validation result, and only then queue the send.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use courier_core::api::ApiClient;
use courier_core::api::types::{BulkEmailRequest, ProcessCsvResponse};
use courier_core::session::SessionController;

use super::{confirm, require_session, resolve_body};

pub async fn check(api: &ApiClient, controller: &SessionController, file: &Path) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let resp = upload_csv(&api.with_bearer(token), file).await?;
    print_validation(file, &resp);

    Ok(())
}

pub async fn send(
    api: &ApiClient,
    controller: &SessionController,
    file: &Path,
    subject: &str,
    body: Option<String>,
    body_file: Option<PathBuf>,
    yes: bool,
) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };
    let api = api.with_bearer(token);

    let body = resolve_body(body, body_file.as_deref())?;

    let validation = upload_csv(&api, file).await?;
    print_validation(file, &validation);

    if validation.valid_emails.is_empty() {
        anyhow::bail!("No valid recipients in {}", file.display());
    }

    if !yes {
        let go = confirm(&format!(
            "Send \"{subject}\" to {} recipient(s)?",
            validation.valid_emails.len()
        ))?;
        if !go {
            println!("Bulk send cancelled.");
            return Ok(());
        }
    }

    let report = api
        .send_bulk(&BulkEmailRequest {
            subject: subject.to_string(),
            body,
            emails: validation.valid_emails,
        })
        .await?;

    println!();
    println!(
        "✓ Bulk send complete: {}/{} delivered",
        report.success_count, report.total_emails
    );
    if !report.processing_time.is_empty() {
        println!("  processing time: {}", report.processing_time);
    }

    let failures: Vec<_> = report.results.iter().filter(|r| !r.success).collect();
    if !failures.is_empty() {
        println!("Failures:");
        for failure in failures {
            println!(
                "  {}  {}",
                failure.email,
                failure.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

async fn upload_csv(api: &ApiClient, file: &Path) -> Result<ProcessCsvResponse> {
    let bytes =
        fs::read(file).with_context(|| format!("Failed to read CSV file {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "recipients.csv".to_string());

    api.process_csv(&file_name, bytes).await
}

fn print_validation(file: &Path, resp: &ProcessCsvResponse) {
    println!(
        "Validated {}: {} row(s), {} valid recipient(s)",
        file.display(),
        resp.total_records,
        resp.valid_emails.len()
    );
    for record in &resp.valid_emails {
        println!("  {}  {}", record.email, record.name);
    }
    if let Some(errors) = &resp.errors
        && !errors.is_empty()
    {
        println!("Rows skipped:");
        for error in errors {
            println!("  {error}");
        }
    }
}
