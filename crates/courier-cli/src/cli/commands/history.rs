//! History command handlers.

use anyhow::Result;
use courier_core::api::ApiClient;
use courier_core::api::types::{EmailType, SendStatus};
use courier_core::session::SessionController;

use super::{format_timestamp, require_session};

pub async fn list(
    api: &ApiClient,
    controller: &SessionController,
    page: u32,
    page_size: u32,
    email_type: Option<EmailType>,
) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let result = api
        .with_bearer(token)
        .email_history(page, page_size, email_type)
        .await?;

    if result.history.is_empty() {
        println!("No send history found.");
        return Ok(());
    }

    for entry in &result.history {
        let status = match entry.status {
            SendStatus::Sent => "sent",
            SendStatus::Failed => "FAILED",
        };
        println!(
            "{:<6}  {:<6}  {:<30}  {:<30}  {}",
            status,
            entry.email_type.as_str(),
            entry.recipient_email,
            entry.subject,
            format_timestamp(&entry.sent_at)
        );
        if entry.status == SendStatus::Failed && !entry.error_message.is_empty() {
            println!("        {}", entry.error_message);
        }
    }

    println!();
    println!(
        "Page {} of {} ({} total)",
        result.page, result.total_pages, result.total_count
    );

    Ok(())
}

pub async fn stats(api: &ApiClient, controller: &SessionController) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let stats = api.with_bearer(token).history_stats().await?;

    println!("Sent:    {}", stats.total_sent);
    println!("Failed:  {}", stats.total_failed);
    println!("Single:  {}", stats.single_emails);
    println!("Bulk:    {}", stats.bulk_emails);
    println!();
    println!(
        "Last 7 days: {} sent, {} failed",
        stats.last_7_days_sent, stats.last_7_days_failed
    );

    Ok(())
}
