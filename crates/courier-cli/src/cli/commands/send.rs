//! Single-send command handler.

use std::path::PathBuf;

use anyhow::Result;
use courier_core::api::ApiClient;
use courier_core::api::types::SendEmailRequest;
use courier_core::session::SessionController;

use super::{require_session, resolve_body};

pub async fn run(
    api: &ApiClient,
    controller: &SessionController,
    to: &str,
    subject: &str,
    body: Option<String>,
    body_file: Option<PathBuf>,
) -> Result<()> {
    require_session(controller)?;
    let Some(token) = controller.token() else {
        anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.");
    };

    let body = resolve_body(body, body_file.as_deref())?;

    let resp = api
        .with_bearer(token)
        .send_email(&SendEmailRequest {
            to: to.to_string(),
            subject: subject.to_string(),
            body,
        })
        .await?;

    println!("✓ Email sent to {to}");
    if let Some(message) = resp.message {
        println!("  {message}");
    }

    Ok(())
}
