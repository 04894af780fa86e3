//! CLI command handlers.

pub mod auth;
pub mod bulk;
pub mod config;
pub mod gmail;
pub mod history;
pub mod send;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use courier_core::session::{AccessGuard, GuardDecision, SessionController};

/// Gates a protected command on the current auth phase.
pub(crate) fn require_session(controller: &SessionController) -> Result<()> {
    match AccessGuard::protected().decide(controller.phase()) {
        GuardDecision::Render => Ok(()),
        GuardDecision::Wait => {
            anyhow::bail!("Session state is still being resolved; try again")
        }
        GuardDecision::Redirect(_) => {
            anyhow::bail!("Not signed in. Run `courier login` (or `courier register`) first.")
        }
    }
}

/// For public-only commands: the redirect notice when already signed in.
pub(crate) fn already_signed_in(controller: &SessionController) -> Option<String> {
    match AccessGuard::public_only().decide(controller.phase()) {
        GuardDecision::Redirect(_) => {
            let identity = controller
                .profile()
                .map(|p| format!("{} <{}>", p.name, p.email))
                .unwrap_or_else(|| "an existing session".to_string());
            Some(format!(
                "Already signed in as {identity}.\nRun `courier logout` first to switch accounts."
            ))
        }
        GuardDecision::Render | GuardDecision::Wait => None,
    }
}

/// Reads one trimmed line from stdin after printing a label.
pub(crate) fn prompt(label: &str) -> Result<String> {
    print!("{label}");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

/// Resolves a value from its flag or an interactive prompt; empty is an error.
pub(crate) fn resolve_arg(value: Option<String>, label: &str) -> Result<String> {
    let value = match value {
        Some(value) => value,
        None => prompt(&format!("{label}: "))?,
    };
    if value.trim().is_empty() {
        anyhow::bail!("{label} cannot be empty");
    }
    Ok(value.trim().to_string())
}

/// Resolves the message body from a flag, a file, or a prompt.
pub(crate) fn resolve_body(body: Option<String>, body_file: Option<&Path>) -> Result<String> {
    if let Some(body) = body {
        return Ok(body);
    }
    if let Some(path) = body_file {
        return fs::read_to_string(path)
            .with_context(|| format!("Failed to read body file {}", path.display()));
    }
    let body = prompt("Body: ")?;
    if body.is_empty() {
        anyhow::bail!("Body cannot be empty");
    }
    Ok(body)
}

/// `[y/N]` confirmation prompt.
pub(crate) fn confirm(label: &str) -> Result<bool> {
    print!("{label} [y/N] ");
    io::stdout().flush()?;

    let mut response = String::new();
    io::stdin().lock().read_line(&mut response)?;
    Ok(response.trim().eq_ignore_ascii_case("y"))
}

/// Renders a gateway timestamp for display; unparseable input passes through.
pub(crate) fn format_timestamp(raw: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}
