//! Wire types for the mail gateway API.
//!
//! Field names mirror the gateway's JSON exactly; timestamps stay as the
//! gateway's strings and are only parsed where they are displayed.

use serde::{Deserialize, Serialize};

/// Account identity as returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// Response to login, registration and OAuth exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile revalidation payload; the gateway may attach extra fields.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user: User,
}

/// Gmail connection state for the signed-in account.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GmailStatus {
    pub connected: bool,
    pub expires_at: Option<String>,
    pub expired: Option<bool>,
    pub scope: Option<String>,
    pub message: Option<String>,
}

/// Authorization URL handed out by the gateway for the connect flow.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUrlResponse {
    pub auth_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendEmailRequest {
    pub to: String,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SendEmailResponse {
    pub message: Option<String>,
}

/// One recipient row extracted from an uploaded CSV.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkEmailRecord {
    pub email: String,
    pub name: String,
}

/// Gateway-side CSV validation result.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessCsvResponse {
    pub total_records: u64,
    pub valid_emails: Vec<BulkEmailRecord>,
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkEmailRequest {
    pub subject: String,
    pub body: String,
    pub emails: Vec<BulkEmailRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkEmailResult {
    pub email: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Per-batch outcome of a bulk send.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkEmailReport {
    pub total_emails: u64,
    pub success_count: u64,
    pub failure_count: u64,
    pub results: Vec<BulkEmailResult>,
    #[serde(default)]
    pub processing_time: String,
}

/// Whether a history entry came from a single send or a bulk batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailType {
    Single,
    Bulk,
}

impl EmailType {
    /// Query-parameter value for the history filter.
    pub fn as_str(self) -> &'static str {
        match self {
            EmailType::Single => "single",
            EmailType::Bulk => "bulk",
        }
    }
}

/// Delivery outcome recorded by the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailHistoryEntry {
    pub id: i64,
    pub user_id: i64,
    pub email_type: EmailType,
    pub recipient_email: String,
    #[serde(default)]
    pub recipient_name: String,
    pub subject: String,
    #[serde(default)]
    pub body: String,
    pub status: SendStatus,
    #[serde(default)]
    pub error_message: String,
    #[serde(default)]
    pub batch_id: String,
    #[serde(default)]
    pub sent_at: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

/// One page of send history.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailHistoryPage {
    pub history: Vec<EmailHistoryEntry>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailHistoryStats {
    pub total_sent: u64,
    pub total_failed: u64,
    pub single_emails: u64,
    pub bulk_emails: u64,
    pub last_7_days_sent: u64,
    pub last_7_days_failed: u64,
}

/// Error envelope used by the gateway for 4xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorBody {
    pub error: Option<String>,
}
