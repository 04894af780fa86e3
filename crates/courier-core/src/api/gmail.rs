//! Gmail connect, send and history endpoints.

use anyhow::{Context, Result};
use reqwest::multipart;

use super::types::{
    AuthUrlResponse, BulkEmailReport, BulkEmailRequest, EmailHistoryPage, EmailHistoryStats,
    EmailType, GmailStatus, ProcessCsvResponse, SendEmailRequest, SendEmailResponse,
};
use super::ApiClient;

impl ApiClient {
    /// Fetches the Google authorization URL for the connect flow.
    pub async fn gmail_auth_url(&self) -> Result<AuthUrlResponse> {
        let response = self
            .get("/gmail/auth-url")
            .send()
            .await
            .context("Failed to request Gmail authorization URL")?;
        Self::handle("/gmail/auth-url", response).await
    }

    /// Reports whether the account has a usable Gmail connection.
    pub async fn gmail_status(&self) -> Result<GmailStatus> {
        let response = self
            .get("/gmail/status")
            .send()
            .await
            .context("Failed to request Gmail status")?;
        Self::handle("/gmail/status", response).await
    }

    /// Sends a single email through the connected Gmail account.
    pub async fn send_email(&self, req: &SendEmailRequest) -> Result<SendEmailResponse> {
        let response = self
            .post("/gmail/send")
            .json(req)
            .send()
            .await
            .context("Failed to send email request")?;
        Self::handle("/gmail/send", response).await
    }

    /// Uploads a CSV of recipients for gateway-side validation.
    pub async fn process_csv(&self, file_name: &str, bytes: Vec<u8>) -> Result<ProcessCsvResponse> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("text/csv")
            .context("Failed to build CSV upload part")?;
        let form = multipart::Form::new().part("csv_file", part);

        let response = self
            .post("/gmail/process-csv")
            .multipart(form)
            .send()
            .await
            .context("Failed to upload CSV")?;
        Self::handle("/gmail/process-csv", response).await
    }

    /// Queues a bulk send for the validated recipient list.
    pub async fn send_bulk(&self, req: &BulkEmailRequest) -> Result<BulkEmailReport> {
        let response = self
            .post("/gmail/send-bulk")
            .json(req)
            .send()
            .await
            .context("Failed to send bulk email request")?;
        Self::handle("/gmail/send-bulk", response).await
    }

    /// Fetches one page of send history, optionally filtered by type.
    pub async fn email_history(
        &self,
        page: u32,
        page_size: u32,
        email_type: Option<EmailType>,
    ) -> Result<EmailHistoryPage> {
        let mut query = vec![
            ("page", page.to_string()),
            ("page_size", page_size.to_string()),
        ];
        if let Some(email_type) = email_type {
            query.push(("type", email_type.as_str().to_string()));
        }

        let response = self
            .get("/gmail/history")
            .query(&query)
            .send()
            .await
            .context("Failed to request email history")?;
        Self::handle("/gmail/history", response).await
    }

    /// Fetches aggregate send statistics.
    pub async fn history_stats(&self) -> Result<EmailHistoryStats> {
        let response = self
            .get("/gmail/history/stats")
            .send()
            .await
            .context("Failed to request history stats")?;
        Self::handle("/gmail/history/stats", response).await
    }
}
