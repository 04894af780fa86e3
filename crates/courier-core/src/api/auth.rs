//! Account and OAuth endpoints.

use anyhow::{Context, Result};
use serde_json::json;

use super::types::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest};
use super::ApiClient;
use crate::oauth::GoogleAuthData;

impl ApiClient {
    /// Creates a new account. Returns a fresh session token and profile.
    pub async fn register(&self, req: &RegisterRequest) -> Result<AuthResponse> {
        let response = self
            .post("/auth/register")
            .json(req)
            .send()
            .await
            .context("Failed to send registration request")?;
        Self::handle("/auth/register", response).await
    }

    /// Credential login. Returns a fresh session token and profile.
    pub async fn login(&self, req: &LoginRequest) -> Result<AuthResponse> {
        let response = self
            .post("/auth/login")
            .json(req)
            .send()
            .await
            .context("Failed to send login request")?;
        Self::handle("/auth/login", response).await
    }

    /// Fetches the signed-in profile; used for startup revalidation.
    pub async fn get_profile(&self) -> Result<ProfileResponse> {
        let response = self
            .get("/profile")
            .send()
            .await
            .context("Failed to send profile request")?;
        Self::handle("/profile", response).await
    }

    /// Exchanges Google OAuth callback data for a gateway session.
    ///
    /// The authorization-code path posts to `/auth/google/callback`; the
    /// legacy token/credential payloads go to `/auth/google`.
    pub async fn exchange_google(&self, data: &GoogleAuthData) -> Result<AuthResponse> {
        let (path, body) = match data {
            GoogleAuthData::Code { code, scope } => (
                "/auth/google/callback",
                json!({ "code": code, "scope": scope }),
            ),
            GoogleAuthData::Token {
                access_token,
                id_token,
            } => (
                "/auth/google",
                json!({ "access_token": access_token, "id_token": id_token }),
            ),
            GoogleAuthData::Credential(credential) => {
                ("/auth/google", json!({ "credential": credential }))
            }
        };

        let response = self
            .post(path)
            .json(&body)
            .send()
            .await
            .context("Failed to send OAuth exchange request")?;
        Self::handle(path, response).await
    }
}
