//! Google OAuth redirect handling.
//!
//! The gateway builds the authorization URL and performs the code exchange;
//! this module only interprets what comes back from the redirect — a full
//! URL, a bare query string, or a raw pasted code — and decides which
//! exchange path (if any) to take.

use std::borrow::Cow;

use anyhow::Result;

/// Raw values extracted from an OAuth redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackData {
    pub code: Option<String>,
    pub scope: Option<String>,
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub credential: Option<String>,
    pub error: Option<String>,
}

impl CallbackData {
    fn collect<'a>(pairs: impl Iterator<Item = (Cow<'a, str>, Cow<'a, str>)>) -> Self {
        let mut data = CallbackData::default();
        for (key, value) in pairs {
            let value = value.to_string();
            match key.as_ref() {
                "code" => data.code = Some(value),
                "scope" => data.scope = Some(value),
                "access_token" => data.access_token = Some(value),
                "id_token" => data.id_token = Some(value),
                "credential" => data.credential = Some(value),
                "error" => data.error = Some(value),
                _ => {}
            }
        }
        data
    }

    fn is_empty(&self) -> bool {
        self == &CallbackData::default()
    }
}

/// Parses pasted redirect input into its OAuth components.
///
/// Accepts a full redirect URL (query and/or fragment parameters), a bare
/// `key=value` query string, or a raw authorization code.
pub fn parse_redirect_input(input: &str) -> CallbackData {
    let value = input.trim();
    if value.is_empty() {
        return CallbackData::default();
    }

    if let Ok(url) = url::Url::parse(value) {
        let mut data = CallbackData::collect(url.query_pairs());
        // Implicit-flow responses put the token in the fragment.
        if data.is_empty()
            && let Some(fragment) = url.fragment()
        {
            data = CallbackData::collect(url::form_urlencoded::parse(fragment.as_bytes()));
        }
        return data;
    }

    if value.contains('=') {
        return CallbackData::collect(url::form_urlencoded::parse(value.as_bytes()));
    }

    CallbackData {
        code: Some(value.to_string()),
        ..CallbackData::default()
    }
}

/// Resolved exchange path for a Google redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GoogleAuthData {
    /// Authorization-code flow (the authoritative path).
    Code {
        code: String,
        scope: Option<String>,
    },
    /// Legacy fallback: a raw access token from an older widget flow.
    Token {
        access_token: String,
        id_token: Option<String>,
    },
    /// Legacy fallback: an identity credential (JWT).
    Credential(String),
}

impl GoogleAuthData {
    /// Decides the exchange path for the callback values.
    ///
    /// A provider `error` (cancellation) and an empty callback are both
    /// terminal: no exchange request may be made for them.
    pub fn from_callback(data: CallbackData) -> Result<Self> {
        if let Some(error) = data.error {
            anyhow::bail!("Google authentication was cancelled or failed: {error}");
        }

        if let Some(code) = data.code {
            return Ok(GoogleAuthData::Code {
                code,
                scope: data.scope,
            });
        }

        if let Some(access_token) = data.access_token {
            return Ok(GoogleAuthData::Token {
                access_token,
                id_token: data.id_token,
            });
        }

        if let Some(credential) = data.credential {
            return Ok(GoogleAuthData::Credential(credential));
        }

        anyhow::bail!("No valid authorization data received");
    }
}
