//! Session persistence.
//!
//! Stores the session token and user profile as a single pair in
//! `<base>/session.json` with restricted permissions (0600). The two records
//! are written together; a half-present pair reads as corrupt. Storage faults
//! never propagate out of the load path — they degrade to "no session".

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::types::User;
use crate::config::paths;

/// Session cache filename.
const SESSION_FILE: &str = "session.json";

/// The persisted token/profile pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub token: String,
    pub profile: User,
}

/// On-disk document. Both records live in one file so the pair is written
/// and cleared atomically from the caller's perspective.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawSession {
    #[serde(skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    profile: Option<User>,
}

/// Explicit three-way load outcome; the store never errors on read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionLoad {
    /// Both records present.
    Present(SessionData),
    /// No session stored.
    Empty,
    /// Unreadable, unparseable, or half-written pair.
    Corrupt,
}

/// File-backed store for the session pair.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Opens the store at the default location under the Courier home.
    pub fn open_default() -> Self {
        Self::at(paths::courier_home().join(SESSION_FILE))
    }

    /// Opens the store at an explicit path.
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored session.
    pub fn load(&self) -> SessionLoad {
        if !self.path.exists() {
            return SessionLoad::Empty;
        }

        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), "unreadable session file: {err}");
                return SessionLoad::Corrupt;
            }
        };

        let raw: RawSession = match serde_json::from_str(&contents) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::debug!(path = %self.path.display(), "unparseable session file: {err}");
                return SessionLoad::Corrupt;
            }
        };

        match (raw.token, raw.profile) {
            (Some(token), Some(profile)) => SessionLoad::Present(SessionData { token, profile }),
            (None, None) => SessionLoad::Empty,
            _ => {
                tracing::debug!(path = %self.path.display(), "half-written session pair");
                SessionLoad::Corrupt
            }
        }
    }

    /// Persists the pair, replacing whatever was stored before.
    pub fn save(&self, data: &SessionData) -> Result<()> {
        self.write_raw(&RawSession {
            token: Some(data.token.clone()),
            profile: Some(data.profile.clone()),
        })
    }

    /// Reads the token record; faults degrade to `None`.
    pub fn token(&self) -> Option<String> {
        self.read_raw().token
    }

    /// Reads the profile record; faults degrade to `None`.
    pub fn profile(&self) -> Option<User> {
        self.read_raw().profile
    }

    /// Writes the token record, preserving the stored profile.
    pub fn set_token(&self, token: &str) -> Result<()> {
        let mut raw = self.read_raw();
        raw.token = Some(token.to_string());
        self.write_raw(&raw)
    }

    /// Writes the profile record, preserving the stored token.
    pub fn set_profile(&self, profile: &User) -> Result<()> {
        let mut raw = self.read_raw();
        raw.profile = Some(profile.clone());
        self.write_raw(&raw)
    }

    /// Removes both records. Missing file counts as success.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err).with_context(|| {
                format!("Failed to remove session file {}", self.path.display())
            }),
        }
    }

    /// True iff both records are present and readable.
    pub fn has_session(&self) -> bool {
        matches!(self.load(), SessionLoad::Present(_))
    }

    fn read_raw(&self) -> RawSession {
        if !self.path.exists() {
            return RawSession::default();
        }
        fs::read_to_string(&self.path)
            .ok()
            .and_then(|contents| serde_json::from_str(&contents).ok())
            .unwrap_or_default()
    }

    /// Writes the document with restricted permissions via temp file + rename.
    fn write_raw(&self, raw: &RawSession) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(raw).context("Failed to serialize session")?;

        let tmp_path = self.path.with_extension("json.tmp");

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            let mut file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .mode(0o600)
                .open(&tmp_path)
                .with_context(|| format!("Failed to open {} for writing", tmp_path.display()))?;
            file.write_all(contents.as_bytes())
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        #[cfg(not(unix))]
        {
            fs::write(&tmp_path, contents)
                .with_context(|| format!("Failed to write to {}", tmp_path.display()))?;
        }

        fs::rename(&tmp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
