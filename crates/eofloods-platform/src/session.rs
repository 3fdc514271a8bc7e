//! Explicit imagery platform session.
//!
//! A session is created once at startup and passed to the remote adapter.
//! Credentials come from `EARTHENGINE_TOKEN` or from the cached credentials
//! file; the project comes from `EARTH_ENGINE_PROJECT`.

use eofloods_core::{FloodError, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const TOKEN_ENV: &str = "EARTHENGINE_TOKEN";
pub const PROJECT_ENV: &str = "EARTH_ENGINE_PROJECT";

#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    refresh_token: String,
}

/// Authenticated context for the remote imagery platform
#[derive(Clone)]
pub struct PlatformSession {
    project: String,
    token: String,
}

impl std::fmt::Debug for PlatformSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformSession").field("project", &self.project).field("token", &"<redacted>").finish()
    }
}

impl PlatformSession {
    pub fn new(project: impl Into<String>, token: impl Into<String>) -> Self {
        Self { project: project.into(), token: token.into() }
    }

    /// `~/.config/earthengine/credentials`
    pub fn default_credentials_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".config").join("earthengine").join("credentials"))
    }

    /// Discover a session from the process environment
    pub fn from_env() -> Result<Self> {
        let path = Self::default_credentials_path().ok_or_else(|| FloodError::MissingCredentials {
            reason: "could not determine the home directory".to_string(),
        })?;
        Self::discover(env::var(TOKEN_ENV).ok(), env::var(PROJECT_ENV).ok(), &path)
    }

    /// Build a session from an optional token and project
    ///
    /// A supplied token is cached at `credentials_path` when no file exists
    /// there yet. Without a token the cached file is read instead.
    pub fn discover(token: Option<String>, project: Option<String>, credentials_path: &Path) -> Result<Self> {
        let project = project.filter(|p| !p.trim().is_empty()).ok_or_else(|| FloodError::MissingCredentials {
            reason: format!("set {} to the platform project id", PROJECT_ENV),
        })?;

        let token = match token.filter(|t| !t.trim().is_empty()) {
            Some(token) => {
                if !credentials_path.exists() {
                    cache_token(credentials_path, &token)?;
                }
                token
            }
            None => read_cached_token(credentials_path)?,
        };

        Ok(Self { project, token })
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

fn cache_token(path: &Path, token: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| credential_error(path, e))?;
    }
    let content = serde_json::to_string(&CredentialFile { refresh_token: token.to_string() })?;
    fs::write(path, content).map_err(|e| credential_error(path, e))?;
    tracing::debug!("Cached platform credentials at {}", path.display());
    Ok(())
}

fn credential_error(path: &Path, reason: impl ToString) -> FloodError {
    FloodError::CredentialFile { path: path.to_path_buf(), reason: reason.to_string() }
}

fn read_cached_token(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(FloodError::MissingCredentials {
            reason: format!("set {} or create {}", TOKEN_ENV, path.display()),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| credential_error(path, e))?;
    let file: CredentialFile = serde_json::from_str(&content).map_err(|e| credential_error(path, e))?;
    Ok(file.refresh_token)
}
