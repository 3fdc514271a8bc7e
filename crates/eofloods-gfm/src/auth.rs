//! GFM account credentials and login.

use crate::api::GfmApi;
use eofloods_core::{FloodError, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use tracing::info;

pub const EMAIL_ENV: &str = "GFM_EMAIL";
pub const PASSWORD_ENV: &str = "GFM_PWD";

/// Attempts allowed when credentials come from an interactive prompt
const INTERACTIVE_ATTEMPTS: usize = 2;

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self { email: email.into(), password: password.into() }
    }

    /// Read `GFM_EMAIL` and `GFM_PWD`
    pub fn from_env() -> Result<Self> {
        match (env::var(EMAIL_ENV), env::var(PASSWORD_ENV)) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => Ok(Self { email, password }),
            _ => Err(FloodError::MissingCredentials {
                reason: format!("Environment variables ['{}', '{}'] not set.", EMAIL_ENV, PASSWORD_ENV),
            }),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("email", &self.email).field("password", &"***").finish()
    }
}

/// Asks the user for an email and password
pub trait CredentialPrompt: Send + Sync {
    fn prompt(&self) -> Result<Credentials>;
}

/// Where login credentials come from
pub enum CredentialSource {
    Explicit(Credentials),
    Environment,
    Interactive(Box<dyn CredentialPrompt>),
}

impl CredentialSource {
    pub fn is_interactive(&self) -> bool {
        matches!(self, CredentialSource::Interactive(_))
    }

    fn credentials(&self) -> Result<Credentials> {
        match self {
            CredentialSource::Explicit(credentials) => Ok(credentials.clone()),
            CredentialSource::Environment => Credentials::from_env(),
            CredentialSource::Interactive(prompt) => prompt.prompt(),
        }
    }
}

impl fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Explicit(credentials) => f.debug_tuple("Explicit").field(credentials).finish(),
            CredentialSource::Environment => write!(f, "Environment"),
            CredentialSource::Interactive(_) => write!(f, "Interactive"),
        }
    }
}

/// Token pair returned by a successful login
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct UserSession {
    pub access_token: String,
    pub client_id: String,
}

impl fmt::Debug for UserSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSession").field("client_id", &self.client_id).field("access_token", &"***").finish()
    }
}

/// Log in to GFM
///
/// A rejected login is retried once with fresh credentials when they come
/// from a prompt; otherwise it fails with [`FloodError::AuthenticationFailed`].
pub fn authenticate(api: &dyn GfmApi, source: &CredentialSource) -> Result<UserSession> {
    let attempts = if source.is_interactive() {
        info!("To authenticate to the GFM API please enter your email and your password in the following prompts");
        INTERACTIVE_ATTEMPTS
    } else {
        1
    };

    for _ in 0..attempts {
        let credentials = source.credentials()?;
        match api.login(&credentials) {
            Ok(session) => {
                info!("Successfully authenticated to the GFM API");
                return Ok(session);
            }
            Err(FloodError::Http { status: 400, .. }) => {
                info!("Incorrect email or password, please try again");
            }
            Err(e) => return Err(e),
        }
    }

    Err(FloodError::AuthenticationFailed { reason: "incorrect email or password".to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_debug_redacts_secrets() {
        let credentials = Credentials::new("user@example.org", "hunter2");
        assert!(!format!("{:?}", credentials).contains("hunter2"));

        let session = UserSession { access_token: "secret-token".into(), client_id: "abc".into() };
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("abc"));
    }

    #[test]
    #[serial]
    fn test_credentials_from_env() {
        env::set_var(EMAIL_ENV, "user@example.org");
        env::set_var(PASSWORD_ENV, "hunter2");
        let credentials = Credentials::from_env().unwrap();
        assert_eq!(credentials, Credentials::new("user@example.org", "hunter2"));

        env::remove_var(PASSWORD_ENV);
        let err = Credentials::from_env().unwrap_err();
        assert!(err.to_string().contains("['GFM_EMAIL', 'GFM_PWD'] not set"));
        env::remove_var(EMAIL_ENV);
    }
}
