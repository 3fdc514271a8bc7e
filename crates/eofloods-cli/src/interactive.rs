use dialoguer::{Input, Password};
use eofloods_core::{FloodError, Result};
use eofloods_gfm::{CredentialPrompt, Credentials};

/// Terminal prompt for GFM account credentials
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn prompt(&self) -> Result<Credentials> {
        let email: String = Input::new().with_prompt("Enter your email").interact_text().map_err(prompt_error)?;
        let password = Password::new().with_prompt("Enter your password").interact().map_err(prompt_error)?;
        Ok(Credentials::new(email, password))
    }
}

fn prompt_error(error: dialoguer::Error) -> FloodError {
    FloodError::MissingCredentials { reason: format!("credential prompt failed: {}", error) }
}
