use console::style;
use eofloods_core::FloodError;
use std::fmt;

/// Enhanced error type with suggestions
pub struct CliError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub help_command: Option<String>,
}

impl CliError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
            help_command: None,
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_help(mut self, command: impl Into<String>) -> Self {
        self.help_command = Some(command.into());
        self
    }

    pub fn display(&self) {
        eprintln!("{} {}\n", style("✗").red().bold(), style(&self.message).red().bold());

        if let Some(ref context) = self.context {
            eprintln!("{}", context);
            eprintln!();
        }

        if !self.suggestions.is_empty() {
            eprintln!("{}", style("To fix this:").yellow().bold());
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                eprintln!("  {}. {}", i + 1, suggestion);
            }
            eprintln!();
        }

        if let Some(ref help_cmd) = self.help_command {
            eprintln!("{} {}", style("Need help?").cyan(), style(help_cmd).cyan().bold());
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl fmt::Debug for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Create error for a session option that was not given
pub fn missing_session_option(option: &str) -> CliError {
    CliError::new(format!("Missing {}", option))
        .with_context("Flood map commands need a time window and an area of interest.")
        .with_suggestion("Pass --start, --end and --bbox, e.g. --start 2023-04-01 --end 2023-04-30 --bbox 4.22,51.95,4.47,52.07")
        .with_help("Run: eofloods --help")
}

fn missing_credentials(reason: &str) -> CliError {
    CliError::new("Missing credentials")
        .with_context(format!("Could not find credentials for the remote service.\n\nReason: {}", reason))
        .with_suggestion("For the imagery platform: export EARTHENGINE_TOKEN=... and EARTH_ENGINE_PROJECT=...")
        .with_suggestion("For GFM: export GFM_EMAIL=... and GFM_PWD=...")
        .with_suggestion("Or try the offline catalog: --platform memory")
        .with_help("Run: eofloods config")
}

/// Map library errors to actionable messages
fn from_flood_error(error: &FloodError) -> CliError {
    match error {
        FloodError::DatasetNotRecognized { supported, .. } => CliError::new(error.to_string())
            .with_suggestion(format!("Choose from: {}", supported))
            .with_help("Run: eofloods available --help"),
        FloodError::ProviderNotRecognized { .. } => CliError::new(error.to_string())
            .with_suggestion("Use --provider hydrafloods or --provider gfm"),
        FloodError::DateOutOfRange { start, end, .. } => CliError::new(error.to_string())
            .with_suggestion(format!("Pick dates between {} and {}", start, end))
            .with_suggestion("List the available dates: eofloods available"),
        FloodError::NoDataFound { .. } => CliError::new(error.to_string())
            .with_suggestion("List the available dates: eofloods available"),
        FloodError::MissingCredentials { reason } => missing_credentials(reason),
        FloodError::AuthenticationFailed { .. } => CliError::new(error.to_string())
            .with_suggestion("Check GFM_EMAIL and GFM_PWD")
            .with_suggestion("Or unset them to be prompted for your email and password"),
        FloodError::PlotTimeout { .. } => CliError::new("Plotting flood extents timed out")
            .with_context(error.to_string())
            .with_suggestion("Increase the deadline: --timeout 600")
            .with_suggestion("Or select fewer dates: --date 2023-04-08"),
        FloodError::Http { .. } | FloodError::Transport { .. } => CliError::new("Remote request failed")
            .with_context(error.to_string())
            .with_suggestion("Check your network connection and the service URLs")
            .with_help("Run: eofloods config"),
        FloodError::ConfigInvalid { .. } | FloodError::ConfigMissing { .. } => {
            CliError::new(error.to_string()).with_suggestion("Check eofloods.toml and EOFLOODS_* variables")
        }
        _ => CliError::new(error.to_string()),
    }
}

/// Convert anyhow::Error to CliError with context
pub fn from_anyhow(error: anyhow::Error) -> CliError {
    let error = match error.downcast::<CliError>() {
        Ok(cli_error) => return cli_error,
        Err(error) => error,
    };
    if let Some(flood_error) = error.downcast_ref::<FloodError>() {
        return from_flood_error(flood_error);
    }

    let message = error.to_string();
    if message.contains("No such file or directory") {
        CliError::new("File not found")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check the file path and try again")
    } else if message.contains("permission denied") {
        CliError::new("Permission denied")
            .with_context(format!("Error: {}", message))
            .with_suggestion("Check file permissions")
    } else {
        CliError::new(format!("{:#}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_flood_errors_get_suggestions() {
        let err = from_anyhow(FloodError::PlotTimeout { timeout: Duration::from_secs(300) }.into());
        assert_eq!(err.message, "Plotting flood extents timed out");
        assert!(err.suggestions.iter().any(|s| s.contains("--timeout")));

        let err = from_anyhow(FloodError::MissingCredentials { reason: "no project".into() }.into());
        assert!(err.suggestions.iter().any(|s| s.contains("--platform memory")));
    }

    #[test]
    fn test_cli_error_passes_through() {
        let err = from_anyhow(missing_session_option("--start").into());
        assert_eq!(err.message, "Missing --start");
    }
}
