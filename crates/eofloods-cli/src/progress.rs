use crate::output::OutputWriter;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Finish a progress bar with success message
pub fn finish_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✓ {}", message));
}

/// Finish a progress bar with error message
pub fn finish_error(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✗ {}", message));
}

/// Run a remote step behind a spinner; JSON mode stays silent
pub fn with_spinner<T, E>(
    output: &OutputWriter,
    message: &str,
    done: &str,
    step: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    with_spinner_if(spinner_enabled(output, false), message, done, step)
}

/// Whether a spinner may draw: never in JSON mode, never while the step prompts the user
pub fn spinner_enabled(output: &OutputWriter, prompts_user: bool) -> bool {
    !output.is_json() && !prompts_user
}

/// Run a step behind a spinner only when `enabled`
pub fn with_spinner_if<T, E>(
    enabled: bool,
    message: &str,
    done: &str,
    step: impl FnOnce() -> Result<T, E>,
) -> Result<T, E> {
    if !enabled {
        return step();
    }

    let pb = create_spinner(message);
    let result = step();
    match &result {
        Ok(_) => finish_success(&pb, done),
        Err(_) => finish_error(&pb, message.trim_end_matches('.')),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_disabled_for_json_and_prompts() {
        assert!(spinner_enabled(&OutputWriter::new(false), false));
        assert!(!spinner_enabled(&OutputWriter::new(true), false));
        assert!(!spinner_enabled(&OutputWriter::new(false), true));
    }

    #[test]
    fn test_disabled_spinner_still_runs_step() {
        let mut ran = false;
        let result: Result<u32, ()> = with_spinner_if(false, "Working...", "Done", || {
            ran = true;
            Ok(7)
        });
        assert_eq!(result, Ok(7));
        assert!(ran);
    }
}
