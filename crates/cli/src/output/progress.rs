//! Progress spinner for transfer operations
//!
//! Shows the item currently being transferred while a run is in flight.

use super::OutputConfig;

/// Spinner wrapper
///
/// Handles progress display based on output configuration.
/// In quiet or JSON mode, progress is suppressed.
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    /// Create a spinner for indeterminate progress
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress {
            None
        } else {
            let bar = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(bar)
        };

        Self { bar }
    }

    /// Set message
    pub fn set_message(&self, message: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(message.to_string());
        }
    }

    /// Run `f` with the spinner hidden so printed lines are not garbled
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        match &self.bar {
            Some(bar) => bar.suspend(f),
            None => f(),
        }
    }

    /// Finish and clear the spinner
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    #[cfg(test)]
    fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spinner_quiet_mode() {
        let config = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        assert!(!ProgressBar::spinner(&config, "x").is_visible());
    }

    #[test]
    fn test_spinner_json_mode() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        };
        assert!(!ProgressBar::spinner(&config, "x").is_visible());
    }

    #[test]
    fn test_spinner_no_progress() {
        let config = OutputConfig {
            no_progress: true,
            ..Default::default()
        };
        let spinner = ProgressBar::spinner(&config, "x");
        assert!(!spinner.is_visible());
        assert_eq!(spinner.suspend(|| 7), 7);
    }

    #[test]
    fn test_spinner_normal() {
        let spinner = ProgressBar::spinner(&OutputConfig::default(), "x");
        assert!(spinner.is_visible());
        spinner.set_message("y");
        spinner.finish_and_clear();
    }
}
