//! Output formatting utilities
//!
//! This module provides formatters for CLI output in both human-readable
//! and JSON formats. It also handles the transfer spinner and colored output.

mod formatter;
mod progress;

pub use formatter::Formatter;
pub use progress::ProgressBar;

/// Output configuration derived from CLI flags and config defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Use JSON output format
    pub json: bool,
    /// Disable colored output
    pub no_color: bool,
    /// Disable progress spinner
    pub no_progress: bool,
    /// Suppress non-error output
    pub quiet: bool,
}

impl OutputConfig {
    /// Combine command-line flags with the `[defaults]` table of the config file.
    ///
    /// Flags can only switch behaviour on; the file supplies the baseline.
    pub fn merge_defaults(mut self, defaults: &xfer_core::config::Defaults) -> Self {
        self.json |= defaults.output.eq_ignore_ascii_case("json");
        self.no_color |= defaults.color.eq_ignore_ascii_case("never");
        self.no_progress |= !defaults.progress;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xfer_core::config::Defaults;

    #[test]
    fn test_merge_defaults_keeps_flags() {
        let config = OutputConfig {
            json: true,
            ..Default::default()
        }
        .merge_defaults(&Defaults::default());
        assert!(config.json);
        assert!(!config.no_color);
        assert!(!config.no_progress);
    }

    #[test]
    fn test_merge_defaults_from_file() {
        let defaults = Defaults {
            output: "JSON".to_string(),
            color: "never".to_string(),
            progress: false,
        };
        let config = OutputConfig::default().merge_defaults(&defaults);
        assert_eq!(
            config,
            OutputConfig {
                json: true,
                no_color: true,
                no_progress: true,
                quiet: false,
            }
        );
    }
}
