//! Output formatter for human-readable and JSON output
//!
//! Ensures consistent output formatting across all commands.
//! Human lines go to stdout, errors and warnings to stderr.

use serde::Serialize;

use super::OutputConfig;
use crate::exit_code::ExitCode;

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, all output is strict JSON without colors or progress.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Output configuration this formatter was built from
    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet {
            return;
        }

        if self.config.json {
            // In JSON mode, success is indicated by exit code, not message
            return;
        }

        if self.colors_enabled() {
            println!("\x1b[32m✓\x1b[0m {message}");
        } else {
            println!("✓ {message}");
        }
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else if self.colors_enabled() {
            eprintln!("\x1b[31m✗\x1b[0m {message}");
        } else {
            eprintln!("✗ {message}");
        }
    }

    /// Report a failed command and return the matching exit code
    ///
    /// In JSON mode the error object also carries the numeric exit code.
    pub fn fail(&self, error: &xfer_core::Error) -> ExitCode {
        let code = ExitCode::from_error(error);
        if self.config.json {
            let error = serde_json::json!({
                "error": error.to_string(),
                "exit_code": code.as_i32(),
            });
            eprintln!("{error}");
        } else {
            self.error(&error.to_string());
        }
        code
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            eprintln!("\x1b[33m⚠\x1b[0m {message}");
        } else {
            eprintln!("⚠ {message}");
        }
    }

    /// Output JSON directly
    ///
    /// Used when you want to output a pre-built JSON structure.
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}
