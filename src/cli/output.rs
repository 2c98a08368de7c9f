// Output formatting for CLI

use anyhow::Result;

use crate::cli::config::OutputFormat;

/// Format and output probe reports and progress messages.
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Print a probe report in the configured format.
    pub fn output_report(&self, report: &serde_json::Value) -> Result<()> {
        match self.format {
            OutputFormat::Pretty => println!("{}", serde_json::to_string_pretty(report)?),
            OutputFormat::Json => println!("{}", serde_json::to_string(report)?),
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}
