// CLI configuration
use clap::{Parser, Subcommand, ValueEnum};

/// Detag - strip ID3 metadata from audio files
#[derive(Parser, Debug)]
#[command(name = "detag")]
#[command(about = "Strip ID3v1/ID3v2 metadata from audio files", long_about = None)]
#[command(version)]
pub struct Config {
    /// Output format for probe reports
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: OutputFormat,

    /// Quiet mode (suppress progress messages)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (show parser warnings and copy detail)
    #[arg(short, long)]
    pub verbose: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for probe reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Strip ID3 metadata from a file
    Strip {
        /// Input audio file
        #[arg(value_name = "INPUT")]
        input: String,

        /// Output file (defaults to "stripped-<input name>" next to the input)
        #[arg(value_name = "OUTPUT")]
        output: Option<String>,

        /// Overwrite the output file if it already exists
        #[arg(short = 'f', long)]
        overwrite: bool,

        /// Refuse files whose header sets unsynchronisation, extended
        /// header or experimental flags
        #[arg(long)]
        strict: bool,
    },

    /// Probe file(s) for ID3 tags without modifying anything
    Probe {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },

    /// Strip every file matching a pattern under a directory
    Batch {
        /// Directory to search
        #[arg(value_name = "DIRECTORY")]
        directory: String,

        /// File pattern (e.g., "*.mp3", "*.flac")
        #[arg(value_name = "PATTERN")]
        pattern: String,

        /// Overwrite output files that already exist
        #[arg(short = 'f', long)]
        overwrite: bool,

        /// Refuse files with ID3v2 format flags set
        #[arg(long)]
        strict: bool,
    },

    /// Show file information (size, tag layout, payload span)
    Info {
        /// Audio file path(s)
        #[arg(value_name = "FILE")]
        files: Vec<String>,
    },
}
