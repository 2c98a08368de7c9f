// CLI binary entry point for detag
//
// Argument handling, overwrite checks and exit-code mapping live here; the
// detag library itself never touches the terminal.

use clap::Parser;
use std::process;

mod cli;

use cli::commands;
use cli::{Commands, Config, OutputFormatter};

fn main() {
    let config = Config::parse();
    init_logging(config.verbose);

    let formatter = OutputFormatter::new(config.format, config.quiet);

    let result = match config.command {
        Commands::Strip {
            input,
            output,
            overwrite,
            strict,
        } => commands::command_strip(input, output, overwrite, strict, &formatter),
        Commands::Probe { files } => commands::command_probe(files, &formatter),
        Commands::Batch {
            directory,
            pattern,
            overwrite,
            strict,
        } => commands::command_batch(directory, pattern, overwrite, strict, &formatter),
        Commands::Info { files } => commands::command_info(files),
    };

    if let Err(err) = result {
        formatter.print_error(&format!("{:#}", err));
        process::exit(commands::exit_code(&err));
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default)).init();
}
