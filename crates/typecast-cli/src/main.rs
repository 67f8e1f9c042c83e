//! Typecast CLI - retype JSON Lines records with declared column casts
//!
//! This is the main entry point for the typecast command, providing
//! commands for running a job over a record stream and for checking
//! job files.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;
mod records;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    if let Err(e) = init_logging(&cli) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            tracing::error!(run_id = logging::current_run_id().unwrap_or("unknown"), error = %e, "command failed");
            eprintln!("{}", error::format_error(&e, control::SHOULD_COLORIZE.should_colorize()));
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    let timer = Timer::new("cli_execution");

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        "Executing command"
    );

    let (format, use_color, quiet) = (cli.format, cli.use_color(), cli.quiet);
    let result = match cli.command {
        Commands::Run(args) => {
            // stdout may carry records, so reports go to stderr
            let mut output = OutputWriter::stderr(format, use_color, quiet);
            handlers::run::handle_run(args, &mut output)
        }
        Commands::Validate(args) => {
            let mut output = OutputWriter::new(format, use_color, quiet);
            handlers::validate::handle_validate(args, &mut output)
        }
        Commands::Completions(args) => handlers::completions::handle_completions(args),
    };

    tracing::debug!(elapsed_ms = timer.elapsed().as_millis() as u64, "command returned");
    result
}

/// Initialize the logging system
fn init_logging(cli: &Cli) -> Result<()> {
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    logging_config.merge_with_env();

    if let Some(format) = cli.log_format {
        logging_config.format = format;
    }

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}
