//! docsearch - build and query static documentation search indexes.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use docsearch::{DsError, Result};
use docsearch::app::AppContext;
use docsearch::cli::Cli;
use docsearch::cli::output::{emit_json, robot_error_structured};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        // Rendered as an empty result; machine output keeps the typed error
        Err(DsError::EmptyQuery) if !cli.output_format().is_machine_readable() => {
            if !cli.quiet {
                println!("No searchable terms in query.");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            if cli.output_format().is_machine_readable() {
                if emit_json(&robot_error_structured(&e)).is_err() {
                    eprintln!("Error: {e}");
                }
            } else {
                eprintln!("Error: {e}");
                let hint = e.to_structured().suggestion;
                if !hint.is_empty() {
                    eprintln!("Hint: {hint}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::from_cli(cli)?;
    docsearch::cli::commands::run(&ctx, &cli.command)
}

fn init_tracing(cli: &Cli) {
    if cli.quiet {
        return;
    }

    let filter = match cli.verbose {
        0 => "warn,docsearch=info",
        1 => "info,docsearch=debug",
        2 => "debug,docsearch=trace",
        _ => "trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if cli.output_format().is_machine_readable() {
        // JSON logs on stderr keep stdout parseable
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
