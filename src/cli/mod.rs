//! CLI module - Command-line interface definitions and handlers
//!
//! Uses clap v4 with derive macros for argument parsing.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use output::OutputFormat;

pub mod commands;
pub mod output;
pub mod progress;

/// docsearch - build and query static documentation search indexes
#[derive(Parser, Debug)]
#[command(name = "docsearch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (human, json, plain)
    #[arg(long, short = 'O', global = true, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Machine-readable JSON output (shorthand for --output-format=json)
    #[arg(long, short = 'm', global = true)]
    pub machine: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Config file path (default: ./docsearch.toml, then ~/.config/docsearch/config.toml)
    #[arg(long, global = true, env = "DOCSEARCH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Effective output format: `--output-format`, then `--machine`, then human.
    #[must_use]
    pub fn output_format(&self) -> OutputFormat {
        if let Some(fmt) = self.output_format {
            return fmt;
        }
        if self.machine {
            return OutputFormat::Json;
        }
        OutputFormat::Human
    }
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a search index from a corpus file or directory
    Build(commands::build::BuildArgs),

    /// Full-text search over an index
    Search(commands::search::SearchArgs),

    /// Search documented objects (functions, classes, modules, ...)
    Objects(commands::objects::ObjectsArgs),

    /// Resolve a document id, path or object name to its title and link
    Resolve(commands::resolve::ResolveArgs),

    /// Show index statistics, title tree and content digest
    Inspect(commands::inspect::InspectArgs),
}
