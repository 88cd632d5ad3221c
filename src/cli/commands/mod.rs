//! CLI command implementations
//!
//! Each subcommand has its own module with:
//! - Args struct for command-line arguments
//! - `run()` function to execute the command

use std::path::Path;
use std::sync::Arc;

use crate::app::AppContext;
use crate::cli::Commands;
use crate::error::Result;
use crate::index::{IndexBuilder, SearchIndex, read_index};

pub mod build;
pub mod inspect;
pub mod objects;
pub mod resolve;
pub mod search;

/// Dispatch a command to its handler
pub fn run(ctx: &AppContext, command: &Commands) -> Result<()> {
    match command {
        Commands::Build(args) => build::run(ctx, args),
        Commands::Search(args) => search::run(ctx, args),
        Commands::Objects(args) => objects::run(ctx, args),
        Commands::Resolve(args) => resolve::run(ctx, args),
        Commands::Inspect(args) => inspect::run(ctx, args),
    }
}

/// Read an index file using the configured version and tokenizer fallback.
pub(crate) fn load_index(ctx: &AppContext, path: &Path) -> Result<Arc<SearchIndex>> {
    let builder = IndexBuilder::from_config(&ctx.config)?;
    let index = read_index(path, &builder)?;
    tracing::debug!(
        path = %path.display(),
        documents = index.documents().len(),
        terms = index.terms().len(),
        "loaded index"
    );
    Ok(Arc::new(index))
}
