//! docsearch - static documentation search indexes.
//!
//! Build an inverted index from a documentation corpus once, persist it as a
//! `searchindex.js` payload, and answer ranked queries against the immutable
//! result.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod index;
pub mod search;

pub use error::{DsError, Result};
pub use index::{IndexBuilder, IndexHandle, SearchIndex};
pub use search::{QueryEngine, QueryOptions, Resolver};

/// Package version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
