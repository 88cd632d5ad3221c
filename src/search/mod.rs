//! Query side of the search index
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Query string                 │
//! └──────────────────────────────────────────────┘
//!                        │  parse_query (index tokenizer)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │  QueryEngine  (one Arc<SearchIndex> snapshot)│
//! │   per-term best tier ─▶ And / Or combine     │
//! └──────────────────────────────────────────────┘
//!                        │  exclusions, filters, rank
//!                        ▼
//!        SearchResults ──▶ Resolver (titles, links)
//! ```

pub mod filters;
pub mod query;
pub mod resolver;

pub use filters::SearchFilters;
pub use query::{
    CombineMode, ObjectHit, ObjectWeights, ParsedQuery, QueryEngine, QueryOptions, SearchHit,
    SearchResults, TierWeights, parse_query,
};
pub use resolver::{ResolvedDocument, ResolvedObject, Resolver};
