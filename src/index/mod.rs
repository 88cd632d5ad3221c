//! Search index model, builder and persistence.
//!
//! ```text
//!   Corpus ──▶ IndexBuilder ──▶ SearchIndex ──▶ codec ──▶ searchindex.js
//!                  │                 │
//!              Tokenizer      ┌──────┼──────────┬───────────┐
//!                             ▼      ▼          ▼           ▼
//!                        TermTable ObjectTable Registry  TitleMap
//! ```
//!
//! A [`SearchIndex`] is immutable once built. Readers share it as
//! `Arc<SearchIndex>`; rebuilds publish a fresh value through
//! [`IndexHandle`].

pub mod builder;
pub mod codec;
pub mod corpus;
pub mod objects;
pub mod registry;
pub mod snapshot;
pub mod store;
pub mod terms;
pub mod titles;
pub mod tokenizer;

pub use builder::IndexBuilder;
pub use corpus::{Corpus, CorpusDocument, ExplicitTerm, ObjectDecl, ObjectSpec};
pub use objects::{ObjectEntry, ObjectPriority, ObjectRole, ObjectTable, ObjectType};
pub use registry::{Document, DocumentRegistry};
pub use snapshot::IndexHandle;
pub use store::{LoadOutcome, load_or_rebuild, read_index, write_index};
pub use terms::{Posting, RelevanceTier, TermTable, TermTableBuilder};
pub use titles::TitleMap;
pub use tokenizer::{Tokenizer, TokenizerPolicy};

/// Dense, zero-based document identifier.
pub type DocId = u32;

/// An immutable, fully validated search index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchIndex {
    env_version: u32,
    registry: DocumentRegistry,
    titles: TitleMap,
    objects: ObjectTable,
    terms: TermTable,
    tokenizer: Tokenizer,
}

impl SearchIndex {
    #[must_use]
    pub const fn env_version(&self) -> u32 {
        self.env_version
    }

    #[must_use]
    pub const fn documents(&self) -> &DocumentRegistry {
        &self.registry
    }

    #[must_use]
    pub const fn titles(&self) -> &TitleMap {
        &self.titles
    }

    #[must_use]
    pub const fn objects(&self) -> &ObjectTable {
        &self.objects
    }

    #[must_use]
    pub const fn terms(&self) -> &TermTable {
        &self.terms
    }

    /// The tokenizer the index was built with. Queries must use it too.
    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }
}
