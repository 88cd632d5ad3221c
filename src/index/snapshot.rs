//! Atomically swappable handle to the current index.
//!
//! Readers pin a snapshot with [`IndexHandle::snapshot`] and keep using it
//! for as long as they hold the `Arc`, even after a rebuild publishes a
//! replacement.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::builder::IndexBuilder;
use super::corpus::Corpus;
use super::SearchIndex;
use crate::error::Result;
use crate::search::{QueryEngine, QueryOptions};

pub struct IndexHandle {
    current: ArcSwap<SearchIndex>,
}

impl IndexHandle {
    #[must_use]
    pub fn new(index: SearchIndex) -> Self {
        Self {
            current: ArcSwap::from_pointee(index),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<SearchIndex> {
        self.current.load_full()
    }

    /// Swap in a new index, returning the one it replaced.
    pub fn publish(&self, index: SearchIndex) -> Arc<SearchIndex> {
        self.current.swap(Arc::new(index))
    }

    /// Build off to the side and publish only on success. A failed build
    /// leaves the current index in place.
    pub fn rebuild(&self, builder: &IndexBuilder, corpus: &Corpus) -> Result<Arc<SearchIndex>> {
        let index = builder.build(corpus)?;
        let previous = self.publish(index);
        tracing::info!(
            previous_terms = previous.terms().len(),
            terms = self.current.load().terms().len(),
            "published rebuilt index"
        );
        Ok(previous)
    }

    /// Query engine bound to the current snapshot.
    #[must_use]
    pub fn engine(&self, options: QueryOptions) -> QueryEngine {
        QueryEngine::new(self.snapshot(), options)
    }
}

impl std::fmt::Debug for IndexHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let current = self.current.load();
        f.debug_struct("IndexHandle")
            .field("documents", &current.documents().len())
            .field("terms", &current.terms().len())
            .finish()
    }
}
