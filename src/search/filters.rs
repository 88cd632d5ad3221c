//! Result filters applied after scoring
//!
//! - Path prefix (restrict to a documentation subtree)
//! - Minimum score
//! - Result limit (applied last, after ranking)

use crate::index::Document;

/// Search filters for narrowing results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    /// Only documents whose path starts with this prefix
    pub path_prefix: Option<String>,
    /// Drop results scoring below this
    pub min_score: Option<u32>,
    /// Keep at most this many results
    pub limit: Option<usize>,
}

impl SearchFilters {
    /// Create new empty filters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set path prefix filter
    #[must_use]
    pub fn with_path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = Some(prefix.into());
        self
    }

    /// Set minimum score filter
    #[must_use]
    pub const fn with_min_score(mut self, min_score: u32) -> Self {
        self.min_score = Some(min_score);
        self
    }

    /// Set result limit
    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if any filters are set
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.path_prefix.is_none() && self.min_score.is_none() && self.limit.is_none()
    }

    /// Check if a scored document passes the per-document filters
    #[must_use]
    pub fn matches(&self, doc: &Document, score: u32) -> bool {
        if let Some(ref prefix) = self.path_prefix {
            if !doc.path.starts_with(prefix.as_str()) {
                return false;
            }
        }

        if let Some(min_score) = self.min_score {
            if score < min_score {
                return false;
            }
        }

        true
    }
}
