//! Term table: term → postings with relevance tiers.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::DocId;

/// Where in a document a term occurred. Ordered `Body < Lead < Title`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RelevanceTier {
    #[default]
    Body,
    /// First paragraph of the document
    Lead,
    Title,
}

impl RelevanceTier {
    pub const ALL: [Self; 3] = [Self::Title, Self::Lead, Self::Body];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Lead => "lead",
            Self::Title => "title",
        }
    }
}

impl fmt::Display for RelevanceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Posting {
    pub doc: DocId,
    pub tier: RelevanceTier,
}

impl Posting {
    #[must_use]
    pub const fn new(doc: DocId, tier: RelevanceTier) -> Self {
        Self { doc, tier }
    }
}

/// Immutable term table. Posting lists are sorted by document id and hold
/// each document at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermTable {
    terms: BTreeMap<String, Vec<Posting>>,
}

impl TermTable {
    #[must_use]
    pub fn get(&self, term: &str) -> Option<&[Posting]> {
        self.terms.get(term).map(Vec::as_slice)
    }

    #[must_use]
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains_key(term)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms in lexicographic order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Posting])> {
        self.terms.iter().map(|(t, p)| (t.as_str(), p.as_slice()))
    }

    /// Index terms that contain `fragment` but are not equal to it.
    pub fn containing<'a>(
        &'a self,
        fragment: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a [Posting])> + 'a {
        self.iter()
            .filter(move |(term, _)| *term != fragment && term.contains(fragment))
    }

    /// Total number of (term, document) postings.
    #[must_use]
    pub fn posting_count(&self) -> usize {
        self.terms.values().map(Vec::len).sum()
    }

    /// Number of postings per tier, in `Title, Lead, Body` order.
    #[must_use]
    pub fn tier_counts(&self) -> [usize; 3] {
        let mut counts = [0; 3];
        for posting in self.terms.values().flatten() {
            let slot = match posting.tier {
                RelevanceTier::Title => 0,
                RelevanceTier::Lead => 1,
                RelevanceTier::Body => 2,
            };
            counts[slot] += 1;
        }
        counts
    }
}

/// Accumulates postings and keeps the strongest tier per (term, document).
#[derive(Debug, Default)]
pub struct TermTableBuilder {
    terms: BTreeMap<String, BTreeMap<DocId, RelevanceTier>>,
}

impl TermTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, term: impl Into<String>, doc: DocId, tier: RelevanceTier) {
        let slot = self
            .terms
            .entry(term.into())
            .or_default()
            .entry(doc)
            .or_insert(tier);
        if tier > *slot {
            *slot = tier;
        }
    }

    /// Merge per-document term maps, typically produced in parallel.
    pub fn extend_doc(&mut self, doc: DocId, terms: BTreeMap<String, RelevanceTier>) {
        for (term, tier) in terms {
            self.add(term, doc, tier);
        }
    }

    #[must_use]
    pub fn build(self) -> TermTable {
        let terms = self
            .terms
            .into_iter()
            .filter(|(term, docs)| !term.is_empty() && !docs.is_empty())
            .map(|(term, docs)| {
                let postings = docs
                    .into_iter()
                    .map(|(doc, tier)| Posting::new(doc, tier))
                    .collect();
                (term, postings)
            })
            .collect();
        TermTable { terms }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_are_ordered() {
        assert!(RelevanceTier::Title > RelevanceTier::Lead);
        assert!(RelevanceTier::Lead > RelevanceTier::Body);
        assert_eq!(RelevanceTier::default(), RelevanceTier::Body);
    }

    #[test]
    fn builder_keeps_highest_tier() {
        let mut builder = TermTableBuilder::new();
        builder.add("solver", 3, RelevanceTier::Body);
        builder.add("solver", 3, RelevanceTier::Title);
        builder.add("solver", 3, RelevanceTier::Lead);
        let table = builder.build();

        assert_eq!(
            table.get("solver").unwrap(),
            &[Posting::new(3, RelevanceTier::Title)]
        );
    }

    #[test]
    fn postings_are_sorted_by_document() {
        let mut builder = TermTableBuilder::new();
        builder.add("mesh", 7, RelevanceTier::Body);
        builder.add("mesh", 1, RelevanceTier::Body);
        builder.add("mesh", 4, RelevanceTier::Lead);
        let table = builder.build();

        let docs: Vec<_> = table.get("mesh").unwrap().iter().map(|p| p.doc).collect();
        assert_eq!(docs, vec![1, 4, 7]);
        assert_eq!(table.posting_count(), 3);
        assert_eq!(table.tier_counts(), [0, 1, 2]);
    }

    #[test]
    fn containing_excludes_exact_term() {
        let mut builder = TermTableBuilder::new();
        builder.add("mesh", 0, RelevanceTier::Body);
        builder.add("meshing", 1, RelevanceTier::Body);
        builder.add("submesh", 2, RelevanceTier::Body);
        builder.add("grid", 3, RelevanceTier::Body);
        let table = builder.build();

        let terms: Vec<_> = table.containing("mesh").map(|(t, _)| t).collect();
        assert_eq!(terms, vec!["meshing", "submesh"]);
    }

    #[test]
    fn empty_terms_are_dropped() {
        let mut builder = TermTableBuilder::new();
        builder.add("", 0, RelevanceTier::Body);
        assert!(builder.build().is_empty());
    }
}
