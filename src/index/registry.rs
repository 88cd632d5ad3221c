//! Document registry: dense ids to paths and titles.

use std::collections::HashMap;

use super::DocId;
use crate::error::{DsError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Path without extension, `/`-separated
    pub path: String,
    /// Display title; may be empty
    pub title: String,
}

/// Documents numbered `0..len()` in insertion order. Paths are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentRegistry {
    docs: Vec<Document>,
    by_path: HashMap<String, DocId>,
}

impl DocumentRegistry {
    pub fn new(docs: Vec<Document>) -> Result<Self> {
        let mut by_path = HashMap::with_capacity(docs.len());
        for (id, doc) in docs.iter().enumerate() {
            let id = DocId::try_from(id).map_err(|_| {
                DsError::InvalidCorpus(format!("more than {} documents", DocId::MAX))
            })?;
            if by_path.insert(doc.path.clone(), id).is_some() {
                return Err(DsError::DuplicateDocument(doc.path.clone()));
            }
        }
        Ok(Self { docs, by_path })
    }

    #[must_use]
    pub fn get(&self, id: DocId) -> Option<&Document> {
        self.docs.get(id as usize)
    }

    /// Id of the document at `path`.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<DocId> {
        self.by_path.get(path).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.docs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &Document)> {
        (0..).zip(self.docs.iter())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|d| d.path.as_str())
    }

    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.docs.iter().map(|d| d.title.as_str())
    }

    /// Fail with a referential-integrity error unless `id` is registered.
    pub fn check(&self, key: &str, id: DocId) -> Result<()> {
        if (id as usize) < self.docs.len() {
            Ok(())
        } else {
            Err(DsError::ReferentialIntegrity {
                key: key.to_string(),
                doc_id: id,
                doc_count: self.docs.len(),
            })
        }
    }
}
