//! Turns document ids and object names into titles, labels and links.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{DsError, Result};
use crate::index::{DocId, SearchIndex};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedDocument {
    pub doc: DocId,
    pub path: String,
    /// Empty when the document has no title
    pub title: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedObject {
    pub name: String,
    pub doc: DocId,
    pub path: String,
    pub title: String,
    pub domain: String,
    pub role: String,
    /// Category label, e.g. `Python function`
    pub label: String,
    pub anchor: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    index: Arc<SearchIndex>,
    link_suffix: String,
}

impl Resolver {
    #[must_use]
    pub fn new(index: Arc<SearchIndex>, link_suffix: impl Into<String>) -> Self {
        Self {
            index,
            link_suffix: link_suffix.into(),
        }
    }

    pub fn resolve_document(&self, doc: DocId) -> Result<ResolvedDocument> {
        let document = self
            .index
            .documents()
            .get(doc)
            .ok_or_else(|| DsError::NotFound(format!("document {doc}")))?;
        Ok(ResolvedDocument {
            doc,
            path: document.path.clone(),
            title: document.title.clone(),
            link: self.link(&document.path, None),
        })
    }

    pub fn resolve_path(&self, path: &str) -> Result<ResolvedDocument> {
        let doc = self
            .index
            .documents()
            .lookup(path)
            .ok_or_else(|| DsError::NotFound(format!("document '{path}'")))?;
        self.resolve_document(doc)
    }

    pub fn resolve_object(&self, name: &str) -> Result<ResolvedObject> {
        let entry = self
            .index
            .objects()
            .get(name)
            .ok_or_else(|| DsError::NotFound(format!("object '{name}'")))?;
        let object_type = self
            .index
            .objects()
            .object_type(entry.type_index)
            .ok_or_else(|| {
                DsError::Format(format!("object '{name}' has unknown type {}", entry.type_index))
            })?;
        let document = self.resolve_document(entry.doc)?;
        let anchor = entry.resolved_anchor();

        Ok(ResolvedObject {
            name: entry.full_name(),
            doc: entry.doc,
            link: self.link(&document.path, anchor.as_deref()),
            path: document.path,
            title: document.title,
            domain: object_type.domain.clone(),
            role: object_type.role.to_string(),
            label: object_type.label.clone(),
            anchor,
        })
    }

    /// `path + suffix`, plus `#anchor` when there is one.
    #[must_use]
    pub fn link(&self, path: &str, anchor: Option<&str>) -> String {
        match anchor {
            Some(anchor) => format!("{path}{}#{anchor}", self.link_suffix),
            None => format!("{path}{}", self.link_suffix),
        }
    }
}
