//! Hierarchical title map.
//!
//! Keys are `/`-separated paths; a key's parent is its longest proper
//! ancestor that is itself a key, so the map always forms a forest even when
//! intermediate directories have no page of their own.

use std::collections::BTreeMap;
use std::ops::Bound;

use super::registry::DocumentRegistry;
use crate::error::{DsError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleMap {
    titles: BTreeMap<String, String>,
}

impl TitleMap {
    pub fn new(entries: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut titles = BTreeMap::new();
        for (key, title) in entries {
            validate_key(&key)?;
            if titles.insert(key.clone(), title).is_some() {
                return Err(DsError::InvalidTitleKey {
                    key,
                    reason: "duplicate key".to_string(),
                });
            }
        }
        Ok(Self { titles })
    }

    pub fn from_registry(registry: &DocumentRegistry) -> Result<Self> {
        Self::new(
            registry
                .iter()
                .map(|(_, doc)| (doc.path.clone(), doc.title.clone())),
        )
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.titles.get(key).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.titles.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn parent(&self, key: &str) -> Option<&str> {
        let mut current = key;
        while let Some((ancestor, _)) = current.rsplit_once('/') {
            if let Some((found, _)) = self.titles.get_key_value(ancestor) {
                return Some(found.as_str());
            }
            current = ancestor;
        }
        None
    }

    /// Direct children of `key`, in key order.
    #[must_use]
    pub fn children(&self, key: &str) -> Vec<&str> {
        let prefix = format!("{key}/");
        self.titles
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .map(|(k, _)| k.as_str())
            .take_while(|k| k.starts_with(&prefix))
            .filter(|k| self.parent(k) == Some(key))
            .collect()
    }

    /// Keys without a parent.
    #[must_use]
    pub fn roots(&self) -> Vec<&str> {
        self.titles
            .keys()
            .map(String::as_str)
            .filter(|k| self.parent(k).is_none())
            .collect()
    }
}

fn validate_key(key: &str) -> Result<()> {
    let invalid = |reason: &str| DsError::InvalidTitleKey {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    if key.is_empty() {
        return Err(invalid("key is empty"));
    }
    for segment in key.split('/') {
        match segment {
            "" => return Err(invalid("empty path segment")),
            "." | ".." => return Err(invalid("relative path segment")),
            _ => {}
        }
    }
    Ok(())
}
