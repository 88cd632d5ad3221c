//! Corpus input for the index builder.
//!
//! A corpus is either a structured file (JSON or YAML) describing documents
//! and objects explicitly, or a directory of Markdown, reStructuredText or
//! plain-text pages that is scanned into documents.

use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use super::DocId;
use super::objects::{ObjectPriority, ObjectRole};
use super::terms::RelevanceTier;
use crate::error::{DsError, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Corpus {
    #[serde(default)]
    pub documents: Vec<CorpusDocument>,
    /// Objects declared outside any document, with an explicit owner
    #[serde(default)]
    pub objects: Vec<ObjectDecl>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorpusDocument {
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub lead: String,
    #[serde(default)]
    pub body: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<ExplicitTerm>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub objects: Vec<ObjectSpec>,
}

/// A term attached to a document directly, bypassing text extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExplicitTerm {
    Plain(String),
    Tiered {
        term: String,
        #[serde(default)]
        tier: RelevanceTier,
    },
}

impl ExplicitTerm {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(term) | Self::Tiered { term, .. } => term,
        }
    }

    #[must_use]
    pub const fn tier(&self) -> RelevanceTier {
        match self {
            Self::Plain(_) => RelevanceTier::Body,
            Self::Tiered { tier, .. } => *tier,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSpec {
    /// Fully-qualified dotted name
    pub name: String,
    pub role: ObjectRole,
    #[serde(default = "default_domain")]
    pub domain: String,
    #[serde(default)]
    pub priority: ObjectPriority,
    #[serde(default)]
    pub anchor: String,
}

fn default_domain() -> String {
    "py".to_string()
}

impl ObjectSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, role: ObjectRole) -> Self {
        Self {
            name: name.into(),
            role,
            domain: default_domain(),
            priority: ObjectPriority::Default,
            anchor: String::new(),
        }
    }

    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = domain.into();
        self
    }

    #[must_use]
    pub const fn with_priority(mut self, priority: ObjectPriority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = anchor.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDecl {
    pub doc: DocId,
    #[serde(flatten)]
    pub spec: ObjectSpec,
}

impl CorpusDocument {
    #[must_use]
    pub fn new(path: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_lead(mut self, lead: impl Into<String>) -> Self {
        self.lead = lead.into();
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>, tier: RelevanceTier) -> Self {
        self.terms.push(ExplicitTerm::Tiered {
            term: term.into(),
            tier,
        });
        self
    }

    #[must_use]
    pub fn with_object(mut self, object: ObjectSpec) -> Self {
        self.objects.push(object);
        self
    }
}

impl Corpus {
    #[must_use]
    pub fn new(documents: Vec<CorpusDocument>) -> Self {
        Self {
            documents,
            objects: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_object(mut self, doc: DocId, spec: ObjectSpec) -> Self {
        self.objects.push(ObjectDecl { doc, spec });
        self
    }

    /// Load a corpus file or scan a directory.
    ///
    /// Directories are walked recursively in sorted order; only files whose
    /// extension is listed in `extensions` become documents.
    pub fn from_path(path: &Path, extensions: &[String]) -> Result<Self> {
        if path.is_dir() {
            return Self::scan_dir(path, extensions);
        }
        if !path.exists() {
            return Err(DsError::InvalidCorpus(format!(
                "{} does not exist",
                path.display()
            )));
        }

        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_str(&raw)?),
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(&raw)?),
            _ => Err(DsError::InvalidCorpus(format!(
                "{}: expected a .json or .yaml corpus file, or a directory",
                path.display()
            ))),
        }
    }

    pub fn scan_dir(root: &Path, extensions: &[String]) -> Result<Self> {
        let mut documents = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|err| {
                DsError::InvalidCorpus(format!("walk {}: {err}", root.display()))
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file = entry.path();
            let Some(ext) = file.extension().and_then(|e| e.to_str()) else {
                continue;
            };
            if !extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)) {
                continue;
            }

            let relative = file.strip_prefix(root).unwrap_or(file).with_extension("");
            let doc_path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");

            let text = std::fs::read_to_string(file)?;
            tracing::debug!(path = %doc_path, bytes = text.len(), "scanned document");
            documents.push(parse_text_document(doc_path, &text));
        }

        if documents.is_empty() {
            tracing::warn!(root = %root.display(), "corpus directory contains no documents");
        }
        Ok(Self::new(documents))
    }
}

/// Split a page into title, lead paragraph and body.
///
/// The title is a Markdown `#` heading, an underlined (or over- and
/// underlined) reStructuredText heading, or else the first non-empty line.
/// Object directives such as `.. py:function:: chidg.init(...)` are lifted
/// into the document's objects.
#[must_use]
pub fn parse_text_document(path: String, text: &str) -> CorpusDocument {
    let mut objects = Vec::new();
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| match parse_directive(line) {
            Some(spec) => {
                objects.push(spec);
                false
            }
            None => true,
        })
        .collect();

    let mut idx = lines.iter().position(|l| !l.trim().is_empty()).unwrap_or(lines.len());
    if idx < lines.len() && is_adornment(lines[idx]) {
        idx += 1;
    }

    let mut title = String::new();
    if let Some(line) = lines.get(idx) {
        let line = line.trim();
        title = line.strip_prefix('#').map_or(line, |h| h.trim_start_matches('#')).trim().to_string();
        idx += 1;
        if lines.get(idx).is_some_and(|l| is_adornment(l)) {
            idx += 1;
        }
    }

    let rest = &lines[idx.min(lines.len())..];
    let start = rest.iter().position(|l| !l.trim().is_empty()).unwrap_or(rest.len());
    let rest = &rest[start..];
    let end = rest.iter().position(|l| l.trim().is_empty()).unwrap_or(rest.len());

    CorpusDocument {
        path,
        title,
        lead: rest[..end].join("\n"),
        body: rest[end..].join("\n").trim().to_string(),
        terms: Vec::new(),
        objects,
    }
}

fn is_adornment(line: &str) -> bool {
    let line = line.trim_end();
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if "=-~^*#+\"'`".contains(first) => {
            line.len() >= 3 && chars.all(|c| c == first)
        }
        _ => false,
    }
}

fn parse_directive(line: &str) -> Option<ObjectSpec> {
    let rest = line.trim().strip_prefix("..")?.trim_start();
    let (directive, target) = rest.split_once("::")?;
    let (domain, role) = directive.split_once(':')?;
    let role: ObjectRole = role.trim().parse().ok()?;
    let name: String = target
        .trim()
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect();
    if name.is_empty() {
        return None;
    }
    Some(ObjectSpec::new(name, role).with_domain(domain.trim()))
}
