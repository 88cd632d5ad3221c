//! Corpus → [`SearchIndex`].
//!
//! Per-document term extraction runs on the rayon pool; results are merged
//! in document order so the same corpus and policy always produce the same
//! index.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::corpus::{Corpus, CorpusDocument, ObjectSpec};
use super::objects::{ObjectEntry, ObjectPriority, ObjectTable, ObjectType, split_name};
use super::registry::{Document, DocumentRegistry};
use super::terms::{RelevanceTier, TermTableBuilder};
use super::titles::TitleMap;
use super::tokenizer::Tokenizer;
use super::{DocId, SearchIndex};
use crate::config::Config;
use crate::error::{DsError, Result};

#[derive(Debug, Clone)]
pub struct IndexBuilder {
    tokenizer: Tokenizer,
    env_version: u32,
    parallel: bool,
}

impl IndexBuilder {
    #[must_use]
    pub const fn new(tokenizer: Tokenizer, env_version: u32) -> Self {
        Self {
            tokenizer,
            env_version,
            parallel: true,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            Tokenizer::from_config(&config.tokenizer)?,
            config.index.env_version,
        )
        .with_parallel(config.build.parallel))
    }

    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub const fn tokenizer(&self) -> &Tokenizer {
        &self.tokenizer
    }

    #[must_use]
    pub const fn env_version(&self) -> u32 {
        self.env_version
    }

    /// Build an index. Nothing is produced when any integrity check fails.
    pub fn build(&self, corpus: &Corpus) -> Result<SearchIndex> {
        info!(
            documents = corpus.documents.len(),
            objects = corpus.objects.len(),
            "building search index"
        );

        let registry = DocumentRegistry::new(
            corpus
                .documents
                .iter()
                .map(|doc| Document {
                    path: doc.path.clone(),
                    title: doc.title.clone(),
                })
                .collect(),
        )?;
        let titles = TitleMap::from_registry(&registry)?;
        let objects = build_objects(corpus, &registry)?;

        let extracted: Vec<BTreeMap<String, RelevanceTier>> = if self.parallel {
            corpus
                .documents
                .par_iter()
                .map(|doc| self.extract_terms(doc))
                .collect()
        } else {
            corpus
                .documents
                .iter()
                .map(|doc| self.extract_terms(doc))
                .collect()
        };

        let mut terms = TermTableBuilder::new();
        for (doc_id, doc_terms) in (0..).zip(extracted) {
            terms.extend_doc(doc_id, doc_terms);
        }
        let terms = terms.build();

        info!(
            terms = terms.len(),
            postings = terms.posting_count(),
            objects = objects.len(),
            "search index built"
        );

        Ok(SearchIndex {
            env_version: self.env_version,
            registry,
            titles,
            objects,
            terms,
            tokenizer: self.tokenizer.clone(),
        })
    }

    fn extract_terms(&self, doc: &CorpusDocument) -> BTreeMap<String, RelevanceTier> {
        let mut out: BTreeMap<String, RelevanceTier> = BTreeMap::new();
        let mut record = |text: &str, tier: RelevanceTier| {
            for term in self.tokenizer.tokenize(text) {
                let slot = out.entry(term).or_insert(tier);
                if tier > *slot {
                    *slot = tier;
                }
            }
        };

        record(&doc.title, RelevanceTier::Title);
        record(&doc.lead, RelevanceTier::Lead);
        record(&doc.body, RelevanceTier::Body);
        for term in &doc.terms {
            record(term.text(), term.tier());
        }

        debug!(path = %doc.path, terms = out.len(), "extracted document terms");
        out
    }
}

fn build_objects(corpus: &Corpus, registry: &DocumentRegistry) -> Result<ObjectTable> {
    let declared = corpus
        .documents
        .iter()
        .zip(0..)
        .flat_map(|(doc, id): (&CorpusDocument, DocId)| doc.objects.iter().map(move |o| (id, o)))
        .chain(corpus.objects.iter().map(|decl| (decl.doc, &decl.spec)));

    let mut accepted: Vec<(DocId, &ObjectSpec)> = Vec::new();
    let mut seen = BTreeSet::new();
    for (doc, spec) in declared {
        registry.check(&spec.name, doc)?;
        if spec.name.is_empty() {
            return Err(DsError::InvalidCorpus(format!(
                "object declared in document {doc} has an empty name"
            )));
        }
        if spec.priority == ObjectPriority::Hidden {
            debug!(object = %spec.name, "skipping hidden object");
            continue;
        }
        if !seen.insert(spec.name.as_str()) {
            warn!(object = %spec.name, doc, "duplicate object declaration ignored");
            continue;
        }
        accepted.push((doc, spec));
    }

    let types: Vec<ObjectType> = accepted
        .iter()
        .map(|(_, spec)| (spec.domain.as_str(), spec.role.as_str(), spec.role))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|(domain, _, role)| ObjectType::new(domain, role))
        .collect();

    let mut entries: BTreeMap<String, BTreeMap<String, ObjectEntry>> = BTreeMap::new();
    for (doc, spec) in accepted {
        let type_index = types
            .iter()
            .position(|ty| ty.domain == spec.domain && ty.role == spec.role)
            .and_then(|idx| u32::try_from(idx).ok())
            .ok_or_else(|| DsError::InvalidCorpus(format!("no type for object {}", spec.name)))?;
        let (prefix, name) = split_name(&spec.name);
        entries.entry(prefix.to_string()).or_default().insert(
            name.to_string(),
            ObjectEntry {
                prefix: prefix.to_string(),
                name: name.to_string(),
                doc,
                type_index,
                priority: spec.priority,
                anchor: spec.anchor.clone(),
            },
        );
    }

    Ok(ObjectTable::from_parts(types, entries))
}
