//! Query parsing, scoring and ranking.
//!
//! Score of a document = Σ over query terms of the best tier weight that term
//! reaches in the document. Partial matches (index terms containing the
//! query term) use a lower weight table and only count when they beat the
//! exact match.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::filters::SearchFilters;
use crate::config::SearchConfig;
use crate::error::{DsError, Result};
use crate::index::{DocId, ObjectPriority, Posting, RelevanceTier, SearchIndex, Tokenizer};

/// Query terms shorter than this never match partially.
pub const MIN_PARTIAL_LEN: usize = 3;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum CombineMode {
    /// Every term must match
    And,
    /// Any term may match; scores add up
    #[default]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierWeights {
    pub title: u32,
    pub lead: u32,
    pub body: u32,
}

impl TierWeights {
    pub const EXACT: Self = Self {
        title: 15,
        lead: 10,
        body: 5,
    };

    pub const PARTIAL: Self = Self {
        title: 7,
        lead: 4,
        body: 2,
    };

    #[must_use]
    pub const fn weight(&self, tier: RelevanceTier) -> u32 {
        match tier {
            RelevanceTier::Title => self.title,
            RelevanceTier::Lead => self.lead,
            RelevanceTier::Body => self.body,
        }
    }
}

impl Default for TierWeights {
    fn default() -> Self {
        Self::EXACT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ObjectWeights {
    /// Query equals the full or short name
    pub exact: i32,
    /// Query is a substring of the full name
    pub partial: i32,
    pub important: i32,
    pub default: i32,
    pub unimportant: i32,
}

impl Default for ObjectWeights {
    fn default() -> Self {
        Self {
            exact: 11,
            partial: 6,
            important: 15,
            default: 5,
            unimportant: -5,
        }
    }
}

impl ObjectWeights {
    #[must_use]
    pub const fn priority_bonus(&self, priority: ObjectPriority) -> i32 {
        match priority {
            ObjectPriority::Important => self.important,
            ObjectPriority::Default => self.default,
            ObjectPriority::Unimportant | ObjectPriority::Hidden => self.unimportant,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    pub mode: CombineMode,
    pub weights: TierWeights,
    /// Partial-match weights; `None` disables partial matching
    pub partial: Option<TierWeights>,
    pub object_weights: ObjectWeights,
    pub filters: SearchFilters,
}

impl QueryOptions {
    #[must_use]
    pub fn from_config(config: &SearchConfig) -> Self {
        let mut filters = SearchFilters::new().with_limit(config.limit);
        if let Some(min_score) = config.min_score {
            filters = filters.with_min_score(min_score);
        }
        Self {
            mode: config.mode,
            weights: TierWeights {
                title: config.title_weight,
                lead: config.lead_weight,
                body: config.body_weight,
            },
            partial: config.partial_matching.then_some(TierWeights {
                title: config.partial_title_weight,
                lead: config.partial_lead_weight,
                body: config.partial_body_weight,
            }),
            object_weights: ObjectWeights::default(),
            filters,
        }
    }

    #[must_use]
    pub const fn with_mode(mut self, mode: CombineMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub const fn with_partial(mut self, weights: TierWeights) -> Self {
        self.partial = Some(weights);
        self
    }

    #[must_use]
    pub fn with_filters(mut self, filters: SearchFilters) -> Self {
        self.filters = filters;
        self
    }
}

/// Tokenized query: terms to match and terms whose documents are excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedQuery {
    pub terms: Vec<String>,
    pub excluded: Vec<String>,
}

/// Split on whitespace; words starting with `-` exclude. Errors with
/// [`DsError::EmptyQuery`] when nothing searchable remains.
pub fn parse_query(query: &str, tokenizer: &Tokenizer) -> Result<ParsedQuery> {
    let mut terms = Vec::new();
    let mut excluded = Vec::new();

    for word in query.split_whitespace() {
        let (target, text) = match word.strip_prefix('-') {
            Some(rest) => (&mut excluded, rest),
            None => (&mut terms, word),
        };
        for token in tokenizer.tokenize(text) {
            if !target.contains(&token) {
                target.push(token);
            }
        }
    }
    terms.retain(|t| !excluded.contains(t));

    if terms.is_empty() {
        return Err(DsError::EmptyQuery);
    }
    Ok(ParsedQuery { terms, excluded })
}

/// Query engine over one immutable index snapshot.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    index: Arc<SearchIndex>,
    options: QueryOptions,
}

impl QueryEngine {
    #[must_use]
    pub const fn new(index: Arc<SearchIndex>, options: QueryOptions) -> Self {
        Self { index, options }
    }

    #[must_use]
    pub const fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }

    #[must_use]
    pub const fn options(&self) -> &QueryOptions {
        &self.options
    }

    /// Rank documents for a free-text query: descending score, ties by id.
    pub fn search(&self, query: &str) -> Result<SearchResults> {
        let parsed = parse_query(query, self.index.tokenizer())?;
        let per_term: Vec<BTreeMap<DocId, u32>> =
            parsed.terms.iter().map(|t| self.score_term(t)).collect();

        // Sums saturate: configured weights are unbounded.
        let mut scores: BTreeMap<DocId, u32> = BTreeMap::new();
        match self.options.mode {
            CombineMode::Or => {
                for term_scores in &per_term {
                    for (&doc, &score) in term_scores {
                        let slot = scores.entry(doc).or_default();
                        *slot = slot.saturating_add(score);
                    }
                }
            }
            CombineMode::And => {
                if let Some((first, rest)) = per_term.split_first() {
                    for (&doc, &score) in first {
                        let total = rest.iter().try_fold(score, |acc, m| {
                            m.get(&doc).map(|s| acc.saturating_add(*s))
                        });
                        if let Some(total) = total {
                            scores.insert(doc, total);
                        }
                    }
                }
            }
        }

        for term in &parsed.excluded {
            for posting in self.index.terms().get(term).unwrap_or_default() {
                scores.remove(&posting.doc);
            }
        }

        let filters = &self.options.filters;
        let mut ranked: Vec<(DocId, u32)> = scores
            .into_iter()
            .filter(|&(doc, score)| {
                score > 0
                    && self
                        .index
                        .documents()
                        .get(doc)
                        .is_some_and(|d| filters.matches(d, score))
            })
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        if let Some(limit) = filters.limit {
            ranked.truncate(limit);
        }

        tracing::debug!(
            query,
            terms = ?parsed.terms,
            excluded = ?parsed.excluded,
            hits = ranked.len(),
            "search complete"
        );

        Ok(SearchResults {
            index: Arc::clone(&self.index),
            ranked,
            query: parsed,
        })
    }

    /// Best score per document for a single query term.
    fn score_term(&self, term: &str) -> BTreeMap<DocId, u32> {
        let mut best: BTreeMap<DocId, u32> = BTreeMap::new();
        let mut offer = |postings: &[Posting], weights: &TierWeights| {
            for posting in postings {
                let score = weights.weight(posting.tier);
                let slot = best.entry(posting.doc).or_default();
                *slot = (*slot).max(score);
            }
        };

        if let Some(postings) = self.index.terms().get(term) {
            offer(postings, &self.options.weights);
        }
        if let Some(partial) = &self.options.partial {
            if term.chars().count() >= MIN_PARTIAL_LEN {
                for (_, postings) in self.index.terms().containing(term) {
                    offer(postings, partial);
                }
            }
        }
        best
    }

    /// Match query words against object names, case-insensitively.
    pub fn search_objects(&self, query: &str) -> Result<Vec<ObjectHit>> {
        let mut words = Vec::new();
        let mut excluded = Vec::new();
        for word in query.split_whitespace() {
            match word.strip_prefix('-') {
                Some(rest) if !rest.is_empty() => excluded.push(rest.to_lowercase()),
                Some(_) => {}
                None => words.push(word.to_lowercase()),
            }
        }
        if words.is_empty() {
            return Err(DsError::EmptyQuery);
        }

        let weights = &self.options.object_weights;
        let filters = &self.options.filters;
        let objects = self.index.objects();
        let mut hits = Vec::new();

        for entry in objects.iter() {
            let full_name = entry.full_name();
            let full = full_name.to_lowercase();
            let short = entry.name.to_lowercase();
            if excluded.iter().any(|w| full.contains(w.as_str())) {
                continue;
            }

            let matched = words
                .iter()
                .map(|w| {
                    if full == *w || short == *w {
                        weights.exact
                    } else if full.contains(w.as_str()) {
                        weights.partial
                    } else {
                        0
                    }
                })
                .max()
                .unwrap_or(0);
            if matched == 0 {
                continue;
            }

            let Some(doc) = self.index.documents().get(entry.doc) else {
                continue;
            };
            let score = matched + weights.priority_bonus(entry.priority);
            if !filters.matches(doc, u32::try_from(score).unwrap_or(0)) {
                continue;
            }
            let Some(object_type) = objects.object_type(entry.type_index) else {
                continue;
            };

            hits.push(ObjectHit {
                name: full_name,
                doc: entry.doc,
                path: doc.path.clone(),
                title: doc.title.clone(),
                label: object_type.label.clone(),
                anchor: entry.resolved_anchor(),
                score,
            });
        }

        hits.sort_by(|a, b| b.score.cmp(&a.score).then_with(|| a.name.cmp(&b.name)));
        if let Some(limit) = filters.limit {
            hits.truncate(limit);
        }
        Ok(hits)
    }
}

/// Ranked results, holding the snapshot they were computed from. Iterate as
/// often as needed; paths and titles are resolved lazily.
#[derive(Debug, Clone)]
pub struct SearchResults {
    index: Arc<SearchIndex>,
    ranked: Vec<(DocId, u32)>,
    query: ParsedQuery,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchHit<'a> {
    pub doc: DocId,
    pub score: u32,
    pub path: &'a str,
    pub title: &'a str,
}

impl SearchResults {
    pub fn iter(&self) -> impl Iterator<Item = SearchHit<'_>> + '_ {
        self.ranked.iter().filter_map(|&(doc, score)| {
            let document = self.index.documents().get(doc)?;
            Some(SearchHit {
                doc,
                score,
                path: &document.path,
                title: &document.title,
            })
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    #[must_use]
    pub fn doc_ids(&self) -> Vec<DocId> {
        self.ranked.iter().map(|&(doc, _)| doc).collect()
    }

    #[must_use]
    pub fn scores(&self) -> &[(DocId, u32)] {
        &self.ranked
    }

    #[must_use]
    pub const fn query(&self) -> &ParsedQuery {
        &self.query
    }

    #[must_use]
    pub const fn index(&self) -> &Arc<SearchIndex> {
        &self.index
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = SearchHit<'a>;
    type IntoIter = Box<dyn Iterator<Item = SearchHit<'a>> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectHit {
    pub name: String,
    pub doc: DocId,
    pub path: String,
    pub title: String,
    /// Category label, e.g. `Python function`
    pub label: String,
    pub anchor: Option<String>,
    pub score: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{
        Corpus, CorpusDocument, IndexBuilder, ObjectRole, ObjectSpec, TokenizerPolicy,
    };

    fn index(corpus: &Corpus) -> Arc<SearchIndex> {
        let tokenizer = Tokenizer::new(TokenizerPolicy::verbatim()).unwrap();
        Arc::new(IndexBuilder::new(tokenizer, 49).build(corpus).unwrap())
    }

    fn engine(corpus: &Corpus, options: QueryOptions) -> QueryEngine {
        QueryEngine::new(index(corpus), options)
    }

    fn chidg_corpus() -> Corpus {
        Corpus::new(vec![
            CorpusDocument::new("index", "Welcome").with_body("solver mesh"),
            CorpusDocument::new("mesh", "Mesh").with_lead("The mesh holds elements"),
            CorpusDocument::new("solvers", "Solver").with_body("newton"),
        ])
    }

    #[test]
    fn parse_query_dedupes_and_excludes() {
        let tokenizer = Tokenizer::new(TokenizerPolicy::verbatim()).unwrap();
        let parsed = parse_query("Mesh mesh -solver Chimera", &tokenizer).unwrap();
        assert_eq!(parsed.terms, vec!["mesh", "chimera"]);
        assert_eq!(parsed.excluded, vec!["solver"]);
    }

    #[test]
    fn parse_query_rejects_empty_and_punctuation() {
        let tokenizer = Tokenizer::new(TokenizerPolicy::verbatim()).unwrap();
        assert!(matches!(parse_query("", &tokenizer), Err(DsError::EmptyQuery)));
        assert!(matches!(parse_query(" ?! ", &tokenizer), Err(DsError::EmptyQuery)));
        assert!(matches!(parse_query("-mesh", &tokenizer), Err(DsError::EmptyQuery)));
    }

    #[test]
    fn tiers_rank_title_over_lead_over_body() {
        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("mesh")
            .unwrap();
        assert_eq!(results.scores(), &[(1, 15), (0, 5)]);

        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("solver")
            .unwrap();
        assert_eq!(results.doc_ids(), vec![2, 0]);
    }

    #[test]
    fn or_sums_and_and_intersects() {
        let corpus = chidg_corpus();
        let or = engine(&corpus, QueryOptions::default())
            .search("mesh solver")
            .unwrap();
        assert_eq!(or.scores(), &[(1, 15), (2, 15), (0, 10)]);

        let and = engine(&corpus, QueryOptions::default().with_mode(CombineMode::And))
            .search("mesh solver")
            .unwrap();
        assert_eq!(and.scores(), &[(0, 10)]);
    }

    #[test]
    fn large_weights_saturate_instead_of_wrapping() {
        let corpus = Corpus::new(vec![
            CorpusDocument::new("a", "mesh solver"),
            CorpusDocument::new("b", "Other").with_body("mesh"),
        ]);
        let heavy = TierWeights {
            title: u32::MAX / 2 + 1,
            ..TierWeights::EXACT
        };
        let options = QueryOptions {
            weights: heavy,
            ..QueryOptions::default()
        };

        let or = engine(&corpus, options.clone()).search("mesh solver").unwrap();
        assert_eq!(or.scores(), &[(0, u32::MAX), (1, 5)]);

        let and = engine(&corpus, options.with_mode(CombineMode::And))
            .search("mesh solver")
            .unwrap();
        assert_eq!(and.scores(), &[(0, u32::MAX)]);
    }

    #[test]
    fn config_min_score_filters_results() {
        let config = SearchConfig {
            min_score: Some(10),
            ..SearchConfig::default()
        };
        let results = engine(&chidg_corpus(), QueryOptions::from_config(&config))
            .search("mesh")
            .unwrap();
        assert_eq!(results.scores(), &[(1, 15)]);
    }

    #[test]
    fn unknown_terms_contribute_nothing() {
        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("zzz mesh")
            .unwrap();
        assert_eq!(results.doc_ids(), vec![1, 0]);

        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("zzz")
            .unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn exclusions_remove_documents() {
        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("mesh -solver")
            .unwrap();
        assert_eq!(results.doc_ids(), vec![1]);
    }

    #[test]
    fn partial_matching_is_opt_in() {
        let corpus = Corpus::new(vec![
            CorpusDocument::new("a", "Preconditioners"),
            CorpusDocument::new("b", "Other").with_body("precon"),
        ]);
        let exact = engine(&corpus, QueryOptions::default()).search("precon").unwrap();
        assert_eq!(exact.scores(), &[(1, 5)]);

        let partial = engine(
            &corpus,
            QueryOptions::default().with_partial(TierWeights::PARTIAL),
        )
        .search("precon")
        .unwrap();
        assert_eq!(partial.scores(), &[(0, 7), (1, 5)]);
    }

    #[test]
    fn filters_apply_prefix_and_limit() {
        let corpus = Corpus::new(vec![
            CorpusDocument::new("guide/a", "Mesh"),
            CorpusDocument::new("api/b", "Mesh"),
            CorpusDocument::new("guide/c", "Mesh"),
        ]);
        let options = QueryOptions::default()
            .with_filters(SearchFilters::new().with_path_prefix("guide/").with_limit(1));
        let results = engine(&corpus, options).search("mesh").unwrap();
        assert_eq!(results.doc_ids(), vec![0]);
    }

    #[test]
    fn results_are_restartable_and_resolve_lazily() {
        let results = engine(&chidg_corpus(), QueryOptions::default())
            .search("mesh")
            .unwrap();
        let first: Vec<_> = results.iter().map(|h| h.path).collect();
        let second: Vec<_> = (&results).into_iter().map(|h| h.title).collect();
        assert_eq!(first, vec!["mesh", "index"]);
        assert_eq!(second, vec!["Mesh", "Welcome"]);
    }

    #[test]
    fn object_search_scores_and_orders() {
        let corpus = Corpus::new(vec![CorpusDocument::new("api", "API")])
            .with_object(0, ObjectSpec::new("chidg.dot", ObjectRole::Function))
            .with_object(
                0,
                ObjectSpec::new("chidg.dot_product", ObjectRole::Function)
                    .with_priority(ObjectPriority::Important),
            )
            .with_object(0, ObjectSpec::new("mesh_t", ObjectRole::Class));
        let hits = engine(&corpus, QueryOptions::default())
            .search_objects("DOT")
            .unwrap();

        let ranked: Vec<_> = hits.iter().map(|h| (h.name.as_str(), h.score)).collect();
        assert_eq!(ranked, vec![("chidg.dot_product", 21), ("chidg.dot", 16)]);
        assert_eq!(hits[1].label, "Python function");
        assert_eq!(hits[1].anchor.as_deref(), Some("chidg.dot"));
    }

    #[test]
    fn object_search_rejects_empty_query() {
        let corpus = Corpus::new(vec![CorpusDocument::new("api", "API")]);
        let engine = engine(&corpus, QueryOptions::default());
        assert!(matches!(engine.search_objects("  "), Err(DsError::EmptyQuery)));
    }
}
