//! Tokenization policy shared by the index builder and the query engine.
//!
//! Both sides MUST tokenize through the same [`Tokenizer`]: an index term that
//! was stemmed at build time is unreachable from an unstemmed query. The
//! policy is persisted with the index so a consumer can rebuild the exact
//! pipeline that produced it.
//!
//! Pipeline (tantivy text analyzer):
//!
//! ```text
//! NFKC ─▶ \w+ split ─▶ drop long tokens ─▶ lowercase ─▶ stopwords ─▶ stemmer
//! ```

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use tantivy::tokenizer::{
    Language, LowerCaser, RegexTokenizer, RemoveLongFilter, Stemmer, StopWordFilter, TextAnalyzer,
    TokenStream,
};
use unicode_normalization::UnicodeNormalization;

use crate::config::TokenizerConfig;
use crate::error::{DsError, Result};

/// Word characters: letters, digits and `_`, so identifiers such as
/// `time_integrator_t` survive as a single term.
const WORD_PATTERN: &str = r"\w+";

/// Stopwords elided by default.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is", "it",
    "near", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
    "these", "they", "this", "to", "was", "will", "with",
];

/// Stemmer name that disables stemming.
pub const NO_STEMMER: &str = "none";

/// The persisted description of a tokenizer pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerPolicy {
    /// Snowball stemmer language, or `none`
    pub stemmer: String,
    /// Effective deny-list, lowercase, sorted and deduplicated
    pub stopwords: Vec<String>,
    /// Tokens longer than this many bytes are dropped
    pub max_token_len: usize,
}

impl Default for TokenizerPolicy {
    fn default() -> Self {
        Self::from_config(&TokenizerConfig::default())
    }
}

impl TokenizerPolicy {
    /// Resolve the effective policy: default list plus extras, minus the allow-list.
    #[must_use]
    pub fn from_config(config: &TokenizerConfig) -> Self {
        let allow: BTreeSet<String> = config.allow.iter().map(|w| w.to_lowercase()).collect();

        let defaults = config
            .use_default_stopwords
            .then_some(DEFAULT_STOPWORDS)
            .unwrap_or_default()
            .iter()
            .map(|w| (*w).to_string());

        let stopwords: BTreeSet<String> = defaults
            .chain(config.stopwords.iter().map(|w| w.to_lowercase()))
            .filter(|w| !w.is_empty() && !allow.contains(w))
            .collect();

        Self {
            stemmer: config.stemmer.to_lowercase(),
            stopwords: stopwords.into_iter().collect(),
            max_token_len: config.max_token_len,
        }
    }

    /// Policy with stemming disabled and no stopwords.
    #[must_use]
    pub fn verbatim() -> Self {
        Self {
            stemmer: NO_STEMMER.to_string(),
            stopwords: Vec::new(),
            max_token_len: TokenizerConfig::default().max_token_len,
        }
    }
}

/// A ready-to-use tokenizer built from a [`TokenizerPolicy`].
#[derive(Clone)]
pub struct Tokenizer {
    policy: TokenizerPolicy,
    analyzer: TextAnalyzer,
}

impl Tokenizer {
    /// Build the analyzer pipeline for a policy.
    pub fn new(policy: TokenizerPolicy) -> Result<Self> {
        if policy.max_token_len == 0 {
            return Err(DsError::Config(
                "tokenizer.max_token_len must be greater than zero".to_string(),
            ));
        }
        let language = parse_stemmer(&policy.stemmer)?;

        let mut builder = TextAnalyzer::builder(RegexTokenizer::new(WORD_PATTERN)?)
            .dynamic()
            .filter_dynamic(RemoveLongFilter::limit(policy.max_token_len))
            .filter_dynamic(LowerCaser);
        if !policy.stopwords.is_empty() {
            builder = builder.filter_dynamic(StopWordFilter::remove(policy.stopwords.clone()));
        }
        if let Some(language) = language {
            builder = builder.filter_dynamic(Stemmer::new(language));
        }

        Ok(Self {
            policy,
            analyzer: builder.build(),
        })
    }

    /// Build from the `[tokenizer]` config section.
    pub fn from_config(config: &TokenizerConfig) -> Result<Self> {
        Self::new(TokenizerPolicy::from_config(config))
    }

    #[must_use]
    pub const fn policy(&self) -> &TokenizerPolicy {
        &self.policy
    }

    /// Split text into index terms, in order of appearance (duplicates kept).
    #[must_use]
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text.nfkc().collect();
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(&normalized);

        let mut terms = Vec::new();
        while let Some(token) = stream.next() {
            if !token.text.is_empty() {
                terms.push(token.text.clone());
            }
        }
        terms
    }
}

impl PartialEq for Tokenizer {
    fn eq(&self, other: &Self) -> bool {
        self.policy == other.policy
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

fn parse_stemmer(name: &str) -> Result<Option<Language>> {
    let language = match name {
        NO_STEMMER | "" => return Ok(None),
        "arabic" => Language::Arabic,
        "danish" => Language::Danish,
        "dutch" => Language::Dutch,
        "english" => Language::English,
        "finnish" => Language::Finnish,
        "french" => Language::French,
        "german" => Language::German,
        "greek" => Language::Greek,
        "hungarian" => Language::Hungarian,
        "italian" => Language::Italian,
        "norwegian" => Language::Norwegian,
        "portuguese" => Language::Portuguese,
        "romanian" => Language::Romanian,
        "russian" => Language::Russian,
        "spanish" => Language::Spanish,
        "swedish" => Language::Swedish,
        "tamil" => Language::Tamil,
        "turkish" => Language::Turkish,
        other => {
            return Err(DsError::Config(format!(
                "unknown stemmer '{other}' (expected a Snowball language such as english, or none)"
            )));
        }
    };
    Ok(Some(language))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbatim() -> Tokenizer {
        Tokenizer::new(TokenizerPolicy::verbatim()).unwrap()
    }

    #[test]
    fn splits_on_punctuation_and_folds_case() {
        let tokens = verbatim().tokenize("Solver, Detail! (MPI)");
        assert_eq!(tokens, vec!["solver", "detail", "mpi"]);
    }

    #[test]
    fn keeps_identifiers_with_underscores() {
        let tokens = verbatim().tokenize("type(time_integrator_t) :: ti");
        assert_eq!(tokens, vec!["type", "time_integrator_t", "ti"]);
    }

    #[test]
    fn removes_default_stopwords() {
        let tokenizer = Tokenizer::new(TokenizerPolicy::default()).unwrap();
        let tokens = tokenizer.tokenize("the mesh of the domain");
        assert_eq!(tokens, vec!["mesh", "domain"]);
    }

    #[test]
    fn allow_list_overrides_defaults() {
        let config = TokenizerConfig {
            stemmer: NO_STEMMER.to_string(),
            allow: vec!["The".to_string()],
            ..TokenizerConfig::default()
        };
        let tokenizer = Tokenizer::from_config(&config).unwrap();
        assert_eq!(tokenizer.tokenize("the mesh"), vec!["the", "mesh"]);
    }

    #[test]
    fn extra_stopwords_are_lowercased() {
        let config = TokenizerConfig {
            stemmer: NO_STEMMER.to_string(),
            use_default_stopwords: false,
            stopwords: vec!["ChiDG".to_string()],
            ..TokenizerConfig::default()
        };
        let policy = TokenizerPolicy::from_config(&config);
        assert_eq!(policy.stopwords, vec!["chidg"]);
        let tokenizer = Tokenizer::new(policy).unwrap();
        assert_eq!(tokenizer.tokenize("ChiDG the solver"), vec!["the", "solver"]);
    }

    #[test]
    fn english_stemmer_folds_inflections() {
        let tokenizer = Tokenizer::new(TokenizerPolicy::default()).unwrap();
        assert_eq!(tokenizer.tokenize("running"), vec!["run"]);
        assert_eq!(tokenizer.tokenize("connections"), vec!["connect"]);
    }

    #[test]
    fn drops_overlong_tokens() {
        let policy = TokenizerPolicy {
            max_token_len: 5,
            ..TokenizerPolicy::verbatim()
        };
        let tokenizer = Tokenizer::new(policy).unwrap();
        assert_eq!(tokenizer.tokenize("mesh elements"), vec!["mesh"]);
    }

    #[test]
    fn normalizes_compatibility_characters() {
        // U+FB01 LATIN SMALL LIGATURE FI
        assert_eq!(verbatim().tokenize("\u{FB01}nite"), vec!["finite"]);
    }

    #[test]
    fn rejects_unknown_stemmer() {
        let policy = TokenizerPolicy {
            stemmer: "klingon".to_string(),
            ..TokenizerPolicy::verbatim()
        };
        assert!(matches!(Tokenizer::new(policy), Err(DsError::Config(_))));
    }

    #[test]
    fn equality_follows_policy() {
        assert_eq!(verbatim(), verbatim());
        assert_ne!(verbatim(), Tokenizer::new(TokenizerPolicy::default()).unwrap());
    }
}
