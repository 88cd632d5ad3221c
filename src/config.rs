use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DsError, Result};
use crate::search::CombineMode;

/// Project-level config file name, looked up in the project root.
pub const PROJECT_CONFIG_FILE: &str = "docsearch.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub tokenizer: TokenizerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub build: BuildConfig,
}

impl Config {
    /// Layered load: defaults, then the global and project files (or only the
    /// explicit file when one is given), then `DOCSEARCH_*` overrides.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("DOCSEARCH_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            match Self::load_patch(&path)? {
                Some(patch) => config.merge_patch(patch),
                None => {
                    return Err(DsError::MissingConfig(format!(
                        "config file {} does not exist",
                        path.display()
                    )));
                }
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        let Some(dir) = dirs::config_dir() else {
            tracing::debug!("no platform config directory; skipping global config");
            return Ok(None);
        };
        Self::load_patch(&dir.join("docsearch/config.toml"))
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&project_root.join(PROJECT_CONFIG_FILE))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| DsError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| DsError::Config(format!("parse config {}: {err}", path.display())))?;
        tracing::debug!(path = %path.display(), "loaded config layer");
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.index {
            self.index.merge(patch);
        }
        if let Some(patch) = patch.tokenizer {
            self.tokenizer.merge(patch);
        }
        if let Some(patch) = patch.search {
            self.search.merge(patch);
        }
        if let Some(patch) = patch.build {
            self.build.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_u32("DOCSEARCH_ENV_VERSION")? {
            self.index.env_version = value;
        }
        if let Some(value) = env_string("DOCSEARCH_OUTPUT") {
            self.index.output = PathBuf::from(value);
        }
        if let Some(value) = env_bool("DOCSEARCH_WRAP_JS") {
            self.index.wrap_js = value;
        }
        if let Some(value) = env_string("DOCSEARCH_LINK_SUFFIX") {
            self.index.link_suffix = value;
        }

        if let Some(value) = env_string("DOCSEARCH_STEMMER") {
            self.tokenizer.stemmer = value;
        }
        if let Some(values) = env_list("DOCSEARCH_STOPWORDS")? {
            self.tokenizer.stopwords = merge_unique(values, &self.tokenizer.stopwords);
        }
        if let Some(values) = env_list("DOCSEARCH_ALLOW_WORDS")? {
            self.tokenizer.allow = merge_unique(values, &self.tokenizer.allow);
        }

        if let Some(value) = env_string("DOCSEARCH_SEARCH_MODE") {
            self.search.mode = parse_mode(&value)?;
        }
        if let Some(value) = env_bool("DOCSEARCH_PARTIAL") {
            self.search.partial_matching = value;
        }
        if let Some(value) = env_u32("DOCSEARCH_LIMIT")? {
            self.search.limit = value as usize;
        }
        if let Some(value) = env_u32("DOCSEARCH_MIN_SCORE")? {
            self.search.min_score = Some(value);
        }

        if let Some(value) = env_bool("DOCSEARCH_PARALLEL") {
            self.build.parallel = value;
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.tokenizer.max_token_len == 0 {
            return Err(DsError::Config(
                "tokenizer.max_token_len must be greater than zero".to_string(),
            ));
        }
        if self.build.extensions.is_empty() {
            return Err(DsError::Config(
                "build.extensions must name at least one file extension".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Environment version stamped into built indexes and required on load
    #[serde(default = "default_env_version")]
    pub env_version: u32,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Wrap the serialized index in `Search.setIndex(...)`
    #[serde(default = "default_true")]
    pub wrap_js: bool,
    /// Appended to document paths when building links
    #[serde(default = "default_link_suffix")]
    pub link_suffix: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            env_version: default_env_version(),
            output: default_output(),
            wrap_js: true,
            link_suffix: default_link_suffix(),
        }
    }
}

impl IndexConfig {
    fn merge(&mut self, patch: IndexPatch) {
        if let Some(value) = patch.env_version {
            self.env_version = value;
        }
        if let Some(value) = patch.output {
            self.output = value;
        }
        if let Some(value) = patch.wrap_js {
            self.wrap_js = value;
        }
        if let Some(value) = patch.link_suffix {
            self.link_suffix = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerConfig {
    /// Snowball language (`english`, `french`, ...) or `none`
    #[serde(default = "default_stemmer")]
    pub stemmer: String,
    #[serde(default = "default_true")]
    pub use_default_stopwords: bool,
    /// Extra stopwords on top of the defaults
    #[serde(default)]
    pub stopwords: Vec<String>,
    /// Words that are never treated as stopwords
    #[serde(default)]
    pub allow: Vec<String>,
    #[serde(default = "default_max_token_len")]
    pub max_token_len: usize,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            stemmer: default_stemmer(),
            use_default_stopwords: true,
            stopwords: Vec::new(),
            allow: Vec::new(),
            max_token_len: default_max_token_len(),
        }
    }
}

impl TokenizerConfig {
    fn merge(&mut self, patch: TokenizerPatch) {
        if let Some(value) = patch.stemmer {
            self.stemmer = value;
        }
        if let Some(value) = patch.use_default_stopwords {
            self.use_default_stopwords = value;
        }
        if let Some(values) = patch.stopwords {
            self.stopwords = values;
        }
        if let Some(values) = patch.allow {
            self.allow = values;
        }
        if let Some(value) = patch.max_token_len {
            self.max_token_len = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: CombineMode,
    #[serde(default = "default_title_weight")]
    pub title_weight: u32,
    #[serde(default = "default_lead_weight")]
    pub lead_weight: u32,
    #[serde(default = "default_body_weight")]
    pub body_weight: u32,
    #[serde(default)]
    pub partial_matching: bool,
    #[serde(default = "default_partial_title_weight")]
    pub partial_title_weight: u32,
    #[serde(default = "default_partial_lead_weight")]
    pub partial_lead_weight: u32,
    #[serde(default = "default_partial_body_weight")]
    pub partial_body_weight: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Drop results scoring below this
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<u32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: CombineMode::default(),
            title_weight: default_title_weight(),
            lead_weight: default_lead_weight(),
            body_weight: default_body_weight(),
            partial_matching: false,
            partial_title_weight: default_partial_title_weight(),
            partial_lead_weight: default_partial_lead_weight(),
            partial_body_weight: default_partial_body_weight(),
            limit: default_limit(),
            min_score: None,
        }
    }
}

impl SearchConfig {
    fn merge(&mut self, patch: SearchPatch) {
        if let Some(value) = patch.mode {
            self.mode = value;
        }
        if let Some(value) = patch.title_weight {
            self.title_weight = value;
        }
        if let Some(value) = patch.lead_weight {
            self.lead_weight = value;
        }
        if let Some(value) = patch.body_weight {
            self.body_weight = value;
        }
        if let Some(value) = patch.partial_matching {
            self.partial_matching = value;
        }
        if let Some(value) = patch.partial_title_weight {
            self.partial_title_weight = value;
        }
        if let Some(value) = patch.partial_lead_weight {
            self.partial_lead_weight = value;
        }
        if let Some(value) = patch.partial_body_weight {
            self.partial_body_weight = value;
        }
        if let Some(value) = patch.limit {
            self.limit = value;
        }
        if let Some(value) = patch.min_score {
            self.min_score = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Extract per-document terms on the rayon pool
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// File extensions picked up when scanning a corpus directory
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            extensions: default_extensions(),
        }
    }
}

impl BuildConfig {
    fn merge(&mut self, patch: BuildPatch) {
        if let Some(value) = patch.parallel {
            self.parallel = value;
        }
        if let Some(values) = patch.extensions {
            self.extensions = values;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub index: Option<IndexPatch>,
    pub tokenizer: Option<TokenizerPatch>,
    pub search: Option<SearchPatch>,
    pub build: Option<BuildPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct IndexPatch {
    pub env_version: Option<u32>,
    pub output: Option<PathBuf>,
    pub wrap_js: Option<bool>,
    pub link_suffix: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct TokenizerPatch {
    pub stemmer: Option<String>,
    pub use_default_stopwords: Option<bool>,
    pub stopwords: Option<Vec<String>>,
    pub allow: Option<Vec<String>>,
    pub max_token_len: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SearchPatch {
    pub mode: Option<CombineMode>,
    pub title_weight: Option<u32>,
    pub lead_weight: Option<u32>,
    pub body_weight: Option<u32>,
    pub partial_matching: Option<bool>,
    pub partial_title_weight: Option<u32>,
    pub partial_lead_weight: Option<u32>,
    pub partial_body_weight: Option<u32>,
    pub limit: Option<usize>,
    pub min_score: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct BuildPatch {
    pub parallel: Option<bool>,
    pub extensions: Option<Vec<String>>,
}

const fn default_true() -> bool {
    true
}

const fn default_env_version() -> u32 {
    49
}

fn default_output() -> PathBuf {
    PathBuf::from("searchindex.js")
}

fn default_link_suffix() -> String {
    ".html".to_string()
}

fn default_stemmer() -> String {
    "english".to_string()
}

const fn default_max_token_len() -> usize {
    40
}

const fn default_title_weight() -> u32 {
    15
}

const fn default_lead_weight() -> u32 {
    10
}

const fn default_body_weight() -> u32 {
    5
}

const fn default_partial_title_weight() -> u32 {
    7
}

const fn default_partial_lead_weight() -> u32 {
    4
}

const fn default_partial_body_weight() -> u32 {
    2
}

const fn default_limit() -> usize {
    50
}

fn default_extensions() -> Vec<String> {
    vec!["md".to_string(), "rst".to_string(), "txt".to_string()]
}

fn merge_unique(values: Vec<String>, existing: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for value in values.into_iter().chain(existing.iter().cloned()) {
        if seen.insert(value.clone()) {
            out.push(value);
        }
    }
    out
}

fn parse_mode(value: &str) -> Result<CombineMode> {
    match value.to_lowercase().as_str() {
        "and" => Ok(CombineMode::And),
        "or" => Ok(CombineMode::Or),
        _ => Err(DsError::Config(format!(
            "invalid search mode {value} (expected and|or)"
        ))),
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u32(key: &str) -> Result<Option<u32>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u32>().map(Some).map_err(|err| {
            DsError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}

fn env_list(key: &str) -> Result<Option<Vec<String>>> {
    match std::env::var(key) {
        Ok(value) => {
            let list = value
                .split(',')
                .map(str::trim)
                .filter(|entry| !entry.is_empty())
                .map(ToString::to_string)
                .collect::<Vec<_>>();
            Ok(Some(list))
        }
        Err(_) => Ok(None),
    }
}
