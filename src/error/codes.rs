//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Build errors (corpus and referential integrity)
//! - 2xx: Index errors (persisted index state)
//! - 3xx: Config errors
//! - 4xx: Search errors (query and resolver)
//! - 6xx: Storage errors
//! - 9xx: Internal errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for machine output.
///
/// Each variant maps to a numeric code (e.g., `EmptyQuery` -> E401).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Build errors (1xx)
    // ========================================
    /// E101: Corpus file or directory could not be interpreted
    CorpusInvalid,
    /// E102: An object or title references a document that does not exist
    ReferentialIntegrity,
    /// E103: Two documents share the same path
    DuplicateDocument,
    /// E104: A title key cannot be placed in the navigation hierarchy
    InvalidTitleKey,

    // ========================================
    // Index errors (2xx)
    // ========================================
    /// E201: Index envversion differs from the one this consumer expects
    IndexVersionMismatch,
    /// E202: Index file is malformed or internally inconsistent
    IndexCorrupted,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Search errors (4xx)
    // ========================================
    /// E401: Query tokenized to zero terms
    EmptyQuery,
    /// E402: Document id or object name is not in the index
    NotFound,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E601: File operation failed
    IoError,
    /// E602: JSON/YAML encoding or decoding failed
    SerializationError,

    // ========================================
    // Internal errors (9xx)
    // ========================================
    /// E901: Tokenizer pipeline could not be constructed
    TokenizerFailed,
}

impl ErrorCode {
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::CorpusInvalid => 101,
            Self::ReferentialIntegrity => 102,
            Self::DuplicateDocument => 103,
            Self::InvalidTitleKey => 104,

            Self::IndexVersionMismatch => 201,
            Self::IndexCorrupted => 202,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::EmptyQuery => 401,
            Self::NotFound => 402,

            Self::IoError => 601,
            Self::SerializationError => 602,

            Self::TokenizerFailed => 901,
        }
    }

    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::CorpusInvalid => "Check the corpus file syntax (JSON or YAML) or point `docsearch build` at a directory of text files",
            Self::ReferentialIntegrity => "Fix the object declaration so it names an existing document, then rebuild the whole index",
            Self::DuplicateDocument => "Each document path must be unique. Rename or drop the duplicate and rebuild",
            Self::InvalidTitleKey => "Title keys must be non-empty '/'-separated paths without empty, '.' or '..' segments",

            Self::IndexVersionMismatch => "Rebuild the index with `docsearch build`, or pass --corpus so it is rebuilt automatically",
            Self::IndexCorrupted => "Regenerate the index file with `docsearch build`",

            Self::ConfigInvalid => "Check TOML syntax in the config file and DOCSEARCH_* environment variables",
            Self::ConfigMissingRequired => "Set the required value in docsearch.toml or pass --config <path>",

            Self::EmptyQuery => "Enter at least one word that is not a stopword",
            Self::NotFound => "Run `docsearch inspect <index>` to list documents and objects",

            Self::IoError => "File operation failed. Check path exists and permissions are correct",
            Self::SerializationError => "The data format may be corrupted. Check input data for validity",

            Self::TokenizerFailed => "Check the [tokenizer] section of the config (stemmer language, token limits)",
        }
    }

    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::CorpusInvalid
            | Self::ReferentialIntegrity
            | Self::DuplicateDocument
            | Self::InvalidTitleKey
            | Self::IndexVersionMismatch
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::EmptyQuery
            | Self::NotFound
            | Self::IoError => true,

            Self::IndexCorrupted | Self::SerializationError | Self::TokenizerFailed => false,
        }
    }

    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "build",
            2 => "index",
            3 => "config",
            4 => "search",
            6 => "storage",
            9 => "internal",
            _ => "unknown",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::CorpusInvalid,
            Self::ReferentialIntegrity,
            Self::DuplicateDocument,
            Self::InvalidTitleKey,
            Self::IndexVersionMismatch,
            Self::IndexCorrupted,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::EmptyQuery,
            Self::NotFound,
            Self::IoError,
            Self::SerializationError,
            Self::TokenizerFailed,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
