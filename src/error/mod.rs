//! Error handling for docsearch.
//!
//! This module provides:
//! - [`DsError`]: The main error enum for all docsearch operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context
//!
//! Build-time integrity errors are fatal: the caller discards the build and
//! retries from a corrected corpus. Query-time errors (`EmptyQuery`,
//! `NotFound`, `VersionMismatch`) are surfaced as typed results that callers
//! degrade to an empty-result UI.

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for docsearch operations.
#[derive(Error, Debug)]
pub enum DsError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] tantivy::TantivyError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),

    #[error("Invalid corpus: {0}")]
    InvalidCorpus(String),

    #[error(
        "Referential integrity violation: '{key}' references document {doc_id}, but the registry has {doc_count} documents"
    )]
    ReferentialIntegrity {
        key: String,
        doc_id: u32,
        doc_count: usize,
    },

    #[error("Duplicate document path: {0}")]
    DuplicateDocument(String),

    #[error("Invalid title key '{key}': {reason}")]
    InvalidTitleKey { key: String, reason: String },

    #[error("Index version mismatch: expected envversion {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Malformed search index: {0}")]
    Format(String),

    #[error("Query contains no searchable terms")]
    EmptyQuery,

    #[error("Not found: {0}")]
    NotFound(String),
}

impl DsError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::Yaml(_) => ErrorCode::SerializationError,
            Self::Toml(_) => ErrorCode::ConfigInvalid,
            Self::Tokenizer(_) => ErrorCode::TokenizerFailed,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
            Self::InvalidCorpus(_) => ErrorCode::CorpusInvalid,
            Self::ReferentialIntegrity { .. } => ErrorCode::ReferentialIntegrity,
            Self::DuplicateDocument(_) => ErrorCode::DuplicateDocument,
            Self::InvalidTitleKey { .. } => ErrorCode::InvalidTitleKey,
            Self::VersionMismatch { .. } => ErrorCode::IndexVersionMismatch,
            Self::Format(_) => ErrorCode::IndexCorrupted,
            Self::EmptyQuery => ErrorCode::EmptyQuery,
            Self::NotFound(_) => ErrorCode::NotFound,
        }
    }

    /// Whether the error aborts an index build.
    ///
    /// Query-time errors are never fatal.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidCorpus(_)
                | Self::ReferentialIntegrity { .. }
                | Self::DuplicateDocument(_)
                | Self::InvalidTitleKey { .. }
        )
    }

    /// Whether the consumer should rebuild the index and retry.
    #[must_use]
    pub const fn requires_rebuild(&self) -> bool {
        matches!(self, Self::VersionMismatch { .. })
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::ReferentialIntegrity {
                key,
                doc_id,
                doc_count,
            } => Some(serde_json::json!({
                "key": key,
                "doc_id": doc_id,
                "doc_count": doc_count,
            })),
            Self::VersionMismatch { expected, found } => {
                Some(serde_json::json!({ "expected": expected, "found": found }))
            }
            Self::DuplicateDocument(path) => Some(serde_json::json!({ "path": path })),
            Self::InvalidTitleKey { key, reason } => {
                Some(serde_json::json!({ "key": key, "reason": reason }))
            }
            Self::NotFound(what) => Some(serde_json::json!({ "identifier": what })),
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_ds_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
///
/// Emitted in machine output mode so scripts can branch on the code
/// instead of parsing messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "EMPTY_QUERY")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 401)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "build", "index", "search")
    pub category: String,
}

impl StructuredError {
    /// Create a new structured error.
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    /// Create a structured error from a `DsError`.
    #[must_use]
    pub fn from_ds_error(err: &DsError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self.suggestion = suggest_for_error(self.code, self.context.as_ref());
        self
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&DsError> for StructuredError {
    fn from(err: &DsError) -> Self {
        Self::from_ds_error(err)
    }
}

/// Result type alias using `DsError`.
pub type Result<T> = std::result::Result<T, DsError>;
