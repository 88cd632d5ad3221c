//! Context-aware error suggestions.
//!
//! Complements the static suggestions in the `codes` module with hints that
//! name the offending key, document id or version.

use serde_json::Value;

use super::codes::ErrorCode;

/// Generate a context-aware suggestion for an error.
pub fn suggest_for_error(code: ErrorCode, context: Option<&Value>) -> String {
    match code {
        ErrorCode::ReferentialIntegrity => suggest_referential_integrity(context),
        ErrorCode::IndexVersionMismatch => suggest_version_mismatch(context),
        ErrorCode::DuplicateDocument => suggest_duplicate_document(context),
        _ => code.suggestion().to_string(),
    }
}

fn suggest_referential_integrity(context: Option<&Value>) -> String {
    let key = context.and_then(|c| c.get("key")).and_then(Value::as_str);
    let doc_id = context.and_then(|c| c.get("doc_id")).and_then(Value::as_u64);
    let doc_count = context
        .and_then(|c| c.get("doc_count"))
        .and_then(Value::as_u64);

    match (key, doc_id, doc_count) {
        (Some(key), Some(doc_id), Some(0)) => format!(
            "'{key}' points at document {doc_id} but the corpus has no documents. Add documents before declaring objects"
        ),
        (Some(key), Some(doc_id), Some(count)) => format!(
            "'{key}' points at document {doc_id}; valid ids are 0..={}. Fix the declaration and rebuild",
            count - 1
        ),
        _ => ErrorCode::ReferentialIntegrity.suggestion().to_string(),
    }
}

fn suggest_version_mismatch(context: Option<&Value>) -> String {
    let expected = context.and_then(|c| c.get("expected")).and_then(Value::as_u64);
    let found = context.and_then(|c| c.get("found")).and_then(Value::as_u64);

    match (expected, found) {
        (Some(expected), Some(found)) => format!(
            "Index was built with envversion {found} but {expected} is expected. Rebuild with `docsearch build`, or set index.env_version = {found} to read it as-is"
        ),
        _ => ErrorCode::IndexVersionMismatch.suggestion().to_string(),
    }
}

fn suggest_duplicate_document(context: Option<&Value>) -> String {
    context
        .and_then(|c| c.get("path"))
        .and_then(Value::as_str)
        .map_or_else(
            || ErrorCode::DuplicateDocument.suggestion().to_string(),
            |path| format!("Document path '{path}' appears more than once in the corpus. Keep one entry and rebuild"),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn referential_integrity_names_valid_range() {
        let ctx = serde_json::json!({ "key": "dot", "doc_id": 99, "doc_count": 2 });
        let suggestion = suggest_for_error(ErrorCode::ReferentialIntegrity, Some(&ctx));
        assert!(suggestion.contains("'dot'"));
        assert!(suggestion.contains("0..=1"));
    }

    #[test]
    fn referential_integrity_empty_corpus() {
        let ctx = serde_json::json!({ "key": "dot", "doc_id": 0, "doc_count": 0 });
        let suggestion = suggest_for_error(ErrorCode::ReferentialIntegrity, Some(&ctx));
        assert!(suggestion.contains("no documents"));
    }

    #[test]
    fn version_mismatch_mentions_both_versions() {
        let ctx = serde_json::json!({ "expected": 49, "found": 48 });
        let suggestion = suggest_for_error(ErrorCode::IndexVersionMismatch, Some(&ctx));
        assert!(suggestion.contains("48"));
        assert!(suggestion.contains("49"));
    }

    #[test]
    fn falls_back_to_static_suggestion() {
        let suggestion = suggest_for_error(ErrorCode::EmptyQuery, None);
        assert_eq!(suggestion, ErrorCode::EmptyQuery.suggestion());
    }
}
