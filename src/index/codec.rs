//! Persisted wire format.
//!
//! The index is stored as a single JSON object with sorted keys:
//!
//! ```text
//! { envversion, filenames, leadterms?, objects, objnames, objtypes,
//!   terms, titles, titleterms, tokenizer? }
//! ```
//!
//! Each (term, document) pair lands in exactly one of `terms` (lead and body
//! tiers) or `titleterms`. `leadterms` repeats the lead-tier subset of
//! `terms` so the tier survives a round trip. A posting list with one entry
//! is written as a bare integer.
//!
//! The decoder also accepts the `Search.setIndex(...)` JavaScript wrapper and
//! object literals with unquoted keys, as emitted by static site generators.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::objects::{ObjectEntry, ObjectPriority, ObjectRole, ObjectTable, ObjectType};
use super::registry::{Document, DocumentRegistry};
use super::terms::{RelevanceTier, TermTableBuilder};
use super::titles::TitleMap;
use super::tokenizer::{Tokenizer, TokenizerPolicy};
use super::{DocId, SearchIndex};
use crate::error::{DsError, Result};

const JS_PREFIX: &str = "Search.setIndex(";
const JS_SUFFIX: &str = ")";

/// A posting list, collapsed to a bare id when it has exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePostings {
    One(DocId),
    Many(Vec<DocId>),
}

impl WirePostings {
    #[must_use]
    pub fn into_vec(self) -> Vec<DocId> {
        match self {
            Self::One(doc) => vec![doc],
            Self::Many(docs) => docs,
        }
    }
}

impl From<Vec<DocId>> for WirePostings {
    fn from(mut docs: Vec<DocId>) -> Self {
        if docs.len() == 1 {
            Self::One(docs.remove(0))
        } else {
            Self::Many(docs)
        }
    }
}

/// `[doc, type index, priority, anchor]`
type WireObject = (DocId, u32, i8, String);

/// `[domain, role, label]`
type WireObjName = (String, String, String);

#[derive(Debug, Serialize, Deserialize)]
struct WireIndex {
    envversion: u32,
    filenames: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    leadterms: BTreeMap<String, WirePostings>,
    #[serde(default)]
    objects: BTreeMap<String, BTreeMap<String, WireObject>>,
    #[serde(default)]
    objnames: BTreeMap<u32, WireObjName>,
    #[serde(default)]
    objtypes: BTreeMap<u32, String>,
    #[serde(default)]
    terms: BTreeMap<String, WirePostings>,
    #[serde(default)]
    titles: Vec<String>,
    #[serde(default)]
    titleterms: BTreeMap<String, WirePostings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tokenizer: Option<TokenizerPolicy>,
}

/// Serialize to compact JSON.
pub fn encode(index: &SearchIndex) -> Result<String> {
    Ok(serde_json::to_string(&to_wire(index))?)
}

/// Serialize wrapped in `Search.setIndex(...)`.
pub fn encode_js(index: &SearchIndex) -> Result<String> {
    Ok(format!("{JS_PREFIX}{}{JS_SUFFIX}", encode(index)?))
}

fn to_wire(index: &SearchIndex) -> WireIndex {
    let mut terms: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
    let mut leadterms: BTreeMap<String, Vec<DocId>> = BTreeMap::new();
    let mut titleterms: BTreeMap<String, Vec<DocId>> = BTreeMap::new();

    for (term, postings) in index.terms.iter() {
        for posting in postings {
            let target = match posting.tier {
                RelevanceTier::Title => &mut titleterms,
                RelevanceTier::Lead => {
                    leadterms.entry(term.to_string()).or_default().push(posting.doc);
                    &mut terms
                }
                RelevanceTier::Body => &mut terms,
            };
            target.entry(term.to_string()).or_default().push(posting.doc);
        }
    }
    let collapse = |map: BTreeMap<String, Vec<DocId>>| {
        map.into_iter()
            .map(|(term, docs)| (term, WirePostings::from(docs)))
            .collect::<BTreeMap<_, _>>()
    };

    let mut objects: BTreeMap<String, BTreeMap<String, WireObject>> = BTreeMap::new();
    for entry in index.objects.iter() {
        objects.entry(entry.prefix.clone()).or_default().insert(
            entry.name.clone(),
            (
                entry.doc,
                entry.type_index,
                entry.priority.as_i8(),
                entry.anchor.clone(),
            ),
        );
    }

    let mut objnames = BTreeMap::new();
    let mut objtypes = BTreeMap::new();
    for (idx, ty) in (0..).zip(index.objects.types()) {
        objnames.insert(
            idx,
            (ty.domain.clone(), ty.role.to_string(), ty.label.clone()),
        );
        objtypes.insert(idx, ty.tag());
    }

    WireIndex {
        envversion: index.env_version,
        filenames: index.registry.paths().map(str::to_string).collect(),
        leadterms: collapse(leadterms),
        objects,
        objnames,
        objtypes,
        terms: collapse(terms),
        titles: index.registry.titles().map(str::to_string).collect(),
        titleterms: collapse(titleterms),
        tokenizer: Some(index.tokenizer.policy().clone()),
    }
}

/// Decode and validate a persisted index.
///
/// `fallback` tokenizes queries when the index does not carry its own
/// tokenizer policy. An index with any other `envversion` than
/// `expected_version` is rejected with [`DsError::VersionMismatch`].
pub fn decode(text: &str, expected_version: u32, fallback: &Tokenizer) -> Result<SearchIndex> {
    let body = strip_js_wrapper(text);
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(first) => {
            tracing::debug!(error = %first, "not strict JSON; retrying with quoted keys");
            serde_json::from_str(&quote_bare_keys(body))?
        }
    };

    let found = value
        .get("envversion")
        .and_then(Value::as_u64)
        .ok_or_else(|| DsError::Format("missing or non-integer envversion".to_string()))?;
    let found = u32::try_from(found)
        .map_err(|_| DsError::Format(format!("envversion {found} out of range")))?;
    if found != expected_version {
        return Err(DsError::VersionMismatch {
            expected: expected_version,
            found,
        });
    }

    let wire: WireIndex = serde_json::from_value(value)?;
    from_wire(wire, fallback)
}

fn from_wire(wire: WireIndex, fallback: &Tokenizer) -> Result<SearchIndex> {
    if wire.titles.len() != wire.filenames.len() {
        return Err(DsError::Format(format!(
            "{} titles for {} filenames",
            wire.titles.len(),
            wire.filenames.len()
        )));
    }

    let registry = DocumentRegistry::new(
        wire.filenames
            .into_iter()
            .zip(wire.titles)
            .map(|(path, title)| Document { path, title })
            .collect(),
    )?;
    let titles = TitleMap::from_registry(&registry)?;

    let mut terms = TermTableBuilder::new();
    for (tier, table) in [
        (RelevanceTier::Body, wire.terms),
        (RelevanceTier::Lead, wire.leadterms),
        (RelevanceTier::Title, wire.titleterms),
    ] {
        for (term, postings) in table {
            for doc in postings.into_vec() {
                registry.check(&term, doc)?;
                terms.add(term.clone(), doc, tier);
            }
        }
    }

    let types = decode_types(&wire.objnames, &wire.objtypes)?;
    let mut entries: BTreeMap<String, BTreeMap<String, ObjectEntry>> = BTreeMap::new();
    for (prefix, names) in wire.objects {
        for (name, (doc, type_index, priority, anchor)) in names {
            let entry = ObjectEntry {
                prefix: prefix.clone(),
                name,
                doc,
                type_index,
                priority: ObjectPriority::from_i8(priority).ok_or_else(|| {
                    DsError::Format(format!("unknown object priority {priority}"))
                })?,
                anchor,
            };
            registry.check(&entry.full_name(), doc)?;
            if type_index as usize >= types.len() {
                return Err(DsError::Format(format!(
                    "object {} uses type {type_index}, but only {} types are declared",
                    entry.full_name(),
                    types.len()
                )));
            }
            entries
                .entry(prefix.clone())
                .or_default()
                .insert(entry.name.clone(), entry);
        }
    }

    let tokenizer = match wire.tokenizer {
        Some(policy) => Tokenizer::new(policy)?,
        None => fallback.clone(),
    };

    Ok(SearchIndex {
        env_version: wire.envversion,
        registry,
        titles,
        objects: ObjectTable::from_parts(types, entries),
        terms: terms.build(),
        tokenizer,
    })
}

fn decode_types(
    objnames: &BTreeMap<u32, WireObjName>,
    objtypes: &BTreeMap<u32, String>,
) -> Result<Vec<ObjectType>> {
    if objnames.len() != objtypes.len() {
        return Err(DsError::Format(format!(
            "{} objnames for {} objtypes",
            objnames.len(),
            objtypes.len()
        )));
    }

    let mut types = Vec::with_capacity(objnames.len());
    for (expected, ((idx, (domain, role, label)), (type_idx, tag))) in
        (0u32..).zip(objnames.iter().zip(objtypes))
    {
        if *idx != expected || *type_idx != expected {
            return Err(DsError::Format(format!(
                "object type indexes must be dense from 0; found {idx}"
            )));
        }
        let role: ObjectRole = role.parse()?;
        let ty = ObjectType {
            domain: domain.clone(),
            role,
            label: label.clone(),
        };
        if ty.tag() != *tag {
            return Err(DsError::Format(format!(
                "objtypes[{idx}] is '{tag}' but objnames[{idx}] describes '{}'",
                ty.tag()
            )));
        }
        types.push(ty);
    }
    Ok(types)
}

fn strip_js_wrapper(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix(JS_PREFIX) else {
        return trimmed;
    };
    let inner = inner.trim_end();
    let inner = inner.strip_suffix(';').unwrap_or(inner).trim_end();
    inner.strip_suffix(JS_SUFFIX).unwrap_or(inner).trim()
}

/// Quote object keys written as bare identifiers (`{envversion:49}`).
fn quote_bare_keys(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    let mut in_string = false;
    let mut escaped = false;
    let mut last_significant = ' ';
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
                last_significant = c;
            }
            i += 1;
            continue;
        }

        if c == '"' {
            in_string = true;
            out.push(c);
            i += 1;
            continue;
        }

        if is_key_char(c) && matches!(last_significant, '{' | ',') {
            let start = i;
            while i < chars.len() && is_key_char(chars[i]) {
                i += 1;
            }
            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let token: String = chars[start..i].iter().collect();
            if chars.get(j) == Some(&':') {
                out.push('"');
                out.push_str(&token);
                out.push('"');
            } else {
                out.push_str(&token);
            }
            last_significant = 'x';
            continue;
        }

        if !c.is_whitespace() {
            last_significant = c;
        }
        out.push(c);
        i += 1;
    }
    out
}

const fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::IndexBuilder;
    use crate::index::corpus::{Corpus, CorpusDocument, ObjectSpec};
    use crate::index::terms::Posting;

    fn verbatim() -> Tokenizer {
        Tokenizer::new(TokenizerPolicy::verbatim()).unwrap()
    }

    fn sample() -> SearchIndex {
        let corpus = Corpus::new(vec![
            CorpusDocument::new("index", "Welcome to ChiDG").with_lead("Solver overview"),
            CorpusDocument::new("solvers", "Solvers").with_body("Newton solver"),
        ])
        .with_object(1, ObjectSpec::new("chidg.dot", ObjectRole::Function));
        IndexBuilder::new(verbatim(), 49).build(&corpus).unwrap()
    }

    #[test]
    fn singleton_postings_are_collapsed() {
        let json = encode(&sample()).unwrap();
        assert!(json.contains(r#""newton":1"#), "{json}");
        assert!(json.contains(r#""solver":[0,1]"#), "{json}");
    }

    #[test]
    fn title_and_text_tiers_are_disjoint() {
        let json = encode(&sample()).unwrap();
        let value: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["titleterms"]["solvers"], 1);
        assert!(value["terms"].get("solvers").is_none());
        assert_eq!(value["leadterms"]["overview"], 0);
    }

    #[test]
    fn keys_are_sorted() {
        let json = encode(&sample()).unwrap();
        let order = [
            "envversion", "filenames", "leadterms", "objects", "objnames", "objtypes", "terms",
            "titles", "titleterms", "tokenizer",
        ];
        let positions: Vec<_> = order
            .iter()
            .map(|k| json.find(&format!("\"{k}\":")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn round_trip_preserves_index() {
        let index = sample();
        let decoded = decode(&encode_js(&index).unwrap(), 49, &verbatim()).unwrap();
        assert_eq!(decoded, index);
    }

    #[test]
    fn version_mismatch_is_reported_before_structure() {
        let err = decode(r#"{"envversion":48,"filenames":"garbage"}"#, 49, &verbatim()).unwrap_err();
        assert!(matches!(err, DsError::VersionMismatch { expected: 49, found: 48 }));
    }

    #[test]
    fn accepts_unquoted_keys_and_empty_lists() {
        let text = r#"Search.setIndex({envversion:49,filenames:["a","b"],objects:{},objnames:{},objtypes:{},terms:{"long":[],mesh:[0,1],"3x3":1},titles:["A","B: x"],titleterms:{a:0}});"#;
        let index = decode(text, 49, &verbatim()).unwrap();
        assert!(!index.terms().contains("long"));
        assert_eq!(index.terms().get("3x3").unwrap(), &[Posting::new(1, RelevanceTier::Body)]);
        assert_eq!(index.terms().get("a").unwrap()[0].tier, RelevanceTier::Title);
        assert_eq!(index.documents().get(1).unwrap().title, "B: x");
    }

    #[test]
    fn rejects_dangling_postings() {
        let text = r#"{"envversion":49,"filenames":["a"],"titles":["A"],"terms":{"mesh":[0,5]}}"#;
        let err = decode(text, 49, &verbatim()).unwrap_err();
        assert!(matches!(err, DsError::ReferentialIntegrity { doc_id: 5, .. }));
    }

    #[test]
    fn rejects_title_count_mismatch() {
        let text = r#"{"envversion":49,"filenames":["a","b"],"titles":["A"]}"#;
        assert!(matches!(
            decode(text, 49, &verbatim()),
            Err(DsError::Format(_))
        ));
    }

    #[test]
    fn rejects_inconsistent_object_types() {
        let text = r#"{"envversion":49,"filenames":["a"],"titles":["A"],
            "objnames":{"0":["py","function","Python function"]},
            "objtypes":{"0":"py:class"}}"#;
        assert!(matches!(
            decode(text, 49, &verbatim()),
            Err(DsError::Format(_))
        ));
    }

    #[test]
    fn quoting_leaves_strings_and_values_alone() {
        let quoted = quote_bare_keys(r#"{a:"x,b:y",c:[1,true],d:{e:null}}"#);
        assert_eq!(quoted, r#"{"a":"x,b:y","c":[1,true],"d":{"e":null}}"#);
    }
}
