use proptest::prelude::*;
use serde_json::Value;

use docsearch::error::DsError;
use docsearch::index::{
    Corpus, CorpusDocument, IndexBuilder, ObjectRole, ObjectSpec, Tokenizer, TokenizerPolicy,
    codec,
};

const VOCAB: &[&str] = &[
    "mesh", "solver", "newton", "chimera", "domain", "element", "boundary", "flux", "matrix",
    "vector", "jacobian", "residual", "galerkin", "parallel", "partition",
];

fn builder() -> IndexBuilder {
    IndexBuilder::new(Tokenizer::new(TokenizerPolicy::verbatim()).unwrap(), 49)
}

fn arb_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCAB), 0..max).prop_map(|words| words.join(" "))
}

fn arb_role() -> impl Strategy<Value = ObjectRole> {
    prop::sample::select(ObjectRole::ALL.to_vec())
}

pub fn arb_corpus() -> impl Strategy<Value = Corpus> {
    let doc = (
        arb_text(4),
        arb_text(8),
        arb_text(16),
        prop::collection::vec((prop::sample::select(VOCAB), arb_role()), 0..3),
    );
    prop::collection::vec(doc, 1..8).prop_map(|docs| {
        let documents = docs
            .into_iter()
            .enumerate()
            .map(|(i, (title, lead, body, objects))| {
                let path = if i % 3 == 0 {
                    format!("doc{i}")
                } else {
                    format!("section{}/doc{i}", i % 3)
                };
                objects.into_iter().fold(
                    CorpusDocument::new(path, title).with_lead(lead).with_body(body),
                    |doc, (name, role)| doc.with_object(ObjectSpec::new(format!("pkg{i}.{name}"), role)),
                )
            })
            .collect();
        Corpus::new(documents)
    })
}

fn postings_are_collapsed(table: &Value) -> bool {
    table.as_object().is_none_or(|map| {
        map.values().all(|postings| match postings {
            Value::Number(_) => true,
            Value::Array(items) => items.len() >= 2,
            _ => false,
        })
    })
}

proptest! {
    #[test]
    fn decode_reproduces_built_index(corpus in arb_corpus()) {
        let built = builder().build(&corpus).unwrap();
        let text = codec::encode(&built).unwrap();
        let decoded = codec::decode(&text, 49, built.tokenizer()).unwrap();

        prop_assert_eq!(&decoded, &built);
        prop_assert_eq!(codec::encode(&decoded).unwrap(), text);
    }

    #[test]
    fn build_is_deterministic(corpus in arb_corpus()) {
        let first = codec::encode(&builder().build(&corpus).unwrap()).unwrap();
        let second = codec::encode(&builder().build(&corpus).unwrap()).unwrap();
        let serial = codec::encode(&builder().with_parallel(false).build(&corpus).unwrap()).unwrap();

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first, &serial);
    }

    #[test]
    fn single_postings_are_bare_ids(corpus in arb_corpus()) {
        let built = builder().build(&corpus).unwrap();
        let value: Value = serde_json::from_str(&codec::encode(&built).unwrap()).unwrap();

        for field in ["terms", "titleterms", "leadterms"] {
            if let Some(table) = value.get(field) {
                prop_assert!(postings_are_collapsed(table), "{field} holds a one-element list");
            }
        }
    }

    #[test]
    fn every_reference_points_into_the_registry(corpus in arb_corpus()) {
        let built = builder().build(&corpus).unwrap();
        let count = built.documents().len();

        for (_, postings) in built.terms().iter() {
            prop_assert!(postings.iter().all(|p| (p.doc as usize) < count));
        }
        prop_assert!(built.objects().iter().all(|entry| (entry.doc as usize) < count));
        for (key, _) in built.titles().iter() {
            prop_assert!(built.documents().lookup(key).is_some());
        }
    }

    #[test]
    fn dangling_object_aborts_build(corpus in arb_corpus(), offset in 0u32..100) {
        let count = u32::try_from(corpus.documents.len()).unwrap();
        let corpus = corpus.with_object(count + offset, ObjectSpec::new("stray", ObjectRole::Data));
        let err = builder().build(&corpus).unwrap_err();

        let matched = matches!(err, DsError::ReferentialIntegrity { doc_id, .. } if doc_id == count + offset);
        prop_assert!(matched);
    }
}
