//! Decoding a search index produced by a Sphinx documentation build.

use docsearch::error::DsError;
use docsearch::index::{ObjectRole, RelevanceTier, codec};
use docsearch::search::{QueryEngine, QueryOptions, Resolver};

use crate::fixture::{english_builder, fixture_path};

fn load() -> docsearch::SearchIndex {
    let text = std::fs::read_to_string(fixture_path("searchindex.js")).unwrap();
    let builder = english_builder();
    codec::decode(&text, 49, builder.tokenizer()).unwrap()
}

#[test]
fn decodes_registry_and_titles() {
    let index = load();
    assert_eq!(index.env_version(), 49);
    assert_eq!(index.documents().len(), 14);
    assert_eq!(index.documents().lookup("index"), Some(13));
    assert_eq!(
        index.titles().get("code_details/solvers/detail_solvers"),
        Some("Solvers")
    );
}

#[test]
fn decodes_objects_and_types() {
    let index = load();
    let objects = index.objects();
    assert_eq!(objects.len(), 7);

    let dot = objects.get("dot").unwrap();
    assert_eq!(dot.doc, 7);
    assert_eq!(objects.object_type(dot.type_index).unwrap().role, ObjectRole::Function);

    let class = objects.get("equation_set_t").unwrap();
    assert_eq!(objects.object_type(class.type_index).unwrap().label, "Python class");
}

#[test]
fn normalizes_collapsed_and_empty_postings() {
    let index = load();
    assert!(!index.terms().contains("long"));

    let solver: Vec<_> = index
        .terms()
        .get("solver")
        .unwrap()
        .iter()
        .map(|p| (p.doc, p.tier))
        .collect();
    assert_eq!(
        solver,
        vec![
            (0, RelevanceTier::Body),
            (1, RelevanceTier::Body),
            (7, RelevanceTier::Body),
            (8, RelevanceTier::Title),
        ]
    );
}

#[test]
fn ranks_title_pages_first() {
    let index = load();
    let engine = QueryEngine::new(index.into(), QueryOptions::default());

    assert_eq!(engine.search("solver").unwrap().doc_ids(), vec![8, 0, 1, 7]);
    assert_eq!(engine.search("Preconditioners").unwrap().doc_ids(), vec![8, 0, 2, 7]);
    assert_eq!(engine.search("mesh").unwrap().doc_ids(), vec![6, 2]);
}

#[test]
fn resolves_objects_to_pages() {
    let resolver = Resolver::new(load().into(), ".html");
    let mv = resolver.resolve_object("mv").unwrap();
    assert_eq!(mv.title, "Parallelization");
    assert_eq!(mv.label, "Python function");
    assert_eq!(mv.link, "code_details/parallel/detail_parallel.html#mv");
}

#[test]
fn other_versions_are_rejected() {
    let text = std::fs::read_to_string(fixture_path("searchindex.js")).unwrap();
    let builder = english_builder();
    let err = codec::decode(&text, 50, builder.tokenizer()).unwrap_err();
    assert!(matches!(err, DsError::VersionMismatch { expected: 50, found: 49 }));
    assert!(err.requires_rebuild());
}

#[test]
fn re_encoding_is_stable() {
    let index = load();
    let first = codec::encode(&index).unwrap();
    let builder = english_builder();
    let again = codec::decode(&first, 49, builder.tokenizer()).unwrap();
    assert_eq!(codec::encode(&again).unwrap(), first);
}
