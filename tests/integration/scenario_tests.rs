//! End-to-end behaviour of build, query and resolve.

use docsearch::error::DsError;
use docsearch::index::{
    Corpus, CorpusDocument, ObjectRole, ObjectSpec, RelevanceTier, codec,
};
use docsearch::search::{CombineMode, QueryEngine, QueryOptions, Resolver};

use crate::fixture::{build, chidg_corpus, verbatim_builder};

fn engine(corpus: &Corpus) -> QueryEngine {
    QueryEngine::new(build(corpus), QueryOptions::default())
}

#[test]
fn title_match_outranks_body_match() {
    let corpus = Corpus::new(vec![
        CorpusDocument::new("a", "Intro").with_term("solver", RelevanceTier::Body),
        CorpusDocument::new("b", "Solver Detail").with_term("solver", RelevanceTier::Title),
    ]);
    let results = engine(&corpus).search("solver").unwrap();
    let paths: Vec<_> = results.iter().map(|hit| hit.path).collect();
    assert_eq!(paths, vec!["b", "a"]);
}

#[test]
fn empty_query_is_reported_distinctly() {
    let err = engine(&chidg_corpus()).search("").unwrap_err();
    assert!(matches!(err, DsError::EmptyQuery));
    assert!(!err.is_fatal());
}

#[test]
fn unknown_term_yields_empty_results() {
    let results = engine(&chidg_corpus()).search("turbulence").unwrap();
    assert!(results.is_empty());
    assert_eq!(results.iter().count(), 0);
}

#[test]
fn object_with_missing_document_fails_build() {
    let corpus = Corpus::new(vec![CorpusDocument::new("a", "A"), CorpusDocument::new("b", "B")])
        .with_object(99, ObjectSpec::new("chidg.init", ObjectRole::Function));
    let err = verbatim_builder(49).build(&corpus).unwrap_err();

    assert!(err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("chidg.init"), "{message}");
    assert!(message.contains("99"), "{message}");
}

#[test]
fn and_mode_requires_every_term() {
    let corpus = chidg_corpus();
    let index = build(&corpus);
    let or = QueryEngine::new(index.clone(), QueryOptions::default())
        .search("chimera newton")
        .unwrap();
    let and = QueryEngine::new(index, QueryOptions::default().with_mode(CombineMode::And))
        .search("chimera newton")
        .unwrap();

    assert!(or.len() > and.len());
    assert!(and.is_empty());
}

#[test]
fn search_then_resolve_round_trip() {
    let index = build(&chidg_corpus());
    let results = QueryEngine::new(index.clone(), QueryOptions::default())
        .search("mesh")
        .unwrap();
    let top = results.iter().next().unwrap();

    let resolver = Resolver::new(index, ".html");
    let resolved = resolver.resolve_document(top.doc).unwrap();
    assert_eq!(resolved.title, "Mesh");
    assert_eq!(resolved.link, "code_details/mesh/detail_mesh.html");

    let object = resolver.resolve_object("equation_set_t").unwrap();
    assert_eq!(object.label, "Python class");
    assert_eq!(object.title, "Equation Sets");
}

#[test]
fn persisted_index_answers_like_the_built_one() {
    let built = build(&chidg_corpus());
    let text = codec::encode_js(&built).unwrap();
    let decoded = codec::decode(&text, 49, built.tokenizer()).unwrap();
    assert_eq!(&decoded, built.as_ref());

    let before = QueryEngine::new(built, QueryOptions::default())
        .search("solver chimera")
        .unwrap();
    let after = QueryEngine::new(decoded.into(), QueryOptions::default())
        .search("solver chimera")
        .unwrap();
    assert_eq!(before.scores(), after.scores());
}
