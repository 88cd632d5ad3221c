//! Shared corpora and helpers.

use std::path::PathBuf;
use std::sync::Arc;

use docsearch::index::{
    Corpus, CorpusDocument, IndexBuilder, ObjectRole, ObjectSpec, RelevanceTier, SearchIndex,
    Tokenizer, TokenizerPolicy,
};

pub fn verbatim_builder(env_version: u32) -> IndexBuilder {
    IndexBuilder::new(
        Tokenizer::new(TokenizerPolicy::verbatim()).expect("verbatim tokenizer"),
        env_version,
    )
}

pub fn english_builder() -> IndexBuilder {
    IndexBuilder::new(
        Tokenizer::new(TokenizerPolicy::default()).expect("english tokenizer"),
        49,
    )
}

pub fn build(corpus: &Corpus) -> Arc<SearchIndex> {
    Arc::new(verbatim_builder(49).build(corpus).expect("build"))
}

/// A small documentation set shaped like the ChiDG manual.
pub fn chidg_corpus() -> Corpus {
    Corpus::new(vec![
        CorpusDocument::new("index", "Welcome to ChiDG")
            .with_lead("ChiDG is a Chimera-based discontinuous Galerkin solver.")
            .with_body("Read the getting started guide."),
        CorpusDocument::new("getting_started/getting_started", "Getting Started")
            .with_lead("Build with CMake and MPI.")
            .with_body("Run the solver on the smooth bump example."),
        CorpusDocument::new("code_details/mesh/detail_mesh", "Mesh")
            .with_lead("The mesh holds Chimera donor and receiver elements."),
        CorpusDocument::new("code_details/solvers/detail_solvers", "Solvers")
            .with_lead("Newton and quasi-Newton nonlinear solver algorithms.")
            .with_body("Preconditioners accelerate the linear solver.")
            .with_object(ObjectSpec::new("chidg.dot", ObjectRole::Function))
            .with_object(ObjectSpec::new("chidg.mv", ObjectRole::Function)),
        CorpusDocument::new("code_details/equations/detail_equations", "Equation Sets")
            .with_term("equation_set_t", RelevanceTier::Title)
            .with_object(ObjectSpec::new("equation_set_t", ObjectRole::Class)),
    ])
}

pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}
