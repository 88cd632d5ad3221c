use std::collections::HashMap;
use std::sync::Arc;

use proptest::prelude::*;

use docsearch::index::{IndexBuilder, Tokenizer, TokenizerPolicy};
use docsearch::search::{QueryEngine, QueryOptions, TierWeights};

use crate::roundtrip_tests::arb_corpus;

const QUERY_WORDS: &[&str] = &["mesh", "solver", "newton", "flux", "matrix", "turbulence"];

fn engine(corpus: &docsearch::index::Corpus, partial: bool) -> QueryEngine {
    let builder = IndexBuilder::new(Tokenizer::new(TokenizerPolicy::verbatim()).unwrap(), 49);
    let index = Arc::new(builder.build(corpus).unwrap());
    let options = if partial {
        QueryOptions::default().with_partial(TierWeights::PARTIAL)
    } else {
        QueryOptions::default()
    };
    QueryEngine::new(index, options)
}

fn scores(engine: &QueryEngine, words: &[&str]) -> HashMap<u32, u32> {
    engine
        .search(&words.join(" "))
        .unwrap()
        .scores()
        .iter()
        .copied()
        .collect()
}

proptest! {
    #[test]
    fn adding_a_term_never_lowers_a_score(
        corpus in arb_corpus(),
        words in prop::collection::vec(prop::sample::select(QUERY_WORDS), 1..4),
        extra in prop::sample::select(QUERY_WORDS),
        partial in any::<bool>(),
    ) {
        let engine = engine(&corpus, partial);
        let before = scores(&engine, &words);
        let mut extended = words.clone();
        extended.push(extra);
        let after = scores(&engine, &extended);

        for (doc, score) in before {
            prop_assert!(after.get(&doc).copied().unwrap_or(0) >= score);
        }
    }

    #[test]
    fn results_are_ranked(
        corpus in arb_corpus(),
        words in prop::collection::vec(prop::sample::select(QUERY_WORDS), 1..4),
    ) {
        let results = engine(&corpus, false).search(&words.join(" ")).unwrap();
        for pair in results.scores().windows(2) {
            let ((doc_a, score_a), (doc_b, score_b)) = (pair[0], pair[1]);
            prop_assert!(score_a > score_b || (score_a == score_b && doc_a < doc_b));
            prop_assert!(score_b > 0);
        }
    }
}
