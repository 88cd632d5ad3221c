//! Snapshot publication while queries are running.

use std::sync::{Arc, Barrier};
use std::thread;

use docsearch::index::{Corpus, CorpusDocument, IndexHandle};
use docsearch::search::{QueryEngine, QueryOptions};

use crate::fixture::verbatim_builder;

#[test]
fn in_flight_query_keeps_old_snapshot_across_rebuild() {
    let old = Corpus::new(vec![CorpusDocument::new("mesh", "Mesh")]);
    let new = Corpus::new(vec![
        CorpusDocument::new("solvers", "Solvers"),
        CorpusDocument::new("mesh", "Mesh refinement"),
    ]);

    let handle = Arc::new(IndexHandle::new(verbatim_builder(49).build(&old).unwrap()));
    let pinned = handle.snapshot();
    let barrier = Arc::new(Barrier::new(2));

    let rebuild = {
        let handle = Arc::clone(&handle);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            handle.rebuild(&verbatim_builder(50), &new).unwrap();
        })
    };

    let query = thread::spawn({
        let barrier = Arc::clone(&barrier);
        move || {
            let engine = QueryEngine::new(pinned, QueryOptions::default());
            barrier.wait();
            let results = engine.search("mesh").unwrap();
            (engine.index().env_version(), results.doc_ids())
        }
    });

    rebuild.join().unwrap();
    let (version, docs) = query.join().unwrap();
    assert_eq!(version, 49);
    assert_eq!(docs, vec![0]);

    let current = handle.snapshot();
    assert_eq!(current.env_version(), 50);
    let fresh = QueryEngine::new(current, QueryOptions::default())
        .search("mesh")
        .unwrap();
    assert_eq!(fresh.doc_ids(), vec![1]);
}
