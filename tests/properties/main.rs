//! Property tests for the index builder, codec and query engine.

mod roundtrip_tests;
mod scoring_tests;
