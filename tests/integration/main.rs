//! Integration test suite entry point.

mod fixture;
mod handle_tests;
mod original_index_tests;
mod scenario_tests;
