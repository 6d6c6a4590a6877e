//! Unit tests exercising halform's public API across module boundaries.

mod registry_concurrency_tests;
