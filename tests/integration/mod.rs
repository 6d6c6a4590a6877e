//! Integration test suite for halform
//!
//! End-to-end tests driving the engine the way a host application would, plus
//! the `halform` binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **namespaces**: namespace registry, rel index and rel documentation
//! - **representation**: links, curies, hooks and document shape
//! - **embedding**: embedded objects and collections
//! - **dispatch**: transform decision, negotiation, created resources, headers
//! - **absolute**: absolute link generation
//! - **routes**: named-route resolution
//! - **cli**: the `halform` binary

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod absolute;
mod cli;
mod dispatch;
mod embedding;
mod representation;
mod routes;
