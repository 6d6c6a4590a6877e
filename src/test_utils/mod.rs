//! Test utilities for halform
//!
//! Shared fixtures for unit and integration tests: logging setup, an engine
//! preloaded with the `mycompany` namespace, and rel documentation files.

use crate::config::Settings;
use crate::engine::HalEngine;
use crate::namespace::NamespaceSpec;
use std::path::Path;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` when given, otherwise
/// `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=halform=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}

/// An engine with the `mycompany` namespace (prefix `mco`) and its
/// `boss`, `person` and `people` rels registered, and no routes.
///
/// # Panics
///
/// Panics if the fixture namespace cannot be registered.
#[must_use]
pub fn mycompany_engine(settings: Settings) -> HalEngine {
    let engine = HalEngine::new(settings).expect("engine");
    engine
        .registry()
        .add(NamespaceSpec::named("mycompany", "mco"))
        .and_then(|ns| ns.rel("boss"))
        .and_then(|ns| ns.rel("person"))
        .and_then(|ns| ns.rel("people"))
        .expect("mycompany namespace");
    engine
}

/// Write one markdown rel documentation file per `(rel, description, body)`.
///
/// # Errors
///
/// Any I/O error while writing.
pub fn write_rel_docs(dir: &Path, rels: &[(&str, Option<&str>, &str)]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    for (rel, description, body) in rels {
        let content = match description {
            Some(description) => format!("---\ndescription: {description}\n---\n{body}\n"),
            None => format!("{body}\n"),
        };
        std::fs::write(dir.join(format!("{rel}.md")), content)?;
    }
    Ok(())
}
