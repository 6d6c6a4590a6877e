//! halform - HAL hypermedia representation engine
//!
//! Turns arbitrary JSON replies into [HAL](https://stateless.group/hal_specification.html)
//! documents: a registry of link-relation namespaces supplies curies, per-route
//! configuration declares links and embedded resources, and user hooks may
//! decorate the representation before it is serialized.
//!
//! # Architecture Overview
//!
//! Data flows from the dispatcher down to the leaves and back:
//!
//! ```text
//! engine (dispatch) -> hal (builder) -> namespace / uri / route -> finished document
//! ```
//!
//! - A reply is transformed only when its body is a JSON object, its route is
//!   not internal, and the client accepts one of the configured media types.
//! - Each build reads one consistent snapshot of the namespace registry.
//! - Any hook failure aborts the whole build; no partial document is produced.
//!
//! # Core Modules
//!
//! ## Building
//! - [`engine`] - Transform dispatcher, request/reply types, content negotiation
//! - [`hal`] - Route HAL configuration, links, representations and hooks
//!
//! ## Leaves
//! - [`namespace`] - Namespace registry, rel index, directory loader, rel documentation
//! - [`uri`] - URI templates, relative resolution, percent-encoding
//! - [`route`] - Route table and named-route resolution
//!
//! ## Supporting Modules
//! - [`config`] - Settings and the `halform.toml` file format
//! - [`core`] - Error types and user-facing error reporting
//! - [`cli`] - Command-line interface
//!
//! # Example
//!
//! ```rust,no_run
//! use halform::config::Settings;
//! use halform::engine::{HalEngine, Reply, RequestInfo};
//! use halform::hal::{EmbedSpec, HalConfig};
//! use halform::namespace::NamespaceSpec;
//! use halform::route::RouteEntry;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let engine = HalEngine::new(Settings::default())?;
//! engine.registry().add(NamespaceSpec::named("mycompany", "mco"))?.rel("person")?;
//! engine.route(
//!     RouteEntry::new("GET", "/people")?.hal(
//!         HalConfig::new()
//!             .query("{?q*,start,limit}")
//!             .embed("mco:person", EmbedSpec::new("items", "./{item.id}")),
//!     ),
//! )?;
//!
//! let request = RequestInfo::get("/people?q=funny&token=12345");
//! let reply = Reply::json(json!({"items": [{"id": 100}, {"id": 200}]}));
//! let reply = engine.apply(&request, reply).await?;
//!
//! assert_eq!(reply.body["_links"]["self"]["href"], "/people?q=funny");
//! assert_eq!(reply.body["_embedded"]["mco:person"][1]["_links"]["self"]["href"], "/people/200");
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! halform render /people/100 --body person.json
//! halform resolve person --param id=1234 --query
//! halform rels --json
//! halform validate --strict
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod engine;
pub mod hal;
pub mod namespace;
pub mod route;
pub mod uri;

// test_utils module is available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
