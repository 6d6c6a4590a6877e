//! HAL representation building.
//!
//! A reply body is turned into a HAL document in three steps: the route's
//! [`HalConfig`] is applied (links, embedded resources, ignored fields), the
//! prepare hooks run against the mutable [`Representation`], and the finished
//! tree is serialized with `_links`, `_embedded` and the computed curies.
//!
//! The builder itself is internal; the engine drives it from
//! [`crate::engine::HalEngine::apply`].

pub(crate) mod builder;
pub mod config;
pub mod hooks;
pub mod link;
pub mod representation;

pub use config::{EmbedSpec, HalConfig};
pub use hooks::{LinkContext, LinkFn, PrepareHook};
pub use link::{Link, LinkSpec};
pub use representation::Representation;
