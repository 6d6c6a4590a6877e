//! URI handling for link hrefs.
//!
//! - [`template`]: RFC 6570 parsing and partial expansion
//! - [`resolve`]: relative resolution, absolute URLs and query filtering
//! - [`encode`]: percent-encoding helpers

pub mod encode;
pub mod resolve;
pub mod template;

pub use template::{Expansion, UriTemplate, is_templated};
