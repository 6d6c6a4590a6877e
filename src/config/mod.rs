//! Configuration for halform
//!
//! Two layers feed the engine:
//!
//! 1. **Settings** ([`Settings`]) - absolute-link, negotiation and strictness
//!    switches shared by every route, overridable through `HALFORM_*`
//!    environment variables
//! 2. **Engine file** ([`EngineConfig`], usually `halform.toml`) - settings plus
//!    namespace and route declarations, used by the CLI and by hosts that keep
//!    their HAL configuration in data
//!
//! Hooks (prepare hooks, link functions, URL builders) are code and are always
//! attached programmatically; a `prepare` key in a data file is rejected.
//!
//! # Environment Variables
//!
//! - `HALFORM_PROTOCOL` - protocol of absolute links
//! - `HALFORM_HOST` - `host[:port]` of absolute links
//! - `HALFORM_ABSOLUTE` - `1`/`true` forces absolute links on, anything else off

mod file;
mod parser;
mod settings;

pub use file::{EngineConfig, NamespaceDecl, RouteConfig};
pub use parser::parse_config;
pub use settings::Settings;
