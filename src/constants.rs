//! Global constants used throughout the halform codebase.
//!
//! Defaults for the configuration surface and limits applied by the
//! representation builder live here so they are discoverable in one place.

/// Media type of HAL documents, and the default transform candidate.
pub const HAL_MEDIA_TYPE: &str = "application/hal+json";

/// Plain JSON media type, commonly added as a second transform candidate.
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Default base path under which rel documentation is served.
///
/// Curie hrefs are built as `{rel_doc_base}/{namespace}/{rel}`.
pub const DEFAULT_REL_DOC_BASE: &str = "/rels";

/// Default path of the API root document.
pub const DEFAULT_API_PATH: &str = "/api/";

/// Default protocol used for absolute links when the request does not say.
pub const DEFAULT_PROTOCOL: &str = "http";

/// Maximum nesting of embedded resources.
///
/// Embedded configuration is declared statically per route, so a cycle cannot
/// occur; the limit catches runaway programmatic embedding.
pub const MAX_EMBED_DEPTH: usize = 32;

/// Rel name of the self link.
pub const SELF_REL: &str = "self";

/// Rel name of the curie declarations.
pub const CURIES_REL: &str = "curies";

/// Environment variable overriding the absolute link protocol.
pub const ENV_PROTOCOL: &str = "HALFORM_PROTOCOL";

/// Environment variable overriding the absolute link host.
pub const ENV_HOST: &str = "HALFORM_HOST";

/// Environment variable forcing absolute links on (`1`/`true`) or off.
pub const ENV_ABSOLUTE: &str = "HALFORM_ABSOLUTE";

/// File extensions recognised as rel documentation by the directory loader.
pub const REL_DOC_EXTENSIONS: &[&str] = &["md", "html", "txt"];
