//! Generic TOML configuration parsing.
//!
//! Reads a file and deserializes it into any `DeserializeOwned` type, adding the
//! file path to every error:
//!
//! ```text
//! Failed to parse config file: /path/to/halform.toml
//! Caused by:
//!     unknown field `absolut`, expected one of `absolute`, `protocol`, ...
//! ```

use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into `T`.
///
/// ```rust,no_run
/// use halform::config::{EngineConfig, parse_config};
/// use std::path::Path;
///
/// # fn example() -> anyhow::Result<()> {
/// let config: EngineConfig = parse_config(Path::new("halform.toml"))?;
/// println!("{} routes", config.routes.len());
/// # Ok(())
/// # }
/// ```
///
/// # Errors
///
/// Fails when the file cannot be read or does not deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}
