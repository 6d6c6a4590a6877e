//! Helpers shared by the subcommands.

use crate::config::EngineConfig;
use crate::engine::HalEngine;
use anyhow::{Context, Result, bail};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;

/// Load the engine described by the configuration file at `path`.
///
/// `HALFORM_*` environment overrides are applied to the file's settings and
/// relative namespace directories resolve against the file's directory.
pub fn load_engine(path: &Path) -> Result<HalEngine> {
    let mut config = EngineConfig::load(path)?;
    config.settings = config.settings.with_env_overrides();

    let base_dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or(Path::new("."));
    debug!("Loading engine from {} (base {})", path.display(), base_dir.display());
    HalEngine::from_config(&config, base_dir)
        .with_context(|| format!("Invalid configuration in {}", path.display()))
}

/// Parse `key=value` pairs into a JSON object.
///
/// Values that parse as JSON scalars keep their type; everything else is a
/// string.
pub fn parse_params(pairs: &[String]) -> Result<Value> {
    let mut params = Map::new();
    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("Invalid parameter '{pair}', expected key=value");
        };
        let value = match serde_json::from_str::<Value>(value) {
            Ok(parsed) if !parsed.is_object() && !parsed.is_array() => parsed,
            _ => Value::String(value.to_string()),
        };
        params.insert(key.to_string(), value);
    }
    Ok(Value::Object(params))
}

/// Print a JSON value, pretty unless `compact`.
pub fn print_json(value: &Value, compact: bool) -> Result<()> {
    let text = if compact { serde_json::to_string(value)? } else { serde_json::to_string_pretty(value)? };
    println!("{text}");
    Ok(())
}
