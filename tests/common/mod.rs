//! Common test utilities and fixtures for halform integration tests

// Allow dead code because these utilities are used across different test files
// and not all utilities are used in every test file
#![allow(dead_code)]

use anyhow::{Context, Result};
use assert_cmd::Command;
use halform::engine::{HalEngine, Reply, RequestInfo};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Output of one CLI invocation.
pub struct CommandOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    /// Parse stdout as JSON.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.stdout).expect("stdout is JSON")
    }
}

/// A temporary directory holding a `halform.toml` and its rel documentation.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
}

impl TestProject {
    /// Create an empty project.
    pub fn new() -> Result<Self> {
        let temp = TempDir::new().context("Failed to create temp dir")?;
        let root = temp.path().to_path_buf();
        Ok(Self {
            _temp: temp,
            root,
        })
    }

    /// Project root
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of the configuration file
    pub fn config_path(&self) -> PathBuf {
        self.root.join("halform.toml")
    }

    /// Write the configuration file.
    pub fn write_config(&self, content: &str) -> Result<()> {
        std::fs::write(self.config_path(), content).context("Failed to write halform.toml")
    }

    /// Write a file relative to the project root.
    pub fn write_file(&self, relative: &str, content: &str) -> Result<PathBuf> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Run the `halform` binary in the project directory.
    pub fn run_halform(&self, args: &[&str]) -> Result<CommandOutput> {
        let output = Command::cargo_bin("halform")?
            .current_dir(&self.root)
            .env_remove("HALFORM_CONFIG")
            .env_remove("HALFORM_HOST")
            .env_remove("HALFORM_PROTOCOL")
            .env_remove("HALFORM_ABSOLUTE")
            .env("NO_COLOR", "1")
            .args(args)
            .output()?;
        Ok(CommandOutput {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Request `url` asking for HAL.
pub fn hal_request(url: &str) -> RequestInfo {
    RequestInfo::get(url).with_accept("application/hal+json")
}

/// Transform `body` as the reply to `GET url`.
pub async fn render(engine: &HalEngine, url: &str, body: Value) -> Value {
    engine.apply(&hal_request(url), Reply::json(body)).await.expect("build succeeds").body
}

/// The curie entry every `mycompany` fixture document declares.
pub fn mco_curie() -> Value {
    serde_json::json!({"name": "mco", "href": "/rels/mycompany/{rel}", "templated": true})
}

/// Keys of a JSON object, in document order.
pub fn keys(value: &Value) -> Vec<String> {
    value.as_object().map(|map| map.keys().cloned().collect()).unwrap_or_default()
}
