//! Command-line interface for halform
//!
//! The `halform` binary loads an engine from a `halform.toml` file and exposes
//! its operations for inspection and scripting:
//!
//! - `render` - transform a JSON payload as if it were a route's reply
//! - `api` - print the API root document
//! - `resolve` - resolve a named route to a path
//! - `rels` - list registered namespaces and rels
//! - `doc` - render a rel documentation page
//! - `validate` - check a configuration file
//!
//! # Examples
//!
//! ```bash
//! halform render /people/100 --body person.json --accept application/hal+json
//! halform resolve person --param id=1234 --query
//! halform -c ./api/halform.toml rels --namespace mycompany
//! halform --verbose validate
//! ```

mod api;
mod common;
mod doc;
mod rels;
mod render;
mod resolve;
mod validate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Runtime options derived from the global flags.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter directive; `None` leaves `RUST_LOG` (or `info`) in charge
    pub log_level: Option<String>,

    /// Path of the engine configuration file
    pub config_path: PathBuf,
}

impl CliConfig {
    /// Install the tracing subscriber, writing to stderr.
    ///
    /// Calling it more than once is harmless; only the first call installs.
    pub fn init_logging(&self) {
        let filter = match &self.log_level {
            Some(level) => EnvFilter::new(level),
            None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        };
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Main CLI structure for halform.
#[derive(Parser)]
#[command(
    name = "halform",
    about = "HAL hypermedia representation engine",
    version,
    long_about = "halform turns JSON replies into HAL documents using namespace and route declarations from a halform.toml file."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging (equivalent to `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the engine configuration file
    #[arg(short, long, global = true, env = "HALFORM_CONFIG", default_value = "halform.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Transform a JSON payload into a HAL document.
    Render(render::RenderCommand),

    /// Print the API root document.
    Api(api::ApiCommand),

    /// Resolve a named route to a concrete path.
    Resolve(resolve::ResolveCommand),

    /// List registered namespaces and rels.
    Rels(rels::RelsCommand),

    /// Render a rel documentation page.
    Doc(doc::DocCommand),

    /// Check a configuration file.
    Validate(validate::ValidateCommand),
}

impl Cli {
    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            Some("error".to_string())
        } else {
            None
        };

        CliConfig {
            log_level,
            config_path: self.config.clone(),
        }
    }

    /// Execute with an explicit configuration, e.g. from tests.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Render(cmd) => cmd.execute(&config.config_path).await,
            Commands::Api(cmd) => cmd.execute(&config.config_path),
            Commands::Resolve(cmd) => cmd.execute(&config.config_path),
            Commands::Rels(cmd) => cmd.execute(&config.config_path),
            Commands::Doc(cmd) => cmd.execute(&config.config_path),
            Commands::Validate(cmd) => cmd.execute(&config.config_path),
        }
    }
}
