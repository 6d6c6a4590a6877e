//! Resolve a named route.

use super::common::{load_engine, parse_params};
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Resolve a named route to a concrete path.
#[derive(Args, Debug)]
pub struct ResolveCommand {
    /// Route name or id
    pub route: String,

    /// Path parameters as `key=value`
    #[arg(short, long = "param")]
    pub params: Vec<String>,

    /// Append the route's query template
    #[arg(long)]
    pub query: bool,
}

impl ResolveCommand {
    /// Run the command.
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;
        let params = parse_params(&self.params)?;
        let path = if self.query {
            engine.routes().resolve_with_query(&self.route, &params)?
        } else {
            engine.routes().resolve(&self.route, &params)?
        };
        println!("{path}");
        Ok(())
    }
}
