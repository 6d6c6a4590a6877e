//! Print the API root document.

use super::common::{load_engine, print_json};
use crate::engine::RequestInfo;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Print the API root document.
#[derive(Args, Debug)]
pub struct ApiCommand {
    /// `Host` header used for absolute links
    #[arg(long)]
    pub host: Option<String>,

    /// Print the document on one line
    #[arg(long)]
    pub compact: bool,
}

impl ApiCommand {
    /// Run the command.
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;
        let mut request = RequestInfo::get(&engine.settings().api_path);
        if let Some(host) = self.host {
            request = request.with_host(host);
        }
        print_json(&engine.api_root(&request)?, self.compact)
    }
}
