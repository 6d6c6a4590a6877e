//! Render rel documentation pages.

use super::common::load_engine;
use crate::namespace::RelDocRenderer;
use anyhow::Result;
use clap::Args;
use std::path::Path;

/// Render the documentation page of a namespace or rel.
#[derive(Args, Debug)]
pub struct DocCommand {
    /// Namespace name
    pub namespace: String,

    /// Rel name; omit for the namespace index
    pub rel: Option<String>,
}

impl DocCommand {
    /// Run the command.
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;
        let renderer = RelDocRenderer::new(engine.settings().rel_doc_base.clone())?;
        let html = match &self.rel {
            Some(rel) => renderer.render_rel(engine.registry(), &self.namespace, rel)?,
            None => renderer.render_namespace(engine.registry(), &self.namespace)?,
        };
        println!("{html}");
        Ok(())
    }
}
