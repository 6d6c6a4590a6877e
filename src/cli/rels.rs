//! List registered namespaces and rels.

use super::common::{load_engine, print_json};
use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use std::path::Path;

/// List namespaces and their rels, sorted by name.
#[derive(Args, Debug)]
pub struct RelsCommand {
    /// Only list this namespace
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl RelsCommand {
    /// Run the command.
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;
        let namespaces: Vec<_> = engine
            .registry()
            .list()
            .into_iter()
            .filter(|ns| self.namespace.as_deref().is_none_or(|name| ns.name() == name))
            .collect();

        if let Some(name) = &self.namespace {
            if namespaces.is_empty() {
                bail!("Namespace '{name}' is not registered");
            }
        }

        if self.json {
            return print_json(&json!(namespaces), false);
        }

        for ns in &namespaces {
            println!("{} ({})", ns.name().bold(), ns.prefix().cyan());
            let mut rels = ns.rels().to_vec();
            rels.sort_by(|a, b| a.name.cmp(&b.name));
            for rel in rels {
                match &rel.description {
                    Some(description) => {
                        println!("  {}:{}  {}", ns.prefix(), rel.name, description.dimmed());
                    }
                    None => println!("  {}:{}", ns.prefix(), rel.name),
                }
            }
        }
        Ok(())
    }
}
