//! Validate an engine configuration file.
//!
//! Loads the file the same way every other command does, then exercises the
//! parts that only fail at request time: each route's `hal` links and embeds
//! must use registered prefixes when `strict` is on.

use super::common::load_engine;
use crate::engine::HalEngine;
use crate::hal::{EmbedSpec, LinkSpec};
use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::Path;

/// Check a configuration file.
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Report unregistered prefixes as errors even when `strict` is off
    #[arg(long)]
    pub strict: bool,
}

impl ValidateCommand {
    /// Run the command.
    pub fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;
        let strict = self.strict || engine.settings().strict;

        let problems = unresolved_rels(&engine);
        for rel in &problems {
            let line = format!("Unregistered namespace-qualified rel: {rel}");
            if strict {
                eprintln!("{} {}", "✗".red(), line);
            } else {
                eprintln!("{} {}", "⚠".yellow(), line);
            }
        }
        if strict && !problems.is_empty() {
            bail!("{} unresolved rel(s) in {}", problems.len(), config_path.display());
        }

        println!(
            "{} {} is valid ({} namespaces, {} routes)",
            "✓".green(),
            config_path.display(),
            engine.registry().list().len(),
            engine.routes().len()
        );
        Ok(())
    }
}

/// Configured rels whose prefix or rel is not registered.
fn unresolved_rels(engine: &HalEngine) -> Vec<String> {
    fn collect<'a>(
        links: &'a [(String, LinkSpec)],
        embedded: &'a [(String, EmbedSpec)],
        out: &mut Vec<&'a str>,
    ) {
        out.extend(links.iter().map(|(rel, _)| rel.as_str()));
        for (rel, spec) in embedded {
            out.push(rel);
            collect(&spec.links, &spec.embedded, out);
        }
    }

    let mut problems = Vec::new();
    for route in engine.routes().list() {
        let Some(config) = route.hal_config() else {
            continue;
        };
        let mut rels = Vec::new();
        collect(&config.links, &config.embedded, &mut rels);
        if let Some(api) = &config.api {
            rels.push(api);
        }
        for rel in rels {
            if rel.contains("//") || !rel.contains(':') {
                continue;
            }
            if engine.registry().lookup(rel).is_none() && !problems.iter().any(|p| p == rel) {
                problems.push(rel.to_string());
            }
        }
    }
    problems
}
