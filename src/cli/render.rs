//! Transform a JSON payload as if a route had replied with it.

use super::common::{load_engine, print_json};
use crate::engine::{Reply, RequestInfo};
use anyhow::{Context, Result};
use clap::Args;
use serde_json::{Value, json};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Render a HAL document for a request.
#[derive(Args, Debug)]
pub struct RenderCommand {
    /// Request URL or path, e.g. `/people?q=funny` or `http://localhost:9090/people/100`
    pub url: String,

    /// Request method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// JSON payload file, `-` for stdin (defaults to an empty object)
    #[arg(long)]
    pub body: Option<PathBuf>,

    /// `Accept` header of the request
    #[arg(long)]
    pub accept: Option<String>,

    /// Reply status code
    #[arg(long, default_value_t = 200)]
    pub status: u16,

    /// `Location` header of the reply (with `--status 201`)
    #[arg(long)]
    pub location: Option<String>,

    /// `Host` header of the request
    #[arg(long)]
    pub host: Option<String>,

    /// Print the document on one line
    #[arg(long)]
    pub compact: bool,
}

impl RenderCommand {
    /// Run the command.
    pub async fn execute(self, config_path: &Path) -> Result<()> {
        let engine = load_engine(config_path)?;

        let mut request = RequestInfo::new(&self.method, &self.url);
        if let Some(host) = &self.host {
            request = request.with_host(host.clone());
        }
        if let Some(accept) = &self.accept {
            request = request.with_accept(accept.clone());
        }

        if let Some(reply) = engine.serve_builtin(&request)? {
            return match reply.body {
                Value::String(html) => {
                    println!("{html}");
                    Ok(())
                }
                body => print_json(&body, self.compact),
            };
        }

        let mut reply = Reply::json(self.read_body()?).status(self.status);
        if let Some(location) = &self.location {
            reply = reply.header("location", location.clone());
        }

        let reply = engine.apply(&request, reply).await?;
        debug!(
            "Reply {} with content-type {}",
            reply.status,
            reply.headers.get("content-type").unwrap_or("-")
        );
        print_json(&reply.body, self.compact)
    }

    fn read_body(&self) -> Result<Value> {
        let content = match &self.body {
            None => return Ok(json!({})),
            Some(path) if path.as_os_str() == "-" => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content).context("Failed to read stdin")?;
                content
            }
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read body file: {}", path.display()))?,
        };
        serde_json::from_str(&content).context("Body is not valid JSON")
    }
}
