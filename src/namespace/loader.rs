//! Loading rel definitions from a documentation directory.
//!
//! A directory namespace holds one documentation file per rel. The file stem is
//! the rel name; an optional YAML front-matter block may carry a
//! `description`. Only files directly inside the directory are considered.
//!
//! ```text
//! rels/mycompany/
//! ├── boss.md          -> mco:boss
//! ├── datasources.md   -> mco:datasources (description from front matter)
//! └── notes/           -> ignored
//! ```

use crate::constants::REL_DOC_EXTENSIONS;
use crate::core::{HalError, Result};
use crate::namespace::RelDefinition;
use gray_matter::Matter;
use gray_matter::engine::YAML;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A rel's documentation file, split into front matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelDocument {
    /// Rel name (file stem)
    pub name: String,
    /// Description from front matter, if any
    pub description: Option<String>,
    /// Document body with the front matter removed
    pub body: String,
    /// Source file
    pub path: PathBuf,
}

/// Source of rel definitions for directory namespaces.
///
/// The registry calls [`RelLoader::load`] once, when a directory namespace is
/// registered. Implementations must be safe to share across threads.
pub trait RelLoader: Send + Sync {
    /// Produce the rels documented in `dir`.
    fn load(&self, dir: &Path) -> Result<Vec<RelDefinition>>;

    /// Fetch the documentation for one rel, if the loader can provide it.
    fn document(&self, dir: &Path, rel: &str) -> Result<Option<RelDocument>> {
        let _ = (dir, rel);
        Ok(None)
    }
}

#[derive(Debug, Default, Deserialize)]
struct RelFrontMatter {
    description: Option<String>,
}

/// Filesystem [`RelLoader`] reading `.md`, `.html` and `.txt` files.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectoryRelLoader;

impl DirectoryRelLoader {
    /// Create a new directory loader.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn doc_files(dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(HalError::IoError {
                kind: std::io::ErrorKind::NotFound,
                message: format!("rel directory not found: {}", dir.display()),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry.map_err(|e| HalError::IoError {
                kind: std::io::ErrorKind::Other,
                message: format!("failed to read {}: {e}", dir.display()),
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            let recognised = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| REL_DOC_EXTENSIONS.contains(&ext));
            if recognised {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }

    fn read_document(path: &Path) -> Result<RelDocument> {
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let content = std::fs::read_to_string(path)?;

        let matter = Matter::<YAML>::new();
        let (description, body) = match matter.parse::<RelFrontMatter>(&content) {
            Ok(parsed) => (parsed.data.and_then(|fm| fm.description), parsed.content),
            Err(e) => {
                warn!("Ignoring malformed front matter in {}: {}", path.display(), e);
                (None, content)
            }
        };

        Ok(RelDocument {
            name,
            description,
            body,
            path: path.to_path_buf(),
        })
    }
}

impl RelLoader for DirectoryRelLoader {
    fn load(&self, dir: &Path) -> Result<Vec<RelDefinition>> {
        let mut rels = Vec::new();
        for path in Self::doc_files(dir)? {
            let doc = Self::read_document(&path)?;
            if doc.name.is_empty() {
                continue;
            }
            debug!("Found rel '{}' in {}", doc.name, path.display());
            rels.push(RelDefinition {
                name: doc.name,
                description: doc.description,
            });
        }
        Ok(rels)
    }

    fn document(&self, dir: &Path, rel: &str) -> Result<Option<RelDocument>> {
        for path in Self::doc_files(dir)? {
            if path.file_stem().is_some_and(|stem| stem == rel) {
                return Self::read_document(&path).map(Some);
            }
        }
        Ok(None)
    }
}
