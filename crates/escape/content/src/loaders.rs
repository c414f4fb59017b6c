//! RON catalog loader.
//!
//! Administrators can replace the built-in content by pointing the service
//! at a file of this shape:
//!
//! ```text
//! (
//!     loops: [
//!         (id: 1001, kind: trivia, content: trivia(
//!             question: "How many continents are there?",
//!             options: ["5", "6", "7"],
//!             answer: "7",
//!         )),
//!         (id: 2001, kind: meme, content: text(text: "Keep calm and carry on!")),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogError, Loop, LoopCatalog, validate_loops};

/// Top-level structure of a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    pub loops: Vec<Loop>,
}

/// Parses catalog files.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Parse and validate catalog text. `origin` is only used in errors.
    pub fn parse(content: &str, origin: &str) -> Result<Vec<Loop>, CatalogError> {
        let file: CatalogFile = ron::from_str(content).map_err(|e| CatalogError::Parse {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        validate_loops(&file.loops)?;
        Ok(file.loops)
    }

    /// Load a catalog from a RON file.
    pub async fn load(path: &Path) -> Result<Vec<Loop>, CatalogError> {
        let display = path.display().to_string();
        let content =
            tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CatalogError::Read {
                    path: display.clone(),
                    source,
                })?;
        Self::parse(&content, &display)
    }
}

/// Catalog re-read from disk on every request so edits apply without restart.
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LoopCatalog for FileCatalog {
    async fn loops(&self) -> Result<Vec<Loop>, CatalogError> {
        CatalogLoader::load(&self.path).await
    }
}
