//! Catalog types and the collaborator trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use escape_core::LoopId;

/// Kind of loop content.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum LoopKind {
    Trivia,
    Meme,
    QuickWin,
}

impl LoopKind {
    /// First id of the block reserved for this kind.
    pub const fn id_base(self) -> u32 {
        match self {
            Self::Trivia => 1000,
            Self::Meme => 2000,
            Self::QuickWin => 3000,
        }
    }
}

/// Payload shown to the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopContent {
    Trivia {
        question: String,
        options: Vec<String>,
        answer: String,
    },
    Text {
        text: String,
    },
}

/// One entry of the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loop {
    pub id: LoopId,
    pub kind: LoopKind,
    pub content: LoopContent,
}

/// Errors raised by catalog sources.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog {path}: {message}")]
    Parse { path: String, message: String },

    #[error("duplicate loop id {0}")]
    DuplicateId(LoopId),

    #[error("trivia loop {0} answer is not one of its options")]
    AnswerNotInOptions(LoopId),
}

/// Source of loops presented to clients.
#[async_trait]
pub trait LoopCatalog: Send + Sync {
    /// All loops currently available.
    async fn loops(&self) -> Result<Vec<Loop>, CatalogError>;
}

/// Catalog compiled into the binary.
#[derive(Clone, Debug, Default)]
pub struct StaticCatalog;

#[async_trait]
impl LoopCatalog for StaticCatalog {
    async fn loops(&self) -> Result<Vec<Loop>, CatalogError> {
        Ok(crate::builtin::builtin_loops())
    }
}

/// Serves the built-in catalog whenever the primary source fails or is empty.
///
/// This is the only place a read failure is absorbed instead of surfaced.
pub struct FallbackCatalog<C> {
    primary: C,
}

impl<C> FallbackCatalog<C> {
    pub fn new(primary: C) -> Self {
        Self { primary }
    }
}

#[async_trait]
impl<C: LoopCatalog> LoopCatalog for FallbackCatalog<C> {
    async fn loops(&self) -> Result<Vec<Loop>, CatalogError> {
        match self.primary.loops().await {
            Ok(loops) if !loops.is_empty() => Ok(loops),
            Ok(_) => {
                tracing::debug!("Catalog source is empty, serving built-in loops");
                Ok(crate::builtin::builtin_loops())
            }
            Err(e) => {
                tracing::warn!("Catalog source failed, serving built-in loops: {}", e);
                Ok(crate::builtin::builtin_loops())
            }
        }
    }
}

/// Checks ids are unique and trivia answers are among the options.
pub(crate) fn validate_loops(loops: &[Loop]) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    for entry in loops {
        if !seen.insert(entry.id) {
            return Err(CatalogError::DuplicateId(entry.id));
        }
        if let LoopContent::Trivia {
            options, answer, ..
        } = &entry.content
            && !options.contains(answer)
        {
            return Err(CatalogError::AnswerNotInOptions(entry.id));
        }
    }
    Ok(())
}
