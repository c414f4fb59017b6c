//! Loop catalog: the trivia, meme and quick-win content users complete.
//!
//! Content is served to clients but never influences statistics; the stats
//! core only sees a [`escape_core::LoopId`]. This crate provides:
//! - [`LoopCatalog`], the collaborator trait the service depends on
//! - [`StaticCatalog`], the built-in catalog compiled into the binary
//! - [`FileCatalog`], a RON-backed catalog administrators can edit
//! - [`FallbackCatalog`], which serves the built-in set when a source fails

pub mod builtin;
pub mod catalog;
pub mod loaders;

pub use catalog::{
    CatalogError, FallbackCatalog, Loop, LoopCatalog, LoopContent, LoopKind, StaticCatalog,
};
pub use loaders::{CatalogLoader, FileCatalog};
