//! QKB - Query Knowledge Base
//!
//! A catalog and keyword search tool for directory trees of markdown
//! articles, such as interview-prep explainers grouped in topic folders.
//!
//! ## Features
//!
//! - One-shot loading into an immutable in-memory catalog
//! - Inverted-index keyword search with title boosting
//! - Category listing derived from the directory layout
//! - Markdown to HTML rendering
//! - CLI and HTTP query surfaces with atomic catalog reload

pub mod catalog;
pub mod cli;
pub mod config;
pub mod document;
pub mod error;
pub mod formatter;
pub mod index;
pub mod render;
pub mod server;

pub use catalog::{Catalog, CatalogStats, SearchHit, SharedCatalog};
pub use cli::{Cli, Commands, OutputFormat};
pub use document::{Document, LoadReport, LoadWarning};
pub use error::{KbError, Result};
pub use index::Index;
