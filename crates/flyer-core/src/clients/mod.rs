//! Client modules for external services

pub mod catalog;
pub mod compiler;

// Re-export all client types
pub use catalog::{BatchOutcome, CatalogClient, CatalogQuery};
pub use compiler::{CompileOptions, CompilerService, PdfCompiler};
