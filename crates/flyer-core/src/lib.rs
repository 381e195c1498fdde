//! Flyer Core Library
//!
//! Business logic for the bulk product flyer pipeline: batched catalog
//! resolution, budgeted content shaping, per-SKU flyer generation, and
//! result aggregation.

pub mod bulk;
pub mod clients;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod services;

// Re-export main types for easy access
pub use config::{CatalogConfig, CompilerConfig, ContentConfig, FetchConfig, FlyerConfig};
pub use error::{FlyerError, Result};

// Re-export all client types
pub use clients::{BatchOutcome, CatalogClient, CatalogQuery, CompilerService, PdfCompiler};

// Re-export content shaping
pub use content::{balance_content, truncate_markup};

// Re-export service types
pub use services::{build_context, FlyerGenerator, FlyerRenderer, HtmlFlyerRenderer};

// Re-export the bulk pipeline
pub use bulk::{
    aggregate, archive_documents, merge_documents, BulkOrchestrator, CatalogFetcher, LogProgress,
    NullProgress, ProgressSink,
};
