//! Bulk pipeline: batched fetch, fan-out generation, aggregation

pub mod aggregate;
pub mod fetch;
pub mod orchestrator;
pub mod progress;

pub use aggregate::{aggregate, archive_documents, merge_documents};
pub use fetch::CatalogFetcher;
pub use orchestrator::{BulkOrchestrator, DEFAULT_JOB_CONCURRENCY};
pub use progress::{LogProgress, NullProgress, ProgressSink};
