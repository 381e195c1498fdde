//! Bulk run orchestration
//!
//! One catalog fetch for the whole SKU list, then one generation job per
//! resolved SKU under bounded concurrency. Job failures are caught at the
//! job boundary and recorded; nothing a single job does can abort the run
//! or touch its siblings. The run always yields a `RunResult` — the only
//! run-level error is an empty input list, rejected before any fetch.

use crate::bulk::fetch::CatalogFetcher;
use crate::bulk::progress::ProgressSink;
use crate::clients::catalog::CatalogQuery;
use crate::error::{FlyerError, Result};
use crate::services::generator::FlyerGenerator;
use futures::stream::{self, StreamExt};
use flyer_types::{JobResult, ProgressUpdate, RunResult, Sku};
use std::collections::HashSet;
use std::sync::Arc;

/// Default cap on simultaneous generation jobs, independent of the fetch
/// worker cap
pub const DEFAULT_JOB_CONCURRENCY: usize = 4;

pub struct BulkOrchestrator<C: CatalogQuery> {
    fetcher: CatalogFetcher<C>,
    generator: Arc<FlyerGenerator>,
}

impl<C: CatalogQuery + 'static> BulkOrchestrator<C> {
    pub fn new(fetcher: CatalogFetcher<C>, generator: Arc<FlyerGenerator>) -> Self {
        Self {
            fetcher,
            generator,
        }
    }

    /// Run the bulk pipeline over `skus` with at most `concurrency`
    /// simultaneous generation jobs, reporting after every completion.
    pub async fn run(
        &self,
        skus: &[Sku],
        concurrency: usize,
        progress: &dyn ProgressSink,
    ) -> Result<RunResult> {
        if skus.is_empty() {
            return Err(FlyerError::Input(
                "at least one SKU is required".to_string(),
            ));
        }

        let total = skus.len();
        let mut run = RunResult::default();

        // Step 1: resolve everything up front. Fetch errors become
        // failures for the SKUs they concern; the run continues.
        let (records, fetch_errors) = self.fetcher.fetch_all(skus).await;

        let mut already_failed: HashSet<Sku> = HashSet::new();
        for (sku, reason) in fetch_errors {
            already_failed.insert(sku.clone());
            run.failed.push((sku, reason));
        }

        // SKUs the catalog silently did not return
        for sku in skus {
            if !records.contains_key(sku) && !already_failed.contains(sku) {
                run.failed.push((
                    sku.clone(),
                    FlyerError::MissingRecord(sku.clone()).to_string(),
                ));
            }
        }

        // Step 2: one job per resolved SKU, bounded fan-out, unordered
        // fan-in. The record map is immutable from here on.
        let job_skus: Vec<Sku> = skus
            .iter()
            .filter(|sku| records.contains_key(*sku))
            .cloned()
            .collect();

        log::info!(
            "Generating {} flyers with concurrency {}",
            job_skus.len(),
            concurrency.max(1)
        );

        let records = Arc::new(records);
        let mut results = stream::iter(job_skus.into_iter().map(|sku| {
            let records = Arc::clone(&records);
            let generator = Arc::clone(&self.generator);
            async move {
                // The filter above guarantees presence; a miss here would
                // be a logic error, reported like any other job failure.
                let record = match records.get(&sku) {
                    Some(record) => record,
                    None => {
                        return JobResult::failure(
                            sku.clone(),
                            FlyerError::MissingRecord(sku.clone()).to_string(),
                        )
                    }
                };
                match generator.generate(record).await {
                    Ok(pdf) => JobResult::success(sku, pdf),
                    Err(e) => {
                        log::error!("Flyer generation failed for {}: {}", sku, e);
                        JobResult::failure(sku, e.to_string())
                    }
                }
            }
        }))
        .buffer_unordered(concurrency.max(1));

        while let Some(job_result) = results.next().await {
            run.merge(job_result);
            progress.on_progress(ProgressUpdate {
                completed: run.succeeded.len() + run.failed.len(),
                total,
                succeeded: run.succeeded.len(),
                failed: run.failed.len(),
            });
        }

        log::info!(
            "Bulk run complete: {} succeeded, {} failed out of {}",
            run.succeeded.len(),
            run.failed.len(),
            total
        );

        Ok(run)
    }
}
