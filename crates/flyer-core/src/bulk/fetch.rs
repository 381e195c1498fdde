//! Batched, retried catalog resolution
//!
//! SKU lists are partitioned into consecutive batches no larger than the
//! service limit; batches run concurrently under a fixed worker cap and
//! retry independently. One slow or failing batch never blocks or fails
//! the others.

use crate::clients::catalog::{BatchOutcome, CatalogQuery};
use crate::config::FetchConfig;
use futures::stream::{self, StreamExt};
use flyer_types::{ProductRecord, Sku};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

pub struct CatalogFetcher<C: CatalogQuery> {
    client: Arc<C>,
    config: FetchConfig,
}

impl<C: CatalogQuery + 'static> CatalogFetcher<C> {
    pub fn new(client: Arc<C>, config: FetchConfig) -> Self {
        Self { client, config }
    }

    /// Resolve all SKUs. Returns the union of every batch's records plus
    /// per-SKU error reasons, concatenated in completion order. Never
    /// fails as a whole.
    pub async fn fetch_all(
        &self,
        skus: &[Sku],
    ) -> (HashMap<Sku, ProductRecord>, Vec<(Sku, String)>) {
        let batches: Vec<Vec<Sku>> = skus
            .chunks(self.config.batch_size)
            .map(|chunk| chunk.to_vec())
            .collect();

        log::info!(
            "Fetching {} SKUs in {} batches (max {} per batch, {} workers)",
            skus.len(),
            batches.len(),
            self.config.batch_size,
            self.config.workers
        );

        let mut outcomes = stream::iter(batches.into_iter().map(|batch| {
            let client = Arc::clone(&self.client);
            let config = self.config.clone();
            async move { fetch_batch_with_retry(client, &config, batch).await }
        }))
        .buffer_unordered(self.config.workers);

        let mut records = HashMap::new();
        let mut errors = Vec::new();

        while let Some(outcome) = outcomes.next().await {
            // Batches tile the input, so a SKU can only arrive once; the
            // entry guard makes the no-overwrite rule explicit anyway.
            for (sku, record) in outcome.records {
                records.entry(sku).or_insert(record);
            }
            errors.extend(outcome.errors);
        }

        log::info!(
            "Catalog fetch resolved {} of {} SKUs ({} errors)",
            records.len(),
            skus.len(),
            errors.len()
        );

        (records, errors)
    }
}

/// One batch through a bounded retry loop with linear backoff. Retries
/// only transport and service-query failures; after the final attempt the
/// batch yields one error entry per SKU and no records.
async fn fetch_batch_with_retry<C: CatalogQuery>(
    client: Arc<C>,
    config: &FetchConfig,
    batch: Vec<Sku>,
) -> BatchOutcome {
    let max_attempts = config.max_retries + 1;
    let mut last_error = String::new();
    let mut attempts_made = 0;

    for attempt in 1..=max_attempts {
        attempts_made = attempt;
        match client.fetch_batch(&batch).await {
            Ok(outcome) => return outcome,
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = Duration::from_millis(config.base_delay_ms * attempt as u64);
                log::warn!(
                    "Catalog batch of {} SKUs failed (attempt {}/{}), retrying in {:?}: {}",
                    batch.len(),
                    attempt,
                    max_attempts,
                    delay,
                    e
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                last_error = e.to_string();
                break;
            }
        }
    }

    log::error!(
        "Catalog batch of {} SKUs failed after {} attempts: {}",
        batch.len(),
        attempts_made,
        last_error
    );

    BatchOutcome {
        records: HashMap::new(),
        errors: batch
            .into_iter()
            .map(|sku| {
                (
                    sku,
                    format!(
                        "catalog fetch failed after {} attempts: {}",
                        attempts_made, last_error
                    ),
                )
            })
            .collect(),
    }
}
