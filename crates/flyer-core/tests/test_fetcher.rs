//! Catalog fetcher integration tests: partitioning, retry bounds, and
//! batch failure isolation, all against an in-process catalog mock.

use async_trait::async_trait;
use flyer_core::clients::catalog::{BatchOutcome, CatalogQuery};
use flyer_core::config::FetchConfig;
use flyer_core::bulk::CatalogFetcher;
use flyer_core::{FlyerError, Result};
use flyer_types::{ProductRecord, Sku};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

fn record_for(sku: &str) -> ProductRecord {
    ProductRecord {
        sku: sku.to_string(),
        variant_title: "Hardcover".to_string(),
        price: "10.00".to_string(),
        title: format!("Book {}", sku),
        image_url: String::new(),
        product_type: String::new(),
        variants: vec![],
        metafields: HashMap::new(),
        edition: None,
    }
}

fn test_config(batch_size: usize, max_retries: u32) -> FetchConfig {
    FetchConfig {
        batch_size,
        workers: 4,
        max_retries,
        base_delay_ms: 0,
        timeout_secs: 1,
    }
}

/// Mock that records every batch it receives and resolves every SKU,
/// except SKUs listed in `always_fail` whose whole batch errors.
struct MockCatalog {
    batches: Mutex<Vec<Vec<Sku>>>,
    attempts: AtomicU32,
    always_fail: HashSet<Sku>,
}

impl MockCatalog {
    fn new() -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            always_fail: HashSet::new(),
        }
    }

    fn failing_on(skus: &[&str]) -> Self {
        Self {
            batches: Mutex::new(Vec::new()),
            attempts: AtomicU32::new(0),
            always_fail: skus.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[async_trait]
impl CatalogQuery for MockCatalog {
    async fn fetch_batch(&self, skus: &[Sku]) -> Result<BatchOutcome> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.batches.lock().unwrap().push(skus.to_vec());

        if skus.iter().any(|sku| self.always_fail.contains(sku)) {
            return Err(FlyerError::CatalogFetch("simulated timeout".to_string()));
        }

        let mut outcome = BatchOutcome::default();
        for sku in skus {
            outcome.records.insert(sku.clone(), record_for(sku));
        }
        Ok(outcome)
    }
}

#[tokio::test]
async fn test_batches_tile_input_exactly() {
    let skus: Vec<Sku> = (0..250).map(|i| format!("ISBN{:04}", i)).collect();
    let client = Arc::new(MockCatalog::new());
    let fetcher = CatalogFetcher::new(Arc::clone(&client), test_config(100, 0));

    let (records, errors) = fetcher.fetch_all(&skus).await;

    assert!(errors.is_empty());
    assert_eq!(records.len(), 250);

    let batches = client.batches.lock().unwrap();
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() <= 100));

    // Every SKU appears in exactly one batch
    let mut seen = HashSet::new();
    for batch in batches.iter() {
        for sku in batch {
            assert!(seen.insert(sku.clone()), "SKU {} batched twice", sku);
        }
    }
    assert_eq!(seen.len(), skus.len());
}

#[tokio::test]
async fn test_always_failing_batch_attempted_retries_plus_one_times() {
    let client = Arc::new(MockCatalog::failing_on(&["ISBN3"]));
    let fetcher = CatalogFetcher::new(Arc::clone(&client), test_config(100, 3));

    let (records, errors) = fetcher.fetch_all(&["ISBN3".to_string()]).await;

    assert_eq!(client.attempts.load(Ordering::SeqCst), 4);
    assert!(records.is_empty());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "ISBN3");
    assert!(errors[0].1.contains("after 4 attempts"));
}

#[tokio::test]
async fn test_failing_batch_does_not_affect_others() {
    // Two batches of one SKU each; the first always times out
    let client = Arc::new(MockCatalog::failing_on(&["BAD"]));
    let fetcher = CatalogFetcher::new(Arc::clone(&client), test_config(1, 1));

    let skus = vec!["BAD".to_string(), "GOOD".to_string()];
    let (records, errors) = fetcher.fetch_all(&skus).await;

    assert_eq!(records.len(), 1);
    assert!(records.contains_key("GOOD"));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].0, "BAD");
}

#[tokio::test]
async fn test_exhausted_batch_reports_every_sku() {
    let client = Arc::new(MockCatalog::failing_on(&["A"]));
    let fetcher = CatalogFetcher::new(Arc::clone(&client), test_config(10, 1));

    // A and B share the failing batch
    let (records, errors) = fetcher
        .fetch_all(&["A".to_string(), "B".to_string()])
        .await;

    assert!(records.is_empty());
    let failed: HashSet<&str> = errors.iter().map(|(sku, _)| sku.as_str()).collect();
    assert_eq!(failed, HashSet::from(["A", "B"]));
}

#[tokio::test]
async fn test_empty_sku_list_makes_no_calls() {
    let client = Arc::new(MockCatalog::new());
    let fetcher = CatalogFetcher::new(Arc::clone(&client), test_config(100, 3));

    let (records, errors) = fetcher.fetch_all(&[]).await;

    assert!(records.is_empty());
    assert!(errors.is_empty());
    assert_eq!(client.attempts.load(Ordering::SeqCst), 0);
}
