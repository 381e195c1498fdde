//! Shared types for the flyer generation pipeline

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stock-keeping unit identifier. Opaque: the pipeline never normalises
/// case or format, the catalog service is queried with the value as given.
pub type Sku = String;

/// One resolved catalog record, keyed by the SKU it was looked up under.
/// The same underlying product may back several records (one per variant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    /// SKU of the variant this record was resolved for
    pub sku: Sku,
    /// Title of that variant (e.g. "Hardcover")
    pub variant_title: String,
    /// Price of that variant
    pub price: String,
    /// Parent product title
    pub title: String,
    /// Featured image URL, empty if the product has none
    #[serde(default)]
    pub image_url: String,
    /// Product category/type as reported by the catalog
    #[serde(default)]
    pub product_type: String,
    /// Full variant list of the parent product
    #[serde(default)]
    pub variants: Vec<Variant>,
    /// Metafields keyed `namespace_key` (e.g. `custom_about_the_book`)
    #[serde(default)]
    pub metafields: HashMap<String, String>,
    /// Edition metafield of the variant matching `sku`, if any
    #[serde(default)]
    pub edition: Option<String>,
}

impl ProductRecord {
    /// Metafield lookup that reads absent keys as empty, never fails.
    pub fn metafield(&self, key: &str) -> &str {
        self.metafields.get(key).map(String::as_str).unwrap_or("")
    }
}

/// A single product variant as listed on the parent product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Variant {
    pub sku: Sku,
    pub title: String,
    pub price: String,
    #[serde(default)]
    pub edition: String,
}

/// Character budget shared between the book description and the author bio.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentBudget {
    pub total_chars: usize,
    pub min_ratio: f64,
    pub max_ratio: f64,
}

impl ContentBudget {
    /// Build a budget, enforcing `0 < min <= 0.5 <= max < 1` and
    /// `min + max == 1`.
    pub fn new(total_chars: usize, min_ratio: f64) -> Result<Self, String> {
        if total_chars == 0 {
            return Err("content budget must be positive".to_string());
        }
        if !(min_ratio > 0.0 && min_ratio <= 0.5) {
            return Err(format!(
                "min ratio {} must be in (0, 0.5]",
                min_ratio
            ));
        }
        Ok(Self {
            total_chars,
            min_ratio,
            max_ratio: 1.0 - min_ratio,
        })
    }
}

impl Default for ContentBudget {
    fn default() -> Self {
        Self {
            total_chars: 2000,
            min_ratio: 0.3,
            max_ratio: 0.7,
        }
    }
}

/// Flat field set consumed by the renderer. Fully derived from one
/// `ProductRecord`; never reused across SKUs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderContext {
    pub product_title: String,
    pub product_image: String,
    pub product_category: String,
    pub subject: String,
    pub publisher: String,
    pub publisher_imprint: String,
    pub publishing_date: String,
    pub pages: String,
    pub volume: String,
    pub author: String,
    pub isbn: String,
    pub price: String,
    pub edition: String,
    pub variants: Vec<VariantLine>,
    /// Budget-bounded HTML fragment
    pub book_desc: String,
    /// Budget-bounded HTML fragment
    pub about_author: String,
    /// Budget-bounded HTML fragment, truncated independently
    pub toc: String,
    pub current_year: i32,
}

/// One row of the variant table on the flyer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariantLine {
    pub isbn: String,
    pub title: String,
    pub price: String,
    pub edition: String,
}

/// Outcome of one per-SKU generation job. Exactly one of `pdf` / `error`
/// is populated.
#[derive(Debug, Clone)]
pub struct JobResult {
    pub sku: Sku,
    pub pdf: Option<Vec<u8>>,
    pub error: Option<String>,
}

impl JobResult {
    pub fn success(sku: Sku, pdf: Vec<u8>) -> Self {
        Self {
            sku,
            pdf: Some(pdf),
            error: None,
        }
    }

    pub fn failure(sku: Sku, reason: impl Into<String>) -> Self {
        Self {
            sku,
            pdf: None,
            error: Some(reason.into()),
        }
    }
}

/// Aggregated outcome of a bulk run. `failed` is in completion order, not
/// submission order.
#[derive(Debug, Clone, Default)]
pub struct RunResult {
    pub succeeded: HashMap<Sku, Vec<u8>>,
    pub failed: Vec<(Sku, String)>,
}

impl RunResult {
    pub fn merge(&mut self, result: JobResult) {
        match (result.pdf, result.error) {
            (Some(pdf), _) => {
                self.succeeded.insert(result.sku, pdf);
            }
            (None, Some(reason)) => {
                self.failed.push((result.sku, reason));
            }
            (None, None) => {
                self.failed
                    .push((result.sku, "job produced no output".to_string()));
            }
        }
    }
}

/// Live progress snapshot emitted after every job completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub completed: usize,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// How the successful PDFs of a run are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// One combined PDF, ordered by input SKU order
    Merged,
    /// One ZIP with a `flyer_<sku>.pdf` entry per success
    Archive,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_budget_validation() {
        let budget = ContentBudget::new(2000, 0.3).unwrap();
        assert_eq!(budget.total_chars, 2000);
        assert!((budget.max_ratio - 0.7).abs() < f64::EPSILON);

        assert!(ContentBudget::new(0, 0.3).is_err());
        assert!(ContentBudget::new(2000, 0.0).is_err());
        assert!(ContentBudget::new(2000, 0.6).is_err());
    }

    #[test]
    fn test_run_result_merge() {
        let mut run = RunResult::default();
        run.merge(JobResult::success("A".to_string(), vec![1, 2, 3]));
        run.merge(JobResult::failure("B".to_string(), "boom"));

        assert_eq!(run.succeeded.len(), 1);
        assert_eq!(run.failed, vec![("B".to_string(), "boom".to_string())]);
    }

    #[test]
    fn test_metafield_defaults_to_empty() {
        let record = ProductRecord {
            sku: "X".to_string(),
            variant_title: String::new(),
            price: "0.00".to_string(),
            title: "T".to_string(),
            image_url: String::new(),
            product_type: String::new(),
            variants: vec![],
            metafields: HashMap::new(),
            edition: None,
        };
        assert_eq!(record.metafield("custom_subject"), "");
    }
}
