//! Configuration management for the flyer pipeline
//!
//! Loaded once at startup from a JSON file, immutable thereafter. The
//! clients receive their sections by value at construction.

use crate::error::{FlyerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlyerConfig {
    pub catalog: CatalogConfig,
    pub compiler: CompilerConfig,

    #[serde(default)]
    pub fetch: FetchConfig,

    #[serde(default)]
    pub content: ContentConfig,
}

/// Shopify Admin API access
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Shop domain, e.g. "example.myshopify.com"
    #[serde(alias = "domain")]
    pub shop_domain: String,

    pub access_token: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl CatalogConfig {
    /// GraphQL endpoint derived from domain and API version
    pub fn graphql_url(&self) -> String {
        format!(
            "https://{}/admin/api/{}/graphql.json",
            self.shop_domain, self.api_version
        )
    }
}

/// HTML-to-PDF compiler service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompilerConfig {
    #[serde(alias = "url")]
    pub base_url: String,

    /// Delay granted to scripts in the flyer markup before rasterization,
    /// in milliseconds
    #[serde(default = "default_javascript_delay_ms")]
    pub javascript_delay_ms: u64,
}

/// Batched catalog fetch limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Service limit on SKUs per query
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Simultaneous batch requests
    #[serde(default = "default_fetch_workers")]
    pub workers: usize,

    /// Retries after the first attempt of a batch
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff; attempt N waits `base_delay_ms * N`
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-call network timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            workers: default_fetch_workers(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Character budgets for the rich-text flyer sections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Shared budget for book description + author bio
    #[serde(default = "default_total_chars")]
    pub total_chars: usize,

    /// Floor ratio either side is guaranteed when both are non-empty
    #[serde(default = "default_min_ratio")]
    pub min_ratio: f64,

    /// Independent budget for the table of contents
    #[serde(default = "default_toc_chars")]
    pub toc_chars: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            total_chars: default_total_chars(),
            min_ratio: default_min_ratio(),
            toc_chars: default_toc_chars(),
        }
    }
}

// Default functions
fn default_api_version() -> String {
    "2025-04".to_string()
}

fn default_javascript_delay_ms() -> u64 {
    1000
}

fn default_batch_size() -> usize {
    100
}

fn default_fetch_workers() -> usize {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_total_chars() -> usize {
    2000
}

fn default_min_ratio() -> f64 {
    0.3
}

fn default_toc_chars() -> usize {
    900
}

impl FlyerConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FlyerError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_json_str(&content)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: FlyerConfig = serde_json::from_str(json)
            .map_err(|e| FlyerError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.catalog.shop_domain.is_empty() {
            return Err(FlyerError::Config("Shop domain is required".to_string()));
        }

        if self.catalog.access_token.is_empty() {
            return Err(FlyerError::Config(
                "Catalog access token is required".to_string(),
            ));
        }

        if self.compiler.base_url.is_empty() {
            return Err(FlyerError::Config(
                "Compiler service URL is required".to_string(),
            ));
        }

        if self.fetch.batch_size == 0 || self.fetch.workers == 0 {
            return Err(FlyerError::Config(
                "Fetch batch size and worker count must be positive".to_string(),
            ));
        }

        if !(self.content.min_ratio > 0.0 && self.content.min_ratio <= 0.5) {
            return Err(FlyerError::Config(format!(
                "Content min ratio {} must be in (0, 0.5]",
                self.content.min_ratio
            )));
        }

        Ok(())
    }
}
