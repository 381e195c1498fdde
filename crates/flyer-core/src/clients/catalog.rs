//! Shopify Admin GraphQL catalog client
//!
//! One `productVariants` query per batch of SKUs. The loosely-typed wire
//! payload is decoded into the `flyer_types` data model right here, failing
//! closed (empty defaults) per missing field, so nothing downstream ever
//! walks raw JSON.

use crate::config::CatalogConfig;
use crate::error::{FlyerError, Result};
use async_trait::async_trait;
use flyer_types::{ProductRecord, Sku, Variant};
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

const PRODUCTS_BY_SKUS_QUERY: &str = r#"
query GetProductsBySkus($first: Int!, $query: String!) {
  productVariants(first: $first, query: $query) {
    edges {
      node {
        sku
        title
        price
        product {
          title
          productType
          featuredImage {
            url
          }
          variants(first: 10) {
            edges {
              node {
                sku
                title
                price
                metafield(namespace: "custom", key: "edition") {
                  value
                }
              }
            }
          }
          metafields(first: 100) {
            edges {
              node {
                namespace
                key
                value
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// Records and per-SKU extraction failures of one successful batch query
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub records: HashMap<Sku, ProductRecord>,
    pub errors: Vec<(Sku, String)>,
}

/// One batch query against the catalog. Implemented by [`CatalogClient`];
/// the fetcher is generic over it so tests can substitute a mock.
#[async_trait]
pub trait CatalogQuery: Send + Sync {
    /// Resolve up to a service-limit worth of SKUs in one call. Transport
    /// and service-query failures are errors (retryable at the batch
    /// level); malformed individual records are reported inside the
    /// outcome and never fail the batch.
    async fn fetch_batch(&self, skus: &[Sku]) -> Result<BatchOutcome>;
}

pub struct CatalogClient {
    config: CatalogConfig,
    http_client: HttpClient,
}

impl CatalogClient {
    pub fn new(config: CatalogConfig, timeout: Duration) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FlyerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl CatalogQuery for CatalogClient {
    async fn fetch_batch(&self, skus: &[Sku]) -> Result<BatchOutcome> {
        let sku_query = skus
            .iter()
            .map(|sku| format!("sku:{}", sku))
            .collect::<Vec<_>>()
            .join(" OR ");

        let body = json!({
            "query": PRODUCTS_BY_SKUS_QUERY,
            "variables": {
                "first": skus.len(),
                "query": sku_query,
            }
        });

        let response = self
            .http_client
            .post(self.config.graphql_url())
            .header("X-Shopify-Access-Token", &self.config.access_token)
            .header("Accept", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FlyerError::CatalogFetch(format!(
                "catalog service returned {} - {}",
                status, error_text
            )));
        }

        let payload: GraphQlResponse = response.json().await?;

        if let Some(errors) = payload.errors {
            if !errors.is_empty() {
                let messages = errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(FlyerError::CatalogFetch(format!(
                    "catalog query errors: {}",
                    messages
                )));
            }
        }

        let edges = payload
            .data
            .map(|d| d.product_variants.edges)
            .unwrap_or_default();

        log::debug!(
            "Catalog batch of {} SKUs returned {} variant nodes",
            skus.len(),
            edges.len()
        );

        Ok(extract_records(edges))
    }
}

/// Build `ProductRecord`s from the decoded variant nodes. Nodes without a
/// SKU are skipped silently; a node without product data contributes a
/// per-SKU reason instead of a record.
fn extract_records(edges: Vec<Edge<VariantNode>>) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for edge in edges {
        let node = edge.node;
        let sku = match node.sku {
            Some(sku) if !sku.is_empty() => sku,
            _ => continue,
        };

        let product = match node.product {
            Some(product) => product,
            None => {
                log::error!("Catalog returned variant {} without product data", sku);
                let reason =
                    FlyerError::RecordExtraction("variant has no product data".to_string());
                outcome.errors.push((sku, reason.to_string()));
                continue;
            }
        };

        let mut metafields = HashMap::new();
        for mf_edge in product.metafields.edges {
            let mf = mf_edge.node;
            if let Some(value) = mf.value {
                if !mf.namespace.is_empty() && !mf.key.is_empty() {
                    metafields.insert(format!("{}_{}", mf.namespace, mf.key), value);
                }
            }
        }

        let variants: Vec<Variant> = product
            .variants
            .edges
            .into_iter()
            .map(|v_edge| {
                let v = v_edge.node;
                Variant {
                    sku: v.sku.unwrap_or_default(),
                    title: v.title,
                    price: v.price,
                    edition: v.metafield.map(|m| m.value).unwrap_or_default(),
                }
            })
            .collect();

        // The edition lives on the variant entry whose SKU matches the
        // outer variant node
        let edition = variants
            .iter()
            .find(|v| v.sku == sku)
            .map(|v| v.edition.clone())
            .filter(|e| !e.is_empty());

        outcome.records.insert(
            sku.clone(),
            ProductRecord {
                sku,
                variant_title: node.title,
                price: node.price,
                title: product.title,
                image_url: product.featured_image.map(|i| i.url).unwrap_or_default(),
                product_type: product.product_type,
                variants,
                metafields,
                edition,
            },
        );
    }

    outcome
}

// Wire payload shapes. Everything defaults so a sparse response decodes
// instead of erroring.

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<ResponseData>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponseData {
    #[serde(default)]
    product_variants: Connection<VariantNode>,
}

#[derive(Debug, Deserialize)]
struct Connection<T> {
    #[serde(default)]
    edges: Vec<Edge<T>>,
}

impl<T> Default for Connection<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct Edge<T> {
    node: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    product: Option<ProductNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductNode {
    #[serde(default)]
    title: String,
    #[serde(default)]
    product_type: String,
    #[serde(default)]
    featured_image: Option<Image>,
    #[serde(default)]
    variants: Connection<InnerVariantNode>,
    #[serde(default)]
    metafields: Connection<MetafieldNode>,
}

#[derive(Debug, Deserialize)]
struct Image {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InnerVariantNode {
    #[serde(default)]
    sku: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    metafield: Option<MetafieldValue>,
}

#[derive(Debug, Deserialize)]
struct MetafieldValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Default, Deserialize)]
struct MetafieldNode {
    #[serde(default)]
    namespace: String,
    #[serde(default)]
    key: String,
    #[serde(default)]
    value: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn variant_json(sku: &str) -> serde_json::Value {
        json!({
            "node": {
                "sku": sku,
                "title": "Hardcover",
                "price": "49.99",
                "product": {
                    "title": "A Book",
                    "productType": "Science",
                    "featuredImage": { "url": "https://cdn.example.com/cover.jpg" },
                    "variants": {
                        "edges": [
                            {
                                "node": {
                                    "sku": sku,
                                    "title": "Hardcover",
                                    "price": "49.99",
                                    "metafield": { "value": "2nd" }
                                }
                            },
                            {
                                "node": {
                                    "sku": "OTHER",
                                    "title": "Paperback",
                                    "price": "19.99",
                                    "metafield": null
                                }
                            }
                        ]
                    },
                    "metafields": {
                        "edges": [
                            { "node": { "namespace": "custom", "key": "subject", "value": "[\"Physics\"]" } },
                            { "node": { "namespace": "custom", "key": "pages", "value": "320" } },
                            { "node": { "namespace": "custom", "key": "broken", "value": null } }
                        ]
                    }
                }
            }
        })
    }

    fn decode_edges(value: serde_json::Value) -> Vec<Edge<VariantNode>> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_extract_full_record() {
        let edges = decode_edges(json!([variant_json("ISBN1")]));
        let outcome = extract_records(edges);

        assert!(outcome.errors.is_empty());
        let record = &outcome.records["ISBN1"];
        assert_eq!(record.title, "A Book");
        assert_eq!(record.product_type, "Science");
        assert_eq!(record.image_url, "https://cdn.example.com/cover.jpg");
        assert_eq!(record.metafield("custom_subject"), "[\"Physics\"]");
        assert_eq!(record.metafield("custom_pages"), "320");
        // Null metafield values are dropped, not stored as empty
        assert!(!record.metafields.contains_key("custom_broken"));
        assert_eq!(record.edition.as_deref(), Some("2nd"));
        assert_eq!(record.variants.len(), 2);
    }

    #[test]
    fn test_variant_without_sku_skipped_silently() {
        let mut variant = variant_json("ISBN1");
        variant["node"]["sku"] = serde_json::Value::Null;
        let outcome = extract_records(decode_edges(json!([variant])));

        assert!(outcome.records.is_empty());
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn test_variant_without_product_reported() {
        let mut variant = variant_json("ISBN2");
        variant["node"]["product"] = serde_json::Value::Null;
        let outcome = extract_records(decode_edges(json!([variant])));

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].0, "ISBN2");
    }

    #[test]
    fn test_edition_absent_when_no_matching_variant() {
        let mut variant = variant_json("ISBN3");
        variant["node"]["product"]["variants"]["edges"] = json!([]);
        let outcome = extract_records(decode_edges(json!([variant])));

        assert_eq!(outcome.records["ISBN3"].edition, None);
    }

    #[test]
    fn test_sparse_wire_payload_decodes() {
        let payload: GraphQlResponse =
            serde_json::from_str("{\"data\":{\"productVariants\":{}}}").unwrap();
        assert!(payload.data.unwrap().product_variants.edges.is_empty());
    }
}
