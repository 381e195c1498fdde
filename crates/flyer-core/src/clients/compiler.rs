//! HTML-to-PDF compiler service client
//!
//! The rasterization engine runs as a separate wkhtmltopdf-style service;
//! this client ships the flyer markup plus a fixed options record and gets
//! raw PDF bytes back.

use crate::config::CompilerConfig;
use crate::error::{FlyerError, Result};
use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Serialize;
use serde_json::json;

/// Fixed page and rendering options sent with every compile request. Field
/// names follow the wkhtmltopdf flag convention the service expects.
#[derive(Debug, Clone, Serialize)]
pub struct CompileOptions {
    #[serde(rename = "page-size")]
    pub page_size: String,
    #[serde(rename = "margin-top")]
    pub margin_top: String,
    #[serde(rename = "margin-bottom")]
    pub margin_bottom: String,
    #[serde(rename = "margin-left")]
    pub margin_left: String,
    #[serde(rename = "margin-right")]
    pub margin_right: String,
    pub encoding: String,
    #[serde(rename = "print-media-type")]
    pub print_media_type: bool,
    #[serde(rename = "disable-smart-shrinking")]
    pub disable_smart_shrinking: bool,
    #[serde(rename = "javascript-delay")]
    pub javascript_delay_ms: u64,
}

impl CompileOptions {
    /// A4 flyer with zero margins, UTF-8, and a script-execution delay
    pub fn a4_flyer(javascript_delay_ms: u64) -> Self {
        Self {
            page_size: "A4".to_string(),
            margin_top: "0mm".to_string(),
            margin_bottom: "0mm".to_string(),
            margin_left: "0mm".to_string(),
            margin_right: "0mm".to_string(),
            encoding: "UTF-8".to_string(),
            print_media_type: true,
            disable_smart_shrinking: true,
            javascript_delay_ms,
        }
    }
}

/// Document compilation seam. The bulk pipeline only depends on this
/// trait; tests substitute an in-process fake.
#[async_trait]
pub trait PdfCompiler: Send + Sync {
    async fn compile(&self, html: &str) -> Result<Vec<u8>>;
}

pub struct CompilerService {
    config: CompilerConfig,
    options: CompileOptions,
    http_client: HttpClient,
}

impl CompilerService {
    pub fn new(config: CompilerConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .timeout(std::time::Duration::from_secs(60))
            .build()
            .map_err(|e| FlyerError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let options = CompileOptions::a4_flyer(config.javascript_delay_ms);

        Ok(Self {
            config,
            options,
            http_client,
        })
    }

    /// Check compiler service health
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.config.base_url);

        let response = self.http_client.get(&url).send().await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false), // Connection failed
        }
    }
}

#[async_trait]
impl PdfCompiler for CompilerService {
    async fn compile(&self, html: &str) -> Result<Vec<u8>> {
        if html.is_empty() {
            return Err(FlyerError::Compile("no HTML content provided".to_string()));
        }

        let url = format!("{}/generate", self.config.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&json!({
                "html": html,
                "options": self.options,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(FlyerError::Compile(format!(
                "compiler service returned {} - {}",
                status, error_text
            )));
        }

        let pdf_data = response.bytes().await?.to_vec();

        if !pdf_data.starts_with(b"%PDF") {
            return Err(FlyerError::Compile(
                "compiler service returned non-PDF output".to_string(),
            ));
        }

        Ok(pdf_data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_serialize_with_wkhtmltopdf_names() {
        let options = CompileOptions::a4_flyer(1000);
        let value = serde_json::to_value(&options).unwrap();

        assert_eq!(value["page-size"], "A4");
        assert_eq!(value["margin-top"], "0mm");
        assert_eq!(value["encoding"], "UTF-8");
        assert_eq!(value["javascript-delay"], 1000);
        assert_eq!(value["print-media-type"], true);
    }
}
