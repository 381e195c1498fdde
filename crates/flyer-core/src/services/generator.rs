//! Per-SKU flyer generation
//!
//! Composes context building, rendering, and PDF compilation into one
//! fallible unit of work. A job never retries internally: render and
//! compile failures are deterministic, retry belongs to the fetch layer.

use crate::clients::PdfCompiler;
use crate::config::ContentConfig;
use crate::error::{FlyerError, Result};
use crate::services::context::build_context;
use crate::services::renderer::FlyerRenderer;
use flyer_types::ProductRecord;
use std::fmt;
use std::sync::Arc;

/// Stages a job moves through. Terminal states are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStage {
    Pending,
    BuildingContext,
    Rendering,
    Compiling,
    Succeeded,
    Failed,
}

impl fmt::Display for JobStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobStage::Pending => "pending",
            JobStage::BuildingContext => "building context",
            JobStage::Rendering => "rendering",
            JobStage::Compiling => "compiling",
            JobStage::Succeeded => "succeeded",
            JobStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

pub struct FlyerGenerator {
    renderer: Arc<dyn FlyerRenderer>,
    compiler: Arc<dyn PdfCompiler>,
    content: ContentConfig,
}

impl FlyerGenerator {
    pub fn new(
        renderer: Arc<dyn FlyerRenderer>,
        compiler: Arc<dyn PdfCompiler>,
        content: ContentConfig,
    ) -> Self {
        Self {
            renderer,
            compiler,
            content,
        }
    }

    /// Generate one flyer PDF from a resolved record
    pub async fn generate(&self, record: &ProductRecord) -> Result<Vec<u8>> {
        log::debug!("Flyer job {} stage: {}", record.sku, JobStage::BuildingContext);
        let context = build_context(record, &self.content)?;

        log::debug!("Flyer job {} stage: {}", record.sku, JobStage::Rendering);
        let html = self
            .renderer
            .render(&context)
            .map_err(|e| FlyerError::Render(e.to_string()))?;

        log::debug!("Flyer job {} stage: {}", record.sku, JobStage::Compiling);
        let pdf = self.compiler.compile(&html).await?;

        log::debug!(
            "Flyer job {} stage: {} ({} bytes)",
            record.sku,
            JobStage::Succeeded,
            pdf.len()
        );
        Ok(pdf)
    }

    /// Single-record entry point: one already-resolved JSON product
    /// payload in, one PDF out. Empty or absent payloads are rejected
    /// before the pipeline runs.
    pub async fn generate_from_payload(&self, payload: &serde_json::Value) -> Result<Vec<u8>> {
        let record = decode_payload(payload)?;
        self.generate(&record).await
    }

    /// Render the flyer markup for a payload without compiling it.
    /// Used for layout inspection.
    pub fn render_from_payload(&self, payload: &serde_json::Value) -> Result<String> {
        let record = decode_payload(payload)?;
        let context = build_context(&record, &self.content)?;
        self.renderer
            .render(&context)
            .map_err(|e| FlyerError::Render(e.to_string()))
    }
}

fn decode_payload(payload: &serde_json::Value) -> Result<ProductRecord> {
    let empty = match payload {
        serde_json::Value::Null => true,
        serde_json::Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if empty {
        return Err(FlyerError::Input("no product data provided".to_string()));
    }

    serde_json::from_value(payload.clone())
        .map_err(|e| FlyerError::Input(format!("malformed product payload: {}", e)))
}
