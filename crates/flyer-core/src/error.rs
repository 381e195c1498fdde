//! Error types for the flyer pipeline

use thiserror::Error;

/// Main error type for all flyer pipeline operations
#[derive(Error, Debug)]
pub enum FlyerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Catalog fetch failed: {0}")]
    CatalogFetch(String),

    #[error("Record extraction failed: {0}")]
    RecordExtraction(String),

    #[error("No catalog record for SKU: {0}")]
    MissingRecord(String),

    #[error("Flyer rendering failed: {0}")]
    Render(String),

    #[error("PDF compilation failed: {0}")]
    Compile(String),

    #[error("Aggregation failed: {0}")]
    Aggregation(String),
}

impl FlyerError {
    /// Whether a retry at the batch level may succeed. Only transport and
    /// service-query failures qualify; everything else is deterministic.
    pub fn is_retryable(&self) -> bool {
        matches!(self, FlyerError::Http(_) | FlyerError::CatalogFetch(_))
    }
}

/// Result type for flyer pipeline operations
pub type Result<T> = std::result::Result<T, FlyerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(FlyerError::CatalogFetch("timeout".to_string()).is_retryable());
        assert!(!FlyerError::Render("bad context".to_string()).is_retryable());
        assert!(!FlyerError::MissingRecord("X".to_string()).is_retryable());
        assert!(!FlyerError::Compile("engine".to_string()).is_retryable());
    }
}
