//! Failures from the rasterizer and the recognizer.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum OcrError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Page rasterization failed: {0}")]
    RasterizationFailed(String),
    #[error("OCR processing failed: {0}")]
    ProcessingFailed(String),
}
