//! Error types for seidoc.
//!
//! **System errors MUST always bubble up unchanged:**
//! - `SeidocError::Io` (from `std::io::Error`) - file system and subprocess spawn failures
//!
//! **Application errors are wrapped with context:**
//! - `Parsing` - PDF structure errors, undecodable engine output
//! - `Validation` - invalid configuration or parameters
//! - `Ocr` - OCR and rasterization failures
//! - `Retrieval` - a browser step failed; carries the step and selector
//! - `ExtractionExhausted` - neither digital text nor OCR produced anything
//!
//! Identifier rejections are not errors: an identifier that fails its checksum
//! is simply absent from the record.
use crate::retrieval::RetrievalError;
use thiserror::Error;

/// Result type alias using `SeidocError`.
pub type Result<T> = std::result::Result<T, SeidocError>;

/// Main error type for all seidoc operations.
#[derive(Debug, Error)]
pub enum SeidocError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parsing error: {message}")]
    Parsing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("OCR error: {message}")]
    Ocr {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Image processing error: {message}")]
    ImageProcessing {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Serialization error: {message}")]
    Serialization {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("No text could be extracted from '{filename}' (digital and OCR both empty)")]
    ExtractionExhausted { filename: String },

    #[error("{stage} timed out after {seconds} seconds")]
    Timeout { stage: String, seconds: u64 },

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error("Secret sealing error: {0}")]
    Sealing(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Plugin error in '{plugin_name}': {message}")]
    Plugin { message: String, plugin_name: String },

    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for SeidocError {
    fn from(err: serde_json::Error) -> Self {
        SeidocError::Serialization {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::pdf::error::PdfError> for SeidocError {
    fn from(err: crate::pdf::error::PdfError) -> Self {
        SeidocError::Parsing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<crate::ocr::error::OcrError> for SeidocError {
    fn from(err: crate::ocr::error::OcrError) -> Self {
        SeidocError::Ocr {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

impl From<image::ImageError> for SeidocError {
    fn from(err: image::ImageError) -> Self {
        SeidocError::ImageProcessing {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }
}

macro_rules! error_constructor {
    ($name:ident, $with_source:ident, $variant:ident) => {
        #[doc = concat!("Create a ", stringify!($variant), " error")]
        pub fn $name<S: Into<String>>(message: S) -> Self {
            Self::$variant {
                message: message.into(),
                source: None,
            }
        }

        #[doc = concat!("Create a ", stringify!($variant), " error with source")]
        pub fn $with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
            message: S,
            source: E,
        ) -> Self {
            Self::$variant {
                message: message.into(),
                source: Some(Box::new(source)),
            }
        }
    };
}

impl SeidocError {
    error_constructor!(parsing, parsing_with_source, Parsing);
    error_constructor!(ocr, ocr_with_source, Ocr);
    error_constructor!(validation, validation_with_source, Validation);
    error_constructor!(image_processing, image_processing_with_source, ImageProcessing);
    error_constructor!(serialization, serialization_with_source, Serialization);

    pub fn timeout<S: Into<String>>(stage: S, seconds: u64) -> Self {
        Self::Timeout {
            stage: stage.into(),
            seconds,
        }
    }

    /// True when neither extraction strategy produced text.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::ExtractionExhausted { .. })
    }
}
