//! Failures reading the digital text layer.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum PdfError {
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),
    #[error("PDF is password-protected")]
    PasswordRequired,
    #[error("PDF has no pages")]
    EmptyDocument,
    #[error("I/O error reading PDF: {0}")]
    Io(String),
}

impl From<lopdf::Error> for PdfError {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(io_err) => PdfError::Io(io_err.to_string()),
            other => PdfError::InvalidPdf(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, PdfError>;
