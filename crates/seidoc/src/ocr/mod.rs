//! OCR fallback: page rasterization, raster cleanup and recognition.
//!
//! The default backends shell out to `pdftoppm` and `tesseract`. Both run
//! with a bounded timeout and are killed when the caller stops waiting.

pub mod error;
pub mod preprocess;
pub mod rasterizer;
pub(crate) mod subprocess;
pub mod tesseract_backend;
pub mod types;

pub use error::OcrError;
pub use preprocess::preprocess_page;
pub use rasterizer::PdftoppmRasterizer;
pub use tesseract_backend::TesseractCliBackend;
pub use types::{ImagePreprocessingConfig, PSMMode, TesseractConfig};
