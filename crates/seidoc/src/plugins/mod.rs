//! Plugin traits for the capabilities seidoc does not implement itself.
//!
//! - [`OcrBackend`] - page image to text
//! - [`PageRasterizer`] - PDF page to image
//! - [`EntityRecognizer`] - names and emails in free text
//!
//! Handles are injected as `Arc<dyn Trait>`; there is no global registry.

pub mod ocr;
pub mod rasterizer;
pub mod recognizer;
pub mod traits;

pub use ocr::OcrBackend;
pub use rasterizer::PageRasterizer;
pub use recognizer::{EntityLabel, EntityRecognizer, RecognizedEntity};
pub use traits::Plugin;
