//! PDF parsing: the digital text layer and page counts.
//!
//! Rasterizing pages for OCR is delegated to a [`PageRasterizer`](crate::plugins::PageRasterizer).

pub mod error;
pub mod text;

pub use error::PdfError;
pub use text::{extract_page_texts, load_document, page_count};
