//! Page rasterizer plugin trait.

use crate::Result;
use crate::plugins::Plugin;
use async_trait::async_trait;
use image::DynamicImage;

/// Renders individual PDF pages to images for OCR.
#[async_trait]
pub trait PageRasterizer: Plugin {
    /// Number of pages the document has.
    async fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize>;

    /// Render one page. `page_number` is 1-based.
    async fn render_page(&self, pdf_bytes: &[u8], page_number: usize, dpi: u32) -> Result<DynamicImage>;
}
