//! Page rendering through poppler's `pdftoppm`.

use super::subprocess::run_bounded_with_input;
use crate::Result;
use crate::SeidocError;
use crate::ocr::error::OcrError;
use crate::plugins::{PageRasterizer, Plugin};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat};
use std::path::PathBuf;
use tokio::process::Command;

pub const DEFAULT_PDFTOPPM_TIMEOUT_SECS: u64 = 120;

pub struct PdftoppmRasterizer {
    binary: PathBuf,
    timeout_secs: u64,
}

impl PdftoppmRasterizer {
    pub fn new(binary: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs,
        }
    }
}

impl Default for PdftoppmRasterizer {
    fn default() -> Self {
        Self::new("pdftoppm", DEFAULT_PDFTOPPM_TIMEOUT_SECS)
    }
}

impl Plugin for PdftoppmRasterizer {
    fn name(&self) -> &str {
        "pdftoppm"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        match std::process::Command::new(&self.binary).arg("-v").output() {
            Ok(_) => Ok(()),
            Err(e) => Err(SeidocError::MissingDependency(format!(
                "pdftoppm not runnable at '{}' ({}) - install poppler-utils",
                self.binary.display(),
                e
            ))),
        }
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl PageRasterizer for PdftoppmRasterizer {
    async fn page_count(&self, pdf_bytes: &[u8]) -> Result<usize> {
        let bytes = pdf_bytes.to_vec();
        let count = tokio::task::spawn_blocking(move || crate::pdf::page_count(&bytes))
            .await
            .map_err(|e| SeidocError::Other(format!("page count task failed: {}", e)))??;
        Ok(count)
    }

    /// The document goes in on stdin and the PNG comes back on stdout, so
    /// nothing touches the disk per page.
    async fn render_page(&self, pdf_bytes: &[u8], page_number: usize, dpi: u32) -> Result<DynamicImage> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-png")
            .arg("-r")
            .arg(dpi.to_string())
            .arg("-f")
            .arg(page_number.to_string())
            .arg("-l")
            .arg(page_number.to_string())
            .arg("-singlefile")
            .arg("-");

        let output = run_bounded_with_input(command, "pdftoppm", self.timeout_secs, pdf_bytes.to_vec()).await?;
        if output.stdout.is_empty() {
            return Err(OcrError::RasterizationFailed(format!("pdftoppm wrote no image for page {}", page_number)).into());
        }

        let png = output.stdout;
        let image = tokio::task::spawn_blocking(move || image::load_from_memory_with_format(&png, ImageFormat::Png))
            .await
            .map_err(|e| SeidocError::Other(format!("image decode task failed: {}", e)))??;
        Ok(image)
    }
}
