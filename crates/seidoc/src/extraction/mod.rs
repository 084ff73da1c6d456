//! Text acquisition: the PDF text layer first, page OCR when it is unusable.
//!
//! ```text
//! Start -> Digital --(accepted)--> Done(Digital)
//!            |
//!            +--(empty or rejected)--> Ocr -> Done(Ocr) | Done(empty)
//! ```
//!
//! A document whose text layer cannot be parsed at all is treated the same
//! as one with an empty text layer. Individual OCR page failures produce an
//! empty page; only the stage deadline aborts the OCR pass.

pub mod strategy;

pub use strategy::{DigitalTextStats, StrategyDecision, StrategyPolicy};

use crate::core::config::{OcrConfig, PipelineConfig};
use crate::entities::{AddressConfig, AddressScanner};
use crate::ocr::preprocess_page;
use crate::plugins::{OcrBackend, PageRasterizer};
use crate::text::{clean_text, join_pages};
use crate::types::{AddressRecord, AddressSource, ExtractedText, Provenance, SourceDocument};
use crate::{Result, SeidocError};
use std::sync::Arc;
use std::time::Duration;

/// Text of one document plus any addresses found on individual OCR pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutcome {
    pub text: ExtractedText,
    pub page_addresses: Vec<AddressRecord>,
}

impl StrategyOutcome {
    fn empty(provenance: Provenance) -> Self {
        Self {
            text: ExtractedText::empty(provenance),
            page_addresses: Vec::new(),
        }
    }
}

pub struct ExtractionStrategySelector {
    rasterizer: Arc<dyn PageRasterizer>,
    ocr_backend: Arc<dyn OcrBackend>,
    policy: StrategyPolicy,
    ocr: OcrConfig,
    addresses: AddressConfig,
    strip_accents: bool,
}

impl ExtractionStrategySelector {
    pub fn new(
        rasterizer: Arc<dyn PageRasterizer>,
        ocr_backend: Arc<dyn OcrBackend>,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            rasterizer,
            ocr_backend,
            policy: config.strategy.clone(),
            ocr: config.ocr.clone(),
            addresses: config.addresses.clone(),
            strip_accents: config.strip_accents,
        }
    }

    /// Consume the document and produce its normalized text.
    ///
    /// # Errors
    ///
    /// Only `SeidocError::Timeout` when the OCR stage exceeds its configured
    /// deadline. Unreadable documents yield an empty outcome instead.
    #[cfg_attr(feature = "otel", tracing::instrument(
        skip(self, document),
        fields(
            document.filename = %document.filename,
            document.size_bytes = document.bytes.len(),
        )
    ))]
    pub async fn extract(&self, document: SourceDocument) -> Result<StrategyOutcome> {
        let SourceDocument { filename, bytes } = document;
        let bytes: Arc<[u8]> = bytes.into();

        if !self.policy.force_ocr {
            let digital = self.extract_digital(&bytes).await;
            let decision = self.policy.evaluate(&digital.content);
            if !decision.fallback {
                tracing::info!(
                    filename = %filename,
                    pages = digital.page_count,
                    chars = decision.stats.non_whitespace,
                    "using digital text layer"
                );
                return Ok(StrategyOutcome {
                    text: digital,
                    page_addresses: Vec::new(),
                });
            }
            tracing::info!(
                filename = %filename,
                chars = decision.stats.non_whitespace,
                "text layer rejected, falling back to OCR"
            );
        }

        self.extract_ocr(&filename, &bytes).await
    }

    async fn extract_digital(&self, bytes: &Arc<[u8]>) -> ExtractedText {
        let shared = Arc::clone(bytes);
        let pages = match tokio::task::spawn_blocking(move || crate::pdf::extract_page_texts(&shared)).await {
            Ok(Ok(pages)) => pages,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "text layer unreadable");
                return ExtractedText::empty(Provenance::Digital);
            }
            Err(e) => {
                tracing::warn!(error = %e, "text layer task failed");
                return ExtractedText::empty(Provenance::Digital);
            }
        };

        let page_count = pages.len();
        let content = join_pages(pages.iter().map(|page| clean_text(page, self.strip_accents)));
        ExtractedText {
            content,
            provenance: Provenance::Digital,
            page_count,
        }
    }

    async fn extract_ocr(&self, filename: &str, bytes: &[u8]) -> Result<StrategyOutcome> {
        let pass = self.run_ocr(filename, bytes);
        match self.ocr.timeout_secs {
            Some(secs) => tokio::time::timeout(Duration::from_secs(secs), pass)
                .await
                .map_err(|_| SeidocError::timeout("OCR", secs))?,
            None => pass.await,
        }
    }

    async fn run_ocr(&self, filename: &str, bytes: &[u8]) -> Result<StrategyOutcome> {
        let page_count = match self.rasterizer.page_count(bytes).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(filename = %filename, error = %e, "cannot rasterize document");
                return Ok(StrategyOutcome::empty(Provenance::Ocr));
            }
        };

        let scanner = AddressScanner::lenient(self.addresses.min_street_len);
        let mut pages = Vec::with_capacity(page_count);
        let mut page_addresses = Vec::new();

        for page_number in 1..=page_count {
            let raw = match self.recognize_page(bytes, page_number).await {
                Ok(text) => text,
                Err(e) => {
                    tracing::warn!(filename = %filename, page = page_number, error = %e, "OCR failed for page");
                    String::new()
                }
            };

            let cleaned = clean_text(&raw, self.strip_accents);
            if self.addresses.scan_ocr_pages && !cleaned.is_empty() {
                let source = AddressSource::Page {
                    filename: filename.to_string(),
                    page: page_number,
                };
                page_addresses.extend(scanner.scan(&cleaned, &source));
            }
            pages.push(cleaned);
        }

        let content = join_pages(&pages);
        tracing::info!(
            filename = %filename,
            pages = page_count,
            chars = content.len(),
            page_addresses = page_addresses.len(),
            "OCR pass finished"
        );

        Ok(StrategyOutcome {
            text: ExtractedText {
                content,
                provenance: Provenance::Ocr,
                page_count,
            },
            page_addresses,
        })
    }

    async fn recognize_page(&self, bytes: &[u8], page_number: usize) -> Result<String> {
        let image = self.rasterizer.render_page(bytes, page_number, self.ocr.dpi).await?;
        let preprocessing = self.ocr.preprocessing.clone();
        let cleaned = tokio::task::spawn_blocking(move || preprocess_page(&image, &preprocessing))
            .await
            .map_err(|e| SeidocError::Other(format!("page preprocessing task failed: {}", e)))?;
        self.ocr_backend.process_image(cleaned, &self.ocr.tesseract).await
    }
}
