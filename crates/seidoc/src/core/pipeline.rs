//! End-to-end flow: document in, [`ExtractedRecord`] out.

use super::config::PipelineConfig;
use crate::entities::{EntityExtractor, RuleBasedRecognizer};
use crate::extraction::ExtractionStrategySelector;
use crate::identifiers::ProcessIdentifier;
use crate::ocr::{PdftoppmRasterizer, TesseractCliBackend};
use crate::plugins::{EntityRecognizer, OcrBackend, PageRasterizer};
use crate::retrieval::{BrowserSession, Credentials, RetrievalOrchestrator};
use crate::types::{ExtractedRecord, SourceDocument};
use crate::{Result, SeidocError};
use once_cell::sync::Lazy;
use std::path::Path;
use std::sync::Arc;

/// Global Tokio runtime for synchronous operations.
///
/// Created once on first use. If it cannot be built the process has no
/// usable async runtime at all, so failing loudly here is the only option.
static GLOBAL_RUNTIME: Lazy<tokio::runtime::Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to create global Tokio runtime - system may be out of resources")
});

/// A configured extraction pipeline.
///
/// Holds no per-document state: one instance can serve any number of
/// concurrent extractions.
pub struct Pipeline {
    config: PipelineConfig,
    selector: ExtractionStrategySelector,
    extractor: EntityExtractor,
}

impl Pipeline {
    /// Pipeline with the `pdftoppm`/`tesseract` subprocess backends and the
    /// rule-based recognizer.
    pub fn new(config: PipelineConfig) -> Self {
        let rasterizer = Arc::new(PdftoppmRasterizer::new(
            config.ocr.pdftoppm_path.clone(),
            config.ocr.process_timeout_secs,
        ));
        let ocr_backend = Arc::new(TesseractCliBackend::new(
            config.ocr.tesseract_path.clone(),
            config.ocr.process_timeout_secs,
        ));
        Self::with_backends(config, rasterizer, ocr_backend, Arc::new(RuleBasedRecognizer::new()))
    }

    pub fn with_backends(
        config: PipelineConfig,
        rasterizer: Arc<dyn PageRasterizer>,
        ocr_backend: Arc<dyn OcrBackend>,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Self {
        let selector = ExtractionStrategySelector::new(rasterizer, ocr_backend, &config);
        let extractor = EntityExtractor::new(recognizer, config.addresses.clone());
        Self {
            config,
            selector,
            extractor,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract a record from one document.
    ///
    /// # Errors
    ///
    /// - `SeidocError::ExtractionExhausted` when neither the text layer nor
    ///   OCR produced any text
    /// - `SeidocError::Timeout` when the OCR stage exceeds its deadline
    #[cfg_attr(feature = "otel", tracing::instrument(
        skip(self, document),
        fields(document.filename = %document.filename)
    ))]
    pub async fn extract_document(&self, document: SourceDocument) -> Result<ExtractedRecord> {
        let filename = document.filename.clone();
        let process = ProcessIdentifier::from_filename(&filename);

        let outcome = self.selector.extract(document).await?;
        if outcome.text.is_empty() {
            tracing::warn!(filename = %filename, "no text from digital layer or OCR");
            return Err(SeidocError::ExtractionExhausted { filename });
        }

        let extractor = self.extractor.clone();
        let record =
            tokio::task::spawn_blocking(move || extractor.extract(process, &outcome.text, outcome.page_addresses))
                .await
                .map_err(|e| SeidocError::Other(format!("entity extraction task failed: {}", e)))?;

        tracing::info!(
            filename = %filename,
            process = %record.process,
            provenance = %record.provenance,
            addresses = record.addresses.len(),
            "record extracted"
        );
        Ok(record)
    }

    /// Extract from in-memory PDF bytes, e.g. an upload.
    pub async fn extract_bytes(&self, filename: &str, bytes: Vec<u8>) -> Result<ExtractedRecord> {
        self.extract_document(SourceDocument::new(filename, bytes)).await
    }

    /// Extract from a PDF on disk. The file name drives the process number.
    pub async fn extract_file(&self, path: impl AsRef<Path>) -> Result<ExtractedRecord> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| SeidocError::validation(format!("Path has no usable file name: {}", path.display())))?;
        self.extract_bytes(filename, bytes).await
    }

    /// Download the process PDF through `session`, then extract it.
    pub async fn retrieve_and_extract<S>(
        &self,
        orchestrator: &RetrievalOrchestrator,
        session: &mut S,
        credentials: &Credentials,
        process_number: &str,
    ) -> Result<ExtractedRecord>
    where
        S: BrowserSession + ?Sized,
    {
        let document = orchestrator.retrieve(session, credentials, process_number).await?;
        self.extract_document(document).await
    }

    /// Synchronous wrapper for [`Pipeline::extract_bytes`].
    pub fn extract_bytes_sync(&self, filename: &str, bytes: Vec<u8>) -> Result<ExtractedRecord> {
        GLOBAL_RUNTIME.block_on(self.extract_bytes(filename, bytes))
    }

    /// Synchronous wrapper for [`Pipeline::extract_file`].
    pub fn extract_file_sync(&self, path: impl AsRef<Path>) -> Result<ExtractedRecord> {
        GLOBAL_RUNTIME.block_on(self.extract_file(path))
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let pipeline = Pipeline::default();
        let err = pipeline.extract_file("/nonexistent/SEI1.pdf").await.unwrap_err();
        assert!(matches!(err, SeidocError::Io(_)));
    }

    #[test]
    fn test_config_is_kept() {
        let config = PipelineConfig {
            strip_accents: false,
            ..Default::default()
        };
        let pipeline = Pipeline::new(config);
        assert!(!pipeline.config().strip_accents);
    }
}
