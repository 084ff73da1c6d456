//! seidoc - retrieval and structured extraction of SEI process PDFs
//!
//! Takes a process PDF (uploaded, or downloaded from the SEI portal through
//! an automated browser) and produces an [`ExtractedRecord`]: subject name,
//! validated CPF/CNPJ, emails, counterparts, and postal addresses tagged
//! with where they were found.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use seidoc::{Pipeline, PipelineConfig};
//!
//! # fn main() -> seidoc::Result<()> {
//! let pipeline = Pipeline::new(PipelineConfig::default());
//! let record = pipeline.extract_file_sync("SEI 253511234562023.pdf")?;
//! println!("{}", record.identifier_line());
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - **Text** (`text`): mojibake repair and normalization
//! - **Identifiers** (`identifiers`): CPF/CNPJ checksums, process numbers
//! - **Extraction** (`extraction`): text layer first, OCR fallback
//! - **Entities** (`entities`): names, emails, addresses, counterparts
//! - **Retrieval** (`retrieval`): portal login and download
//! - **Plugins** (`plugins`): OCR, rasterizer and recognizer seams

#![deny(unsafe_code)]

pub mod core;
pub mod entities;
pub mod error;
pub mod extraction;
pub mod identifiers;
pub mod ocr;
pub mod pdf;
pub mod plugins;
pub mod retrieval;
pub mod text;
pub mod types;

pub use error::{Result, SeidocError};

pub use core::config::{OcrConfig, PipelineConfig};
pub use core::pipeline::Pipeline;
pub use entities::{AddressConfig, EntityExtractor, RuleBasedRecognizer};
pub use extraction::{ExtractionStrategySelector, StrategyOutcome, StrategyPolicy};
pub use identifiers::{NationalIdentifier, ProcessIdentifier, validate_cnpj, validate_cpf};
pub use retrieval::{Credentials, EphemeralSealer, RetrievalError, RetrievalOrchestrator, SecretSealer};
pub use types::{
    AddressField, AddressRecord, AddressSource, ExtractedRecord, ExtractedText, FieldValue, NOT_INFORMED, Provenance,
    SourceDocument,
};
