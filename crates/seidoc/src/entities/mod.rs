//! Structured fields from normalized document text.
//!
//! [`EntityExtractor::extract`] turns an [`ExtractedText`] into an
//! [`ExtractedRecord`]: subject name and emails through the injected
//! [`EntityRecognizer`], CPF/CNPJ through their checksum validators,
//! addresses per page block with their provenance, and counterparts.

pub mod addresses;
pub mod counterparts;
pub mod recognizer;

pub use addresses::{AddressScanner, detect_block_source};
pub use counterparts::extract_counterparts;
pub use recognizer::RuleBasedRecognizer;

use crate::identifiers::{NationalIdentifier, ProcessIdentifier};
use crate::plugins::{EntityLabel, EntityRecognizer};
use crate::types::{AddressRecord, ExtractedRecord, ExtractedText};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::Arc;

static CNPJ_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CNPJ:\s*([\d./-]{14,18})").expect("CNPJ regex pattern is valid and should compile"));
static CPF_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"CPF:\s*([\d./-]{11,14})").expect("CPF regex pattern is valid and should compile"));

const FIELD_LABELS: &str = r"Endere[cç]o|End|Cidade|Bairro|Estado|UF|CEP|Munic[ií]pio|Complemento|Telefone|E-?mail|CNPJ|CPF|OAB";

static LINE_BREAK_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)[\n\r\x0C]\s*(?:{})\b", FIELD_LABELS))
        .expect("Line break label regex pattern is valid and should compile")
});
static TRAILING_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:^|\s+)(?:{})\s*$", FIELD_LABELS))
        .expect("Trailing label regex pattern is valid and should compile")
});
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Whitespace regex pattern is valid and should compile"));

/// Cut a greedy capture back to its own field.
///
/// Captures that run across lines stop where a line opens with another
/// field label; a label word swallowed at the end (the `Cidade` in
/// `Rua X, 10 Cidade: ...`) is dropped. Whitespace collapses to single spaces.
pub(crate) fn tidy_capture(raw: &str) -> String {
    let own_field = match LINE_BREAK_LABEL.find(raw) {
        Some(m) => &raw[..m.start()],
        None => raw,
    };
    let collapsed = WHITESPACE.replace_all(own_field, " ");
    TRAILING_LABEL.replace(collapsed.trim(), "").trim().to_string()
}

/// The first labeled CNPJ, if it passes its checksum.
///
/// Later labels belong to other parties and are never consulted.
pub fn find_cnpj(text: &str) -> Option<NationalIdentifier> {
    CNPJ_CANDIDATE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| NationalIdentifier::cnpj(m.as_str()))
}

/// The first labeled CPF, if it passes its checksum.
pub fn find_cpf(text: &str) -> Option<NationalIdentifier> {
    CPF_CANDIDATE
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| NationalIdentifier::cpf(m.as_str()))
}

/// Address scanning options.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AddressConfig {
    /// Streets shorter than this (in characters) are treated as noise.
    #[serde(default = "default_min_street_len")]
    pub min_street_len: usize,
    /// Also scan each OCR page with the lenient patterns.
    #[serde(default = "default_scan_ocr_pages")]
    pub scan_ocr_pages: bool,
}

fn default_min_street_len() -> usize {
    15
}

fn default_scan_ocr_pages() -> bool {
    true
}

impl Default for AddressConfig {
    fn default() -> Self {
        Self {
            min_street_len: default_min_street_len(),
            scan_ocr_pages: default_scan_ocr_pages(),
        }
    }
}

#[derive(Clone)]
pub struct EntityExtractor {
    recognizer: Arc<dyn EntityRecognizer>,
    config: AddressConfig,
}

impl EntityExtractor {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>, config: AddressConfig) -> Self {
        Self { recognizer, config }
    }

    /// Build the record for one document.
    ///
    /// `page_addresses` are addresses already found on individual OCR pages;
    /// they are appended after the block addresses. Missing fields stay
    /// empty; a failing recognizer only costs the name and emails.
    pub fn extract(
        &self,
        process: ProcessIdentifier,
        text: &ExtractedText,
        page_addresses: Vec<AddressRecord>,
    ) -> ExtractedRecord {
        let content = text.content.as_str();
        let entities = match self.recognizer.recognize(content) {
            Ok(entities) => entities,
            Err(e) => {
                tracing::warn!(recognizer = self.recognizer.name(), error = %e, "entity recognition failed");
                Vec::new()
            }
        };

        let subject_name = entities
            .iter()
            .filter(|e| e.is_name())
            .min_by_key(|e| e.start)
            .map(|e| e.text.trim().to_string())
            .filter(|name| !name.is_empty());

        let emails: BTreeSet<String> = entities
            .iter()
            .filter(|e| e.label == EntityLabel::Email)
            .map(|e| e.text.trim().to_string())
            .filter(|email| !email.is_empty())
            .collect();

        let scanner = AddressScanner::labeled(self.config.min_street_len);
        let mut addresses: Vec<AddressRecord> = text
            .blocks()
            .flat_map(|block| scanner.scan(block, &detect_block_source(block)))
            .collect();
        addresses.extend(page_addresses);

        let record = ExtractedRecord {
            process,
            subject_name,
            cpf: find_cpf(content),
            cnpj: find_cnpj(content),
            emails: emails.into_iter().collect(),
            addresses,
            counterparts: extract_counterparts(content),
            provenance: text.provenance,
        };

        tracing::debug!(
            process = %record.process,
            addresses = record.addresses.len(),
            emails = record.emails.len(),
            has_identifier = record.identifier().is_some(),
            "entities extracted"
        );

        record
    }
}
