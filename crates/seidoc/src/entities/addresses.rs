//! Labeled address fields aligned into records.
//!
//! Each field is matched independently over a block of text and the i-th
//! match of every field is taken to belong to the i-th address. The portal
//! renders addresses as consistent label blocks, so position is a reliable
//! join key in practice; a block with an address missing one label will
//! shift the remaining fields of that label by one.

use super::tidy_capture;
use crate::types::{AddressRecord, AddressSource, FieldValue};
use once_cell::sync::Lazy;
use regex::Regex;

/// The five field patterns used for one scanning flavor.
pub struct AddressPatterns {
    street: Regex,
    city: Regex,
    district: Regex,
    state: Regex,
    postal_code: Regex,
}

/// Labels followed by a colon, as in digitally generated documents.
static LABELED: Lazy<AddressPatterns> = Lazy::new(|| AddressPatterns {
    street: Regex::new(r"(?i)\b(?:Endere[cç]o|End)\s*:\s*([\w\s.,ºª-]+)")
        .expect("Street regex pattern is valid and should compile"),
    city: Regex::new(r"(?i)\bCidade\s*:\s*([\w\s]+)").expect("City regex pattern is valid and should compile"),
    district: Regex::new(r"(?i)\bBairro\s*:\s*([\w\s]+)").expect("District regex pattern is valid and should compile"),
    state: Regex::new(r"(?i)\b(?:Estado|UF)\s*:\s*([A-Z]{2})\b")
        .expect("State regex pattern is valid and should compile"),
    postal_code: Regex::new(r"(?i)\bCEP\s*:\s*(\d{2}\.\d{3}-\d{3}|\d{5}-\d{3})")
        .expect("Postal code regex pattern is valid and should compile"),
});

/// OCR output often drops the colon; accept whitespace as the separator.
static LENIENT: Lazy<AddressPatterns> = Lazy::new(|| AddressPatterns {
    street: Regex::new(r"(?i)\bEndere[cç]o[:\s]+([\w\s.,/ºª-]+)")
        .expect("Lenient street regex pattern is valid and should compile"),
    city: Regex::new(r"(?i)\bCidade[:\s]+([\w\s]+)").expect("Lenient city regex pattern is valid and should compile"),
    district: Regex::new(r"(?i)\bBairro[:\s]+([\w\s]+)")
        .expect("Lenient district regex pattern is valid and should compile"),
    state: Regex::new(r"(?i)\bEstado[:\s]+([A-Z]{2})\b")
        .expect("Lenient state regex pattern is valid and should compile"),
    postal_code: Regex::new(r"(?i)\bCEP[:\s]+(\d[\d.-]*\d)")
        .expect("Lenient postal code regex pattern is valid and should compile"),
});

static AR_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAR\b").expect("AR marker regex pattern is valid and should compile"));
static AIS_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bAIS\b").expect("AIS marker regex pattern is valid and should compile"));

#[derive(Clone, Copy)]
pub struct AddressScanner {
    patterns: &'static AddressPatterns,
    min_street_len: usize,
}

impl AddressScanner {
    /// Scanner for `Label: value` text.
    pub fn labeled(min_street_len: usize) -> Self {
        Self {
            patterns: &LABELED,
            min_street_len,
        }
    }

    /// Scanner tolerant of OCR noise around labels.
    pub fn lenient(min_street_len: usize) -> Self {
        Self {
            patterns: &LENIENT,
            min_street_len,
        }
    }

    /// Align field matches positionally and keep records with a long enough street.
    pub fn scan(&self, text: &str, source: &AddressSource) -> Vec<AddressRecord> {
        let streets = captures(&self.patterns.street, text);
        let cities = captures(&self.patterns.city, text);
        let districts = captures(&self.patterns.district, text);
        let states: Vec<String> = captures(&self.patterns.state, text)
            .into_iter()
            .map(|s| s.to_uppercase())
            .collect();
        let postal_codes = captures(&self.patterns.postal_code, text);

        let groups = [&streets, &cities, &districts, &states, &postal_codes]
            .iter()
            .map(|v| v.len())
            .max()
            .unwrap_or(0);

        (0..groups)
            .filter_map(|i| {
                let field = |values: &[String]| FieldValue::from_capture(values.get(i).map(String::as_str));
                AddressRecord::new(
                    field(&streets),
                    field(&cities),
                    field(&districts),
                    field(&states),
                    field(&postal_codes),
                    source.clone(),
                    self.min_street_len,
                )
            })
            .collect()
    }
}

/// `AR` wins over `AIS` when a block mentions both.
pub fn detect_block_source(block: &str) -> AddressSource {
    if AR_MARKER.is_match(block) {
        AddressSource::Ar
    } else if AIS_MARKER.is_match(block) {
        AddressSource::Ais
    } else {
        AddressSource::Unknown
    }
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| tidy_capture(m.as_str()))
        .collect()
}
