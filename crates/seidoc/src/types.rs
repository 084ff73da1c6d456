//! Data model shared across the pipeline stages.

use crate::identifiers::{NationalIdentifier, ProcessIdentifier};
use crate::text::{PAGE_SEPARATOR, normalize_address};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown wherever a field could not be found.
pub const NOT_INFORMED: &str = "[Não informado]";

/// A downloaded or uploaded PDF. Consumed once by extraction.
#[derive(Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }
}

impl fmt::Debug for SourceDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceDocument")
            .field("filename", &self.filename)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// How the text of a document was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Digital,
    Ocr,
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provenance::Digital => f.write_str("digital"),
            Provenance::Ocr => f.write_str("ocr"),
        }
    }
}

/// Normalized document text. Pages are separated by a single form feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedText {
    pub content: String,
    pub provenance: Provenance,
    pub page_count: usize,
}

impl ExtractedText {
    pub fn empty(provenance: Provenance) -> Self {
        Self {
            content: String::new(),
            provenance,
            page_count: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Page blocks, in page order.
    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.content.split(PAGE_SEPARATOR)
    }
}

/// A parsed field, or an explicit "not informed" marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Informed(String),
    #[default]
    NotInformed,
}

impl FieldValue {
    /// Trimmed value, or `NotInformed` when nothing is left.
    pub fn from_capture(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if !v.is_empty() => FieldValue::Informed(v.to_string()),
            _ => FieldValue::NotInformed,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldValue::Informed(v) => v,
            FieldValue::NotInformed => NOT_INFORMED,
        }
    }

    pub fn is_informed(&self) -> bool {
        matches!(self, FieldValue::Informed(_))
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an address was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddressSource {
    /// Block mentions an AR (aviso de recebimento).
    Ar,
    /// Block mentions an AIS.
    Ais,
    /// Parsed from one OCR'd page.
    Page { filename: String, page: usize },
    Unknown,
}

impl fmt::Display for AddressSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSource::Ar => f.write_str("AR"),
            AddressSource::Ais => f.write_str("AIS"),
            AddressSource::Page { filename, page } => write!(f, "{}-page-{}", filename, page),
            AddressSource::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressField {
    Street,
    City,
    District,
    State,
    PostalCode,
}

/// One postal address with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub street: FieldValue,
    pub city: FieldValue,
    pub district: FieldValue,
    pub state: FieldValue,
    pub postal_code: FieldValue,
    pub source: AddressSource,
    #[serde(default)]
    pub excluded: bool,
}

impl AddressRecord {
    /// Builds a record only when the street has at least `min_street_len`
    /// characters after trimming.
    pub fn new(
        street: FieldValue,
        city: FieldValue,
        district: FieldValue,
        state: FieldValue,
        postal_code: FieldValue,
        source: AddressSource,
        min_street_len: usize,
    ) -> Option<Self> {
        match &street {
            FieldValue::Informed(s) if s.trim().chars().count() >= min_street_len => Some(Self {
                street,
                city,
                district,
                state,
                postal_code,
                source,
                excluded: false,
            }),
            _ => None,
        }
    }

    pub fn field(&self, field: AddressField) -> &FieldValue {
        match field {
            AddressField::Street => &self.street,
            AddressField::City => &self.city,
            AddressField::District => &self.district,
            AddressField::State => &self.state,
            AddressField::PostalCode => &self.postal_code,
        }
    }

    /// Apply a user edit. An empty value resets the field to not informed.
    pub fn set_field(&mut self, field: AddressField, value: &str) {
        let value = FieldValue::from_capture(Some(value));
        match field {
            AddressField::Street => self.street = value,
            AddressField::City => self.city = value,
            AddressField::District => self.district = value,
            AddressField::State => self.state = value,
            AddressField::PostalCode => self.postal_code = value,
        }
    }

    pub fn exclude(&mut self) {
        self.excluded = true;
    }

    pub fn include(&mut self) {
        self.excluded = false;
    }

    /// Street reduced to a comparison key, for spotting overlaps by eye.
    pub fn comparison_key(&self) -> String {
        normalize_address(self.street.as_str())
    }
}

impl fmt::Display for AddressRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {}, {}/{}, CEP {} ({})",
            self.street, self.district, self.city, self.state, self.postal_code, self.source
        )
    }
}

/// Everything the document templates consume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub process: ProcessIdentifier,
    pub subject_name: Option<String>,
    pub cpf: Option<NationalIdentifier>,
    pub cnpj: Option<NationalIdentifier>,
    pub emails: Vec<String>,
    pub addresses: Vec<AddressRecord>,
    pub counterparts: Vec<String>,
    pub provenance: Provenance,
}

impl ExtractedRecord {
    /// The CNPJ when present, otherwise the CPF.
    pub fn identifier(&self) -> Option<&NationalIdentifier> {
        self.cnpj.as_ref().or(self.cpf.as_ref())
    }

    pub fn identifier_line(&self) -> String {
        match self.identifier() {
            Some(id) => id.to_string(),
            None => format!("CNPJ/CPF: {}", NOT_INFORMED),
        }
    }

    pub fn subject_name_or_default(&self) -> &str {
        self.subject_name.as_deref().unwrap_or(NOT_INFORMED)
    }

    /// The selected email if it was extracted, else the first one.
    pub fn contact_email(&self, selected: Option<&str>) -> &str {
        selected
            .and_then(|s| self.emails.iter().find(|e| e.as_str() == s))
            .or_else(|| self.emails.first())
            .map(String::as_str)
            .unwrap_or(NOT_INFORMED)
    }

    pub fn active_addresses(&self) -> impl Iterator<Item = &AddressRecord> {
        self.addresses.iter().filter(|a| !a.excluded)
    }

    pub fn address_mut(&mut self, index: usize) -> Option<&mut AddressRecord> {
        self.addresses.get_mut(index)
    }

    pub fn is_empty(&self) -> bool {
        self.subject_name.is_none()
            && self.cpf.is_none()
            && self.cnpj.is_none()
            && self.emails.is_empty()
            && self.addresses.is_empty()
            && self.counterparts.is_empty()
    }
}

impl fmt::Display for ExtractedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Processo: {}", self.process)?;
        writeln!(f, "Nome autuado: {}", self.subject_name_or_default())?;
        writeln!(f, "{}", self.identifier_line())?;
        if self.emails.is_empty() {
            writeln!(f, "Emails: {}", NOT_INFORMED)?;
        } else {
            writeln!(f, "Emails: {}", self.emails.join(", "))?;
        }
        writeln!(f, "Sócios/Advogados: {}", self.counterparts.join(", "))?;
        for (idx, address) in self.active_addresses().enumerate() {
            writeln!(f, "Endereço {}: {}", idx + 1, address)?;
        }
        write!(f, "Extração: {}", self.provenance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn informed(s: &str) -> FieldValue {
        FieldValue::Informed(s.to_string())
    }

    fn sample_address(street: &str) -> Option<AddressRecord> {
        AddressRecord::new(
            informed(street),
            informed("Brasilia"),
            FieldValue::NotInformed,
            informed("DF"),
            informed("70000-000"),
            AddressSource::Ar,
            15,
        )
    }

    fn empty_record() -> ExtractedRecord {
        ExtractedRecord {
            process: ProcessIdentifier::from_filename("SEI123.pdf"),
            subject_name: None,
            cpf: None,
            cnpj: None,
            emails: vec![],
            addresses: vec![],
            counterparts: vec![],
            provenance: Provenance::Digital,
        }
    }

    #[test]
    fn test_street_length_threshold() {
        assert!(sample_address("Rua das Flores").is_none());
        assert_eq!("Rua das Flores".chars().count(), 14);
        assert!(sample_address("Rua das Flores1").is_some());
        assert!(sample_address("   Rua das Flores   ").is_none());
    }

    #[test]
    fn test_street_length_counts_characters_not_bytes() {
        assert!(sample_address("Praça São João").is_none());
    }

    #[test]
    fn test_missing_street_is_not_retained() {
        let record = AddressRecord::new(
            FieldValue::NotInformed,
            informed("Brasilia"),
            FieldValue::NotInformed,
            FieldValue::NotInformed,
            FieldValue::NotInformed,
            AddressSource::Unknown,
            15,
        );
        assert!(record.is_none());
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::NotInformed.to_string(), "[Não informado]");
        assert_eq!(FieldValue::from_capture(Some("  ")), FieldValue::NotInformed);
        assert_eq!(FieldValue::from_capture(Some(" SP ")), informed("SP"));
    }

    #[test]
    fn test_address_edit_and_exclude() {
        let mut address = sample_address("Rua das Flores, 123").unwrap();
        address.set_field(AddressField::District, "Asa Sul");
        address.set_field(AddressField::PostalCode, "");
        assert_eq!(address.field(AddressField::District), &informed("Asa Sul"));
        assert_eq!(address.postal_code, FieldValue::NotInformed);

        let mut record = empty_record();
        record.addresses.push(address);
        record.addresses.push(sample_address("Avenida Central, 45").unwrap());
        record.address_mut(0).unwrap().exclude();
        assert_eq!(record.active_addresses().count(), 1);
        record.address_mut(0).unwrap().include();
        assert_eq!(record.active_addresses().count(), 2);
    }

    #[test]
    fn test_page_source_display() {
        let source = AddressSource::Page {
            filename: "SEI1.pdf".to_string(),
            page: 3,
        };
        assert_eq!(source.to_string(), "SEI1.pdf-page-3");
    }

    #[test]
    fn test_identifier_line_prefers_cnpj() {
        let mut record = empty_record();
        assert_eq!(record.identifier_line(), "CNPJ/CPF: [Não informado]");

        record.cpf = NationalIdentifier::cpf("111.444.777-35");
        assert_eq!(record.identifier_line(), "CPF: 111.444.777-35");

        record.cnpj = NationalIdentifier::cnpj("11222333000181");
        assert_eq!(record.identifier_line(), "CNPJ: 11.222.333/0001-81");
    }

    #[test]
    fn test_contact_email_selection() {
        let mut record = empty_record();
        assert_eq!(record.contact_email(None), "[Não informado]");

        record.emails = vec!["a@x.com".to_string(), "b@x.com".to_string()];
        assert_eq!(record.contact_email(None), "a@x.com");
        assert_eq!(record.contact_email(Some("b@x.com")), "b@x.com");
        assert_eq!(record.contact_email(Some("z@x.com")), "a@x.com");
    }

    #[test]
    fn test_comparison_key() {
        let address = sample_address("Rua São João, nº 45").unwrap();
        assert_eq!(address.comparison_key(), "rua sao joao no 45");
    }

    #[test]
    fn test_extracted_text_blocks() {
        let text = ExtractedText {
            content: "pagina um\u{000C}pagina dois".to_string(),
            provenance: Provenance::Digital,
            page_count: 2,
        };
        assert_eq!(text.blocks().collect::<Vec<_>>(), vec!["pagina um", "pagina dois"]);
        assert!(ExtractedText::empty(Provenance::Ocr).is_empty());
    }

    #[test]
    fn test_record_serializes() {
        let record = empty_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"provenance\":\"digital\""));
    }
}
