//! Brazilian national identifiers and process numbers.
//!
//! A [`NationalIdentifier`] can only be built through its checksum validator,
//! so every value of this type in a record has already been accepted.

pub mod cnpj;
pub mod cpf;
pub mod process;

pub use cnpj::{cnpj_check_digits, format_cnpj, validate_cnpj};
pub use cpf::{format_cpf, validate_cpf};
pub use process::ProcessIdentifier;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierKind {
    Cpf,
    Cnpj,
}

impl IdentifierKind {
    pub fn label(&self) -> &'static str {
        match self {
            IdentifierKind::Cpf => "CPF",
            IdentifierKind::Cnpj => "CNPJ",
        }
    }
}

/// A checksum-validated CPF or CNPJ.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NationalIdentifier {
    kind: IdentifierKind,
    digits: String,
    formatted: String,
}

impl NationalIdentifier {
    /// Accepts the candidate only if its CPF check digits match.
    pub fn cpf(candidate: &str) -> Option<Self> {
        validate_cpf(candidate).then(|| Self {
            kind: IdentifierKind::Cpf,
            digits: digits_string(candidate),
            formatted: format_cpf(candidate),
        })
    }

    /// Accepts the candidate only if its CNPJ check digits match.
    pub fn cnpj(candidate: &str) -> Option<Self> {
        validate_cnpj(candidate).then(|| Self {
            kind: IdentifierKind::Cnpj,
            digits: digits_string(candidate),
            formatted: format_cnpj(candidate),
        })
    }

    pub fn kind(&self) -> IdentifierKind {
        self.kind
    }

    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn formatted(&self) -> &str {
        &self.formatted
    }
}

impl fmt::Display for NationalIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.label(), self.formatted)
    }
}

pub(crate) fn digits_of(input: &str) -> Vec<u8> {
    input
        .bytes()
        .filter(u8::is_ascii_digit)
        .map(|b| b - b'0')
        .collect()
}

fn digits_string(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

pub(crate) fn all_same(digits: &[u8]) -> bool {
    digits.windows(2).all(|pair| pair[0] == pair[1])
}
