//! Canonical process number derived from a downloaded file name.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const PROCESS_DIGITS: usize = 15;
const PORTAL_PREFIX: &str = "SEI";

/// Process number as shown on generated documents.
///
/// Either the reformatted 15-digit number or, when the name does not carry
/// exactly 15 digits, the stripped base name unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessIdentifier(String);

impl ProcessIdentifier {
    /// Derive the identifier from a file name such as `SEI 253511234562023.pdf`.
    ///
    /// Only the last path component is considered. The extension is dropped,
    /// then a leading `SEI` marker. With exactly 15 digits left the number is
    /// laid out as `NNNNN.NNNNNN/NNNN-N`, where the final group repeats the
    /// last digit.
    pub fn from_filename(filename: &str) -> Self {
        let name = Path::new(filename)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        let base = match name.rfind('.') {
            Some(idx) if idx > 0 => &name[..idx],
            _ => name,
        };

        let base = match base.strip_prefix(PORTAL_PREFIX) {
            Some(rest) => rest.trim(),
            None => base,
        };

        let digits: String = base.chars().filter(char::is_ascii_digit).collect();
        if digits.len() != PROCESS_DIGITS {
            return Self(base.to_string());
        }

        Self(format!(
            "{}.{}/{}-{}",
            &digits[0..5],
            &digits[5..11],
            &digits[11..15],
            &digits[14..]
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProcessIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
