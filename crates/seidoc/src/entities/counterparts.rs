//! Partners, lawyers and legal representatives named in the document.

use super::tidy_capture;
use once_cell::sync::Lazy;
use regex::Regex;

static ROLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:S[oó]ci[oa]|Advogad[oa]|Respons[aá]vel(?: Legal| T[eé]cnico)?|Representante Legal)\s*:[ \t]*")
        .expect("Counterpart regex pattern is valid and should compile")
});

/// Values behind counterpart labels, in document order.
///
/// A value ends at the line break, the next colon or the next role label,
/// whichever comes first. Normalization folds blank lines into a single
/// space, so consecutive roles may share one line.
///
/// Repeats are kept: the same partner named on two pages appears twice.
pub fn extract_counterparts(text: &str) -> Vec<String> {
    let labels: Vec<_> = ROLE_LABEL.find_iter(text).collect();
    labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let end = labels.get(i + 1).map_or(text.len(), |next| next.start());
            let value = text[label.end()..end]
                .split(['\n', '\r', '\u{000C}', ':'])
                .next()
                .unwrap_or_default();
            tidy_capture(value)
        })
        .filter(|value| !value.is_empty())
        .collect()
}
