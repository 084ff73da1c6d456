//! Pattern-based entity recognizer.
//!
//! Finds emails, values behind name labels (`Autuado:`, `Razão Social:` and
//! the like) and uppercase company names ending in a legal-form suffix. It
//! needs no model files, so it is the default [`EntityRecognizer`].

use super::tidy_capture;
use crate::Result;
use crate::plugins::{EntityLabel, EntityRecognizer, Plugin, RecognizedEntity};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Email regex pattern is valid and should compile")
});

static NAME_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Autuad[oa]|Raz[aã]o Social|Interessad[oa]|Empresa|Nome)\s*:[ \t]*([^\n\r\x0C:]+)")
        .expect("Name label regex pattern is valid and should compile")
});

static COMPANY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b((?:[A-Z0-9][A-Z0-9&.\-]*[ \t]+){1,8}(?:LTDA|EIRELI|EPP|ME|S/A|S\.A)\.?)")
        .expect("Company regex pattern is valid and should compile")
});

static COMPANY_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:LTDA|EIRELI|EPP|ME|S/A|S\.A)\.?$").expect("Company suffix regex pattern is valid and should compile")
});

#[derive(Debug, Default, Clone, Copy)]
pub struct RuleBasedRecognizer;

impl RuleBasedRecognizer {
    pub fn new() -> Self {
        Self
    }
}

impl Plugin for RuleBasedRecognizer {
    fn name(&self) -> &str {
        "rule-based"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }
}

impl EntityRecognizer for RuleBasedRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let mut entities = Vec::new();

        for m in EMAIL.find_iter(text) {
            entities.push(RecognizedEntity::new(EntityLabel::Email, m.as_str(), m.start()));
        }

        for caps in NAME_LABEL.captures_iter(text) {
            let Some(value) = caps.get(1) else { continue };
            let name = tidy_capture(value.as_str());
            if !looks_like_name(&name) {
                continue;
            }
            let label = if COMPANY_SUFFIX.is_match(&name) {
                EntityLabel::Organization
            } else {
                EntityLabel::Person
            };
            entities.push(RecognizedEntity::new(label, name, value.start()));
        }

        for caps in COMPANY.captures_iter(text) {
            let Some(m) = caps.get(1) else { continue };
            let at_word_end = text[m.end()..].chars().next().is_none_or(|c| !c.is_alphanumeric());
            if at_word_end {
                entities.push(RecognizedEntity::new(
                    EntityLabel::Organization,
                    tidy_capture(m.as_str()),
                    m.start(),
                ));
            }
        }

        entities.sort_by_key(|e| e.start);
        Ok(entities)
    }
}

/// Rejects label values that are really identifiers or emails.
fn looks_like_name(value: &str) -> bool {
    value.chars().filter(|c| c.is_alphabetic()).count() >= 2 && !value.contains('@')
}
