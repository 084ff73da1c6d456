//! Digital-versus-OCR decision.

use serde::{Deserialize, Serialize};

/// When to abandon the text layer in favour of OCR.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyPolicy {
    /// Skip the text layer entirely.
    #[serde(default)]
    pub force_ocr: bool,

    /// Non-whitespace characters the text layer needs to be accepted.
    /// Values below 1 behave as 1: an empty text layer is never accepted.
    #[serde(default = "default_min_digital_chars")]
    pub min_digital_chars: usize,
}

fn default_min_digital_chars() -> usize {
    1
}

impl Default for StrategyPolicy {
    fn default() -> Self {
        Self {
            force_ocr: false,
            min_digital_chars: default_min_digital_chars(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitalTextStats {
    pub non_whitespace: usize,
    pub alnum: usize,
}

impl DigitalTextStats {
    pub fn from_text(text: &str) -> Self {
        let mut non_whitespace = 0;
        let mut alnum = 0;
        for ch in text.chars().filter(|c| !c.is_whitespace()) {
            non_whitespace += 1;
            if ch.is_alphanumeric() {
                alnum += 1;
            }
        }
        Self { non_whitespace, alnum }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrategyDecision {
    pub stats: DigitalTextStats,
    pub fallback: bool,
}

impl StrategyPolicy {
    /// Decide whether normalized digital text is good enough to keep.
    pub fn evaluate(&self, digital_text: &str) -> StrategyDecision {
        let stats = DigitalTextStats::from_text(digital_text);
        let fallback = self.force_ocr || stats.non_whitespace < self.min_digital_chars.max(1);
        StrategyDecision { stats, fallback }
    }
}
