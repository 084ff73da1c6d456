use serde::{Deserialize, Serialize};

/// Page Segmentation Mode for Tesseract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PSMMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PSMMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(PSMMode::OsdOnly),
            1 => Ok(PSMMode::AutoOsd),
            2 => Ok(PSMMode::AutoOnly),
            3 => Ok(PSMMode::Auto),
            4 => Ok(PSMMode::SingleColumn),
            5 => Ok(PSMMode::SingleBlockVertical),
            6 => Ok(PSMMode::SingleBlock),
            7 => Ok(PSMMode::SingleLine),
            8 => Ok(PSMMode::SingleWord),
            9 => Ok(PSMMode::CircleWord),
            10 => Ok(PSMMode::SingleChar),
            11 => Ok(PSMMode::SparseText),
            12 => Ok(PSMMode::SparseTextOsd),
            13 => Ok(PSMMode::RawLine),
            _ => Err(format!("Invalid PSM mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Engine parameters passed to the OCR backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TesseractConfig {
    /// Language pack, e.g. `por`
    #[serde(default = "default_language")]
    pub language: String,

    /// Page Segmentation Mode (0-13). 6 = a single uniform block of text.
    #[serde(default = "default_psm")]
    pub psm: u8,

    /// OCR Engine Mode (0-3). 3 = whatever is available.
    #[serde(default = "default_oem")]
    pub oem: u8,
}

fn default_language() -> String {
    "por".to_string()
}
fn default_psm() -> u8 {
    PSMMode::SingleBlock.as_u8()
}
fn default_oem() -> u8 {
    3
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
            psm: default_psm(),
            oem: default_oem(),
        }
    }
}

impl TesseractConfig {
    pub fn validate(&self) -> Result<(), String> {
        PSMMode::from_u8(self.psm)?;
        if self.oem > 3 {
            return Err(format!("Invalid OEM value: {}. Must be 0-3", self.oem));
        }
        let well_formed = self
            .language
            .split('+')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
        if !well_formed {
            return Err(format!("Invalid OCR language '{}'. Expected codes like 'por' or 'por+eng'", self.language));
        }
        Ok(())
    }
}

/// Raster cleanup applied to every page before recognition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImagePreprocessingConfig {
    /// Contrast factor around the mean luminance. 1.0 leaves the image unchanged.
    #[serde(default = "default_contrast")]
    pub contrast: f32,

    /// Luminance above which a pixel turns white.
    #[serde(default = "default_threshold")]
    pub binarize_threshold: u8,

    /// Median filter radius in pixels. 1 = 3x3 window, 0 disables.
    #[serde(default = "default_median_radius")]
    pub median_radius: u32,
}

fn default_contrast() -> f32 {
    2.0
}
fn default_threshold() -> u8 {
    128
}
fn default_median_radius() -> u32 {
    1
}

impl Default for ImagePreprocessingConfig {
    fn default() -> Self {
        Self {
            contrast: default_contrast(),
            binarize_threshold: default_threshold(),
            median_radius: default_median_radius(),
        }
    }
}
