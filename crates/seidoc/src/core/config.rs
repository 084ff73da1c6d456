//! Configuration loading and management.
//!
//! This module provides the pipeline configuration, loaded from TOML, YAML
//! or JSON files, discovered as `seidoc.toml` in the working directory or
//! one of its parents, or built programmatically.

use crate::entities::AddressConfig;
use crate::extraction::StrategyPolicy;
use crate::ocr::{ImagePreprocessingConfig, TesseractConfig};
use crate::retrieval::{BrowserConfig, PortalConfig};
use crate::{Result, SeidocError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "seidoc.toml";

/// Main pipeline configuration.
///
/// ```rust
/// use seidoc::core::config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert!(config.strip_accents);
/// assert_eq!(config.addresses.min_street_len, 15);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Remove diacritics during normalization
    #[serde(default = "default_true")]
    pub strip_accents: bool,

    /// When to fall back from the text layer to OCR
    #[serde(default)]
    pub strategy: StrategyPolicy,

    #[serde(default)]
    pub ocr: OcrConfig,

    #[serde(default)]
    pub addresses: AddressConfig,

    #[serde(default)]
    pub portal: PortalConfig,

    #[serde(default)]
    pub browser: BrowserConfig,
}

/// OCR fallback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrConfig {
    #[serde(default)]
    pub tesseract: TesseractConfig,

    #[serde(default)]
    pub preprocessing: ImagePreprocessingConfig,

    /// Rasterization resolution
    #[serde(default = "default_dpi")]
    pub dpi: u32,

    /// Deadline for the whole OCR stage of one document. None = unbounded.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Deadline for each `pdftoppm`/`tesseract` invocation
    #[serde(default = "default_process_timeout")]
    pub process_timeout_secs: u64,

    #[serde(default = "default_tesseract_path")]
    pub tesseract_path: PathBuf,

    #[serde(default = "default_pdftoppm_path")]
    pub pdftoppm_path: PathBuf,
}

fn default_true() -> bool {
    true
}

fn default_dpi() -> u32 {
    300
}

fn default_process_timeout() -> u64 {
    120
}

fn default_tesseract_path() -> PathBuf {
    PathBuf::from("tesseract")
}

fn default_pdftoppm_path() -> PathBuf {
    PathBuf::from("pdftoppm")
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            tesseract: TesseractConfig::default(),
            preprocessing: ImagePreprocessingConfig::default(),
            dpi: default_dpi(),
            timeout_secs: None,
            process_timeout_secs: default_process_timeout(),
            tesseract_path: default_tesseract_path(),
            pdftoppm_path: default_pdftoppm_path(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strip_accents: true,
            strategy: StrategyPolicy::default(),
            ocr: OcrConfig::default(),
            addresses: AddressConfig::default(),
            portal: PortalConfig::default(),
            browser: BrowserConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `SeidocError::Validation` if the file can't be read, is not
    /// valid TOML, or holds out-of-range values.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SeidocError::validation(format!("Invalid TOML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| SeidocError::validation(format!("Invalid YAML in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = read_config(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| SeidocError::validation(format!("Invalid JSON in {}: {}", path.as_ref().display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load by file extension: `.toml`, `.yaml`/`.yml` or `.json`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
            Some("toml") => Self::from_toml_file(path),
            Some("yaml") | Some("yml") => Self::from_yaml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(SeidocError::validation(format!(
                "Unsupported config format for {} (expected .toml, .yaml, .yml or .json)",
                path.display()
            ))),
        }
    }

    /// Discover `seidoc.toml` in the current directory or its parents.
    ///
    /// # Returns
    ///
    /// - `Some(config)` if found
    /// - `None` if no config file found
    pub fn discover() -> Result<Option<Self>> {
        let mut current = std::env::current_dir().map_err(SeidocError::Io)?;

        loop {
            let candidate = current.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "using discovered config");
                return Ok(Some(Self::from_toml_file(candidate)?));
            }

            if let Some(parent) = current.parent() {
                current = parent.to_path_buf();
            } else {
                break;
            }
        }

        Ok(None)
    }

    pub fn validate(&self) -> Result<()> {
        self.ocr
            .tesseract
            .validate()
            .map_err(|e| SeidocError::validation(format!("Invalid OCR configuration: {}", e)))?;

        if self.ocr.dpi == 0 || self.ocr.dpi > 1200 {
            return Err(SeidocError::validation(format!(
                "OCR dpi must be between 1 and 1200, got {}",
                self.ocr.dpi
            )));
        }
        if self.ocr.process_timeout_secs == 0 {
            return Err(SeidocError::validation("OCR process timeout must be at least one second"));
        }
        if self.ocr.timeout_secs == Some(0) {
            return Err(SeidocError::validation("OCR stage timeout must be at least one second"));
        }
        if self.addresses.min_street_len == 0 {
            return Err(SeidocError::validation("Minimum street length must be at least 1"));
        }
        Ok(())
    }
}

fn read_config(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| SeidocError::validation(format!("Failed to read config file {}: {}", path.display(), e)))
}
