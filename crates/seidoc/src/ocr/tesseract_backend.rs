//! Tesseract invoked as a subprocess: `tesseract <image> stdout --psm N --oem N -l LANG`.

use super::subprocess::run_bounded;
use crate::Result;
use crate::SeidocError;
use crate::ocr::error::OcrError;
use crate::ocr::types::TesseractConfig;
use crate::plugins::{OcrBackend, Plugin};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Per-page recognition timeout when none is configured.
pub const DEFAULT_TESSERACT_TIMEOUT_SECS: u64 = 120;

pub struct TesseractCliBackend {
    binary: PathBuf,
    timeout_secs: u64,
}

impl TesseractCliBackend {
    pub fn new(binary: impl Into<PathBuf>, timeout_secs: u64) -> Self {
        Self {
            binary: binary.into(),
            timeout_secs,
        }
    }
}

impl Default for TesseractCliBackend {
    fn default() -> Self {
        Self::new("tesseract", DEFAULT_TESSERACT_TIMEOUT_SECS)
    }
}

impl Plugin for TesseractCliBackend {
    fn name(&self) -> &str {
        "tesseract-cli"
    }

    fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    fn initialize(&self) -> Result<()> {
        match std::process::Command::new(&self.binary).arg("--version").output() {
            Ok(output) if output.status.success() => Ok(()),
            Ok(_) | Err(_) => Err(SeidocError::MissingDependency(format!(
                "tesseract not runnable at '{}' - install tesseract-ocr with the 'por' language pack",
                self.binary.display()
            ))),
        }
    }

    fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    fn description(&self) -> &str {
        "Tesseract OCR through its command-line interface"
    }
}

#[async_trait]
impl OcrBackend for TesseractCliBackend {
    async fn process_file(&self, path: &Path, config: &TesseractConfig) -> Result<String> {
        config.validate().map_err(OcrError::InvalidConfiguration)?;

        let mut command = Command::new(&self.binary);
        command
            .arg(path)
            .arg("stdout")
            .arg("--psm")
            .arg(config.psm.to_string())
            .arg("--oem")
            .arg(config.oem.to_string())
            .arg("-l")
            .arg(&config.language);

        tracing::debug!(image = %path.display(), psm = config.psm, lang = %config.language, "running tesseract");
        let output = run_bounded(command, "tesseract", self.timeout_secs).await?;

        String::from_utf8(output.stdout)
            .map_err(|e| SeidocError::parsing_with_source("tesseract produced non-UTF-8 output", e))
    }
}
