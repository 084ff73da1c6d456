//! OCR backend plugin trait.

use crate::Result;
use crate::ocr::types::TesseractConfig;
use crate::plugins::Plugin;
use async_trait::async_trait;
use image::{GrayImage, ImageFormat};
use std::path::Path;

/// Turns one page image into text.
///
/// Implementors provide `process_file`. The default `process_image` writes
/// the raster to a scoped temporary PNG, hands the path over, and removes
/// the file when it returns, whether recognition succeeded or not.
#[async_trait]
pub trait OcrBackend: Plugin {
    async fn process_file(&self, path: &Path, config: &TesseractConfig) -> Result<String>;

    async fn process_image(&self, image: GrayImage, config: &TesseractConfig) -> Result<String> {
        let temp = tempfile::Builder::new()
            .prefix("seidoc-page-")
            .suffix(".png")
            .tempfile()?;
        let path = temp.path().to_path_buf();

        let write_path = path.clone();
        tokio::task::spawn_blocking(move || image.save_with_format(&write_path, ImageFormat::Png))
            .await
            .map_err(|e| crate::SeidocError::Other(format!("raster writer task failed: {}", e)))??;

        let result = self.process_file(&path, config).await;
        drop(temp);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;
    use std::sync::Mutex;

    struct PathRecordingBackend {
        seen: Mutex<Option<(std::path::PathBuf, bool)>>,
    }

    impl Plugin for PathRecordingBackend {
        fn name(&self) -> &str {
            "path-recorder"
        }

        fn version(&self) -> String {
            "1.0.0".to_string()
        }

        fn initialize(&self) -> Result<()> {
            Ok(())
        }

        fn shutdown(&self) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl OcrBackend for PathRecordingBackend {
        async fn process_file(&self, path: &Path, _config: &TesseractConfig) -> Result<String> {
            *self.seen.lock().unwrap() = Some((path.to_path_buf(), path.exists()));
            Ok("texto".to_string())
        }
    }

    #[tokio::test]
    async fn test_process_image_scopes_temp_file() {
        let backend = PathRecordingBackend { seen: Mutex::new(None) };
        let image = GrayImage::from_pixel(4, 4, Luma([255]));

        let text = backend
            .process_image(image, &TesseractConfig::default())
            .await
            .unwrap();
        assert_eq!(text, "texto");

        let (path, existed_during_call) = backend.seen.lock().unwrap().clone().unwrap();
        assert!(existed_during_call);
        assert!(!path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
    }
}
