//! OCR for image uploads.
//!
//! When an engine is configured, images are turned into `image_ocr` text and
//! critiqued like any other text; otherwise they pass through as images for a
//! vision-capable model.

use std::sync::Arc;

use anyhow::Result;

use super::ExtractionError;

/// Recognizes the text in an encoded image (PNG, JPEG, WebP).
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<String, ExtractionError>;
}

/// Builds the configured OCR engine, or `None` when OCR is off.
pub fn build_recognizer(
    enabled: bool,
    language: &str,
) -> Result<Option<Arc<dyn TextRecognizer>>> {
    if !enabled {
        return Ok(None);
    }

    #[cfg(feature = "ocr")]
    return Ok(Some(Arc::new(TesseractOcr::new(language))));

    #[cfg(not(feature = "ocr"))]
    anyhow::bail!(
        "OCR_ENABLED is set but this build has no OCR engine \
         (rebuild with `--features ocr`, language '{language}')"
    );
}

/// Tesseract via `libtesseract`. A fresh engine per call; engines are not `Sync`.
#[cfg(feature = "ocr")]
pub struct TesseractOcr {
    language: String,
}

#[cfg(feature = "ocr")]
impl TesseractOcr {
    pub fn new(language: &str) -> Self {
        Self {
            language: language.to_string(),
        }
    }
}

#[cfg(feature = "ocr")]
impl TextRecognizer for TesseractOcr {
    fn recognize(&self, image: &[u8]) -> Result<String, ExtractionError> {
        let mut engine = tesseract::Tesseract::new(None, Some(self.language.as_str()))
            .map_err(ocr_error)?
            .set_image_from_mem(image)
            .map_err(ocr_error)?
            .recognize()
            .map_err(ocr_error)?;

        engine.get_text().map_err(ocr_error)
    }
}

#[cfg(feature = "ocr")]
fn ocr_error(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Ocr(e.to_string())
}
