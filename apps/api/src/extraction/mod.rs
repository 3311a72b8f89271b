//! Upload extraction — raw bytes + file name → `ParsedDocument`.
//!
//! CPU-bound (PDF parsing, OCR); callers run it on the blocking pool.

mod docx;
pub mod ocr;

use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;
use tracing::{info, warn};

use crate::models::document::ParsedDocument;

pub use ocr::TextRecognizer;

/// Below this many characters a PDF is probably a scan with no text layer.
const SCANNED_PDF_MIN_CHARS: usize = 50;
const SCANNED_PDF_NOTE: &str = "[NOTE: Scanned PDF detected. Text extraction may be incomplete.]";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Uploaded file is empty")]
    Empty,

    #[error("Failed to read PDF: {0}")]
    Pdf(String),

    #[error("Failed to read DOCX: {0}")]
    Docx(String),

    #[error("OCR failed: {0}")]
    Ocr(String),

    #[error("Text file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Extracts an upload by extension. With `ocr`, images become `image_ocr`
/// text; without it they pass through as base64 data URLs.
pub fn extract_document(
    bytes: &[u8],
    file_name: &str,
    ocr: Option<&dyn TextRecognizer>,
) -> Result<ParsedDocument, ExtractionError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    // Reject by type before looking at the content.
    if !matches!(ext.as_str(), "pdf" | "docx" | "txt") && image_media_type(&ext).is_none() {
        let shown = if ext.is_empty() { "(none)" } else { ext.as_str() };
        return Err(ExtractionError::UnsupportedFormat(shown.to_string()));
    }
    if bytes.is_empty() {
        return Err(ExtractionError::Empty);
    }

    info!("Parsing file type: {ext}");

    let document = match ext.as_str() {
        "pdf" => {
            let text = pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| ExtractionError::Pdf(e.to_string()))?;
            ParsedDocument::text(annotate_sparse_pdf_text(text.trim()))
        }
        "docx" => ParsedDocument::text(docx::paragraph_text(bytes)?.trim()),
        "txt" => ParsedDocument::text(String::from_utf8(bytes.to_vec())?.trim()),
        _ => match ocr {
            Some(ocr) => {
                info!("Running OCR on image upload");
                let text = ocr.recognize(bytes)?;
                if text.trim().is_empty() {
                    warn!("OCR found no text in the image");
                }
                ParsedDocument::image_ocr(text.trim())
            }
            None => {
                let media_type = image_media_type(&ext).unwrap_or("application/octet-stream");
                ParsedDocument::image_url(format!(
                    "data:{media_type};base64,{}",
                    STANDARD.encode(bytes)
                ))
            }
        },
    };

    Ok(document)
}

fn image_media_type(ext: &str) -> Option<&'static str> {
    match ext {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

fn annotate_sparse_pdf_text(text: &str) -> String {
    if text.chars().count() >= SCANNED_PDF_MIN_CHARS {
        return text.to_string();
    }
    warn!("PDF has almost no text layer; likely a scan");
    if text.is_empty() {
        SCANNED_PDF_NOTE.to_string()
    } else {
        format!("{text}\n{SCANNED_PDF_NOTE}")
    }
}
