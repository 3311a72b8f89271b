use serde::{Deserialize, Serialize};

/// How the extractor produced the document content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain text pulled from a PDF or text file.
    Text,
    /// Text recovered from an image by OCR.
    ImageOcr,
    /// The image itself, as an `http(s)` URL or a base64 `data:` URL.
    ImageUrl,
}

/// Output of the extractor. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub content: String,
}

/// An image in the shape a model backend can forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Base64 { media_type: String, data: String },
    Url(String),
}

impl ParsedDocument {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Text,
            content: content.into(),
        }
    }

    pub fn image_ocr(content: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::ImageOcr,
            content: content.into(),
        }
    }

    pub fn image_url(content: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::ImageUrl,
            content: content.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.kind == DocumentKind::ImageUrl
    }

    /// Text usable as a prompt body and as `raw_text`. Images have none.
    pub fn text_content(&self) -> &str {
        match self.kind {
            DocumentKind::Text | DocumentKind::ImageOcr => &self.content,
            DocumentKind::ImageUrl => "",
        }
    }

    /// Splits an `image_url` document into something a backend can send.
    /// Returns `None` for text documents and for data URLs that are not base64.
    pub fn image_source(&self) -> Option<ImageSource> {
        if !self.is_image() {
            return None;
        }
        let content = self.content.trim();
        if let Some(rest) = content.strip_prefix("data:") {
            let (meta, data) = rest.split_once(',')?;
            let media_type = meta.strip_suffix(";base64")?;
            return Some(ImageSource::Base64 {
                media_type: media_type.to_string(),
                data: data.to_string(),
            });
        }
        Some(ImageSource::Url(content.to_string()))
    }
}
