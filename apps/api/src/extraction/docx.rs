//! Paragraph text from a `.docx` upload.
//!
//! A docx is a zip container; the body lives in `word/document.xml` as `w:p`
//! paragraphs made of `w:t` runs.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::ZipArchive;

use super::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";

/// Returns the document's paragraphs joined by newlines.
pub fn paragraph_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| ExtractionError::Docx(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractionError::Docx(format!("{DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::Docx(e.to_string()))?;

    parse_paragraphs(&xml)
}

fn parse_paragraphs(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.name().as_ref() == b"w:t" {
                    in_text = true;
                }
            }
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                b"w:p" => paragraphs.push(String::new()),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text => {
                let text = e
                    .unescape()
                    .map_err(|e| ExtractionError::Docx(e.to_string()))?;
                current.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(ExtractionError::Docx(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use zip::write::FileOptions;
    use zip::ZipWriter;

    use super::*;

    /// Builds a minimal in-memory docx around the given `w:body` content.
    pub(crate) fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
        );
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file(DOCUMENT_PART, FileOptions::default()).unwrap();
        zip.write_all(xml.as_bytes()).unwrap();
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_joined_by_newlines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Rust engineer</w:t></w:r></w:p>",
        );
        assert_eq!(paragraph_text(&bytes).unwrap(), "Jane Doe\nRust engineer");
    }

    #[test]
    fn test_runs_in_one_paragraph_are_concatenated() {
        let bytes = docx_with_body(
            r#"<w:p><w:r><w:t>Built </w:t></w:r><w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">CI &amp; CD</w:t></w:r></w:p>"#,
        );
        assert_eq!(paragraph_text(&bytes).unwrap(), "Built CI & CD");
    }

    #[test]
    fn test_empty_paragraphs_and_tabs_kept() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Skills</w:t><w:tab/><w:t>Rust</w:t></w:r></w:p>\
             <w:p/>\
             <w:p><w:r><w:t>Go</w:t></w:r></w:p>",
        );
        assert_eq!(paragraph_text(&bytes).unwrap(), "Skills\tRust\n\nGo");
    }

    #[test]
    fn test_not_a_zip_fails() {
        let err = paragraph_text(b"this is not a zip archive").unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(_)));
    }

    #[test]
    fn test_zip_without_document_part_fails() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("word/styles.xml", FileOptions::default()).unwrap();
        zip.write_all(b"<styles/>").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = paragraph_text(&bytes).unwrap_err();
        assert!(matches!(err, ExtractionError::Docx(ref m) if m.contains(DOCUMENT_PART)));
    }
}
