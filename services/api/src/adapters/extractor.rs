//! services/api/src/adapters/extractor.rs
//!
//! Turns uploaded PDF and DOCX files into plain text.

use quick_xml::events::Event;
use quick_xml::Reader;
use smartdoc_core::ports::{ExtractError, TextExtractor};
use std::io::{Cursor, Read};
use zip::ZipArchive;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// How many times the upload limit `word/document.xml` may inflate to.
const DOCX_XML_EXPANSION: usize = 16;

/// The supported document families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case(PDF_CONTENT_TYPE) {
            Some(Self::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_CONTENT_TYPE) {
            Some(Self::Docx)
        } else {
            None
        }
    }
}

/// Extracts text from PDF and DOCX uploads, refusing anything above `max_bytes`.
#[derive(Debug, Clone)]
pub struct DocumentExtractor {
    max_bytes: usize,
}

impl DocumentExtractor {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    fn check_size(&self, actual: usize, declared: Option<u64>) -> Result<(), ExtractError> {
        let declared_too_large = declared.is_some_and(|size| size > self.max_bytes as u64);
        if declared_too_large || actual > self.max_bytes {
            return Err(ExtractError::TooLarge {
                max_bytes: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract(
        &self,
        bytes: &[u8],
        content_type: &str,
        declared_size: Option<u64>,
    ) -> Result<String, ExtractError> {
        let kind = DocumentKind::from_content_type(content_type)
            .ok_or_else(|| ExtractError::UnsupportedType(content_type.to_string()))?;
        self.check_size(bytes.len(), declared_size)?;

        match kind {
            DocumentKind::Pdf => extract_pdf_text(bytes),
            DocumentKind::Docx => {
                extract_docx_text(bytes, self.max_bytes.saturating_mul(DOCX_XML_EXPANSION))
            }
        }
    }
}

fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    // pdf-extract panics on some malformed inputs.
    let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes))
        .map_err(|_| ExtractError::Malformed {
            kind: "PDF",
            reason: "the PDF structure could not be parsed".to_string(),
        })?;
    let text = extracted.map_err(|e| ExtractError::Malformed {
        kind: "PDF",
        reason: e.to_string(),
    })?;
    Ok(text)
}

fn malformed_docx(reason: impl ToString) -> ExtractError {
    ExtractError::Malformed {
        kind: "DOCX",
        reason: reason.to_string(),
    }
}

/// Reads `word/document.xml` and keeps one line per non-blank paragraph.
///
/// The XML part is read up to `max_xml_bytes` after decompression, whatever size the
/// archive declares for it.
fn extract_docx_text(bytes: &[u8], max_xml_bytes: usize) -> Result<String, ExtractError> {
    let too_large = || ExtractError::TooLarge {
        max_bytes: max_xml_bytes,
    };
    let mut archive = ZipArchive::new(Cursor::new(bytes)).map_err(malformed_docx)?;
    let document = archive
        .by_name("word/document.xml")
        .map_err(malformed_docx)?;
    if document.size() > max_xml_bytes as u64 {
        return Err(too_large());
    }

    let mut xml = String::new();
    document
        .take(max_xml_bytes as u64 + 1)
        .read_to_string(&mut xml)
        .map_err(malformed_docx)?;
    if xml.len() > max_xml_bytes {
        return Err(too_large());
    }

    let mut reader = Reader::from_str(&xml);
    let mut buf = Vec::new();
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_node = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = true,
                b"w:p" => current.clear(),
                _ => {}
            },
            Ok(Event::Empty(ref e)) => match e.name().as_ref() {
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Ok(Event::Text(e)) if in_text_node => {
                let value = e.unescape().map_err(malformed_docx)?;
                current.push_str(&value);
            }
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_node = false,
                b"w:p" => {
                    let paragraph = std::mem::take(&mut current);
                    if !paragraph.trim().is_empty() {
                        paragraphs.push(paragraph);
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed_docx(format!("invalid document XML: {e}"))),
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const WORDML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

    fn docx_with_body(body: &str) -> Vec<u8> {
        let xml = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n\
             <w:document xmlns:w=\"{WORDML_NS}\"><w:body>{body}</w:body></w:document>"
        );
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(xml.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn docx_paragraphs_are_joined_by_newlines() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>First </w:t></w:r><w:r><w:t>paragraph.</w:t></w:r></w:p>\
             <w:p></w:p>\
             <w:p><w:r><w:t>Fish &amp; chips.</w:t></w:r></w:p>",
        );

        let text = DocumentExtractor::new(1024 * 1024)
            .extract(&bytes, DOCX_CONTENT_TYPE, None)
            .unwrap();

        assert_eq!(text, "First paragraph.\nFish & chips.");
    }

    /// A one-page PDF showing `text` in Helvetica, with a correct xref table.
    fn pdf_with_text(text: &str) -> Vec<u8> {
        let content = format!("BT /F1 24 Tf 72 720 Td ({text}) Tj ET");
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Contents 4 0 R \
             /Resources << /Font << /F1 5 0 R >> >> >>"
                .to_string(),
            format!("<< /Length {} >>\nstream\n{content}\nendstream", content.len()),
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
                .to_string(),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (index, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{body}\nendobj\n", index + 1).as_bytes());
        }

        let xref_offset = pdf.len();
        let mut tail = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            tail.push_str(&format!("{offset:010} 00000 n \n"));
        }
        tail.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
            objects.len() + 1
        ));
        pdf.extend_from_slice(tail.as_bytes());
        pdf
    }

    #[test]
    fn pdf_text_is_extracted() {
        let bytes = pdf_with_text("Quarterly revenue grew");

        let text = DocumentExtractor::new(1024 * 1024)
            .extract(&bytes, PDF_CONTENT_TYPE, Some(bytes.len() as u64))
            .unwrap();

        assert!(text.contains("Quarterly"), "extracted: {text:?}");
        assert!(text.contains("revenue"), "extracted: {text:?}");
    }

    #[test]
    fn docx_breaks_and_tabs_are_kept() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Line one</w:t><w:br/><w:t>line two</w:t>\
             <w:tab/><w:t>tabbed</w:t></w:r></w:p>\
             <w:p><w:r><w:t>  indented </w:t></w:r></w:p>",
        );

        let text = DocumentExtractor::new(1024 * 1024)
            .extract(&bytes, DOCX_CONTENT_TYPE, None)
            .unwrap();

        assert_eq!(text, "Line one\nline two\ttabbed\n  indented ");
    }

    #[test]
    fn docx_inflating_past_the_limit_is_rejected() {
        let filler = "a".repeat(1024 * 1024);
        let bytes = docx_with_body(&format!("<w:p><w:r><w:t>{filler}</w:t></w:r></w:p>"));
        let extractor = DocumentExtractor::new(4096);
        assert!(bytes.len() < 4096, "fixture compressed to {} bytes", bytes.len());

        let err = extractor.extract(&bytes, DOCX_CONTENT_TYPE, None).unwrap_err();

        assert!(matches!(err, ExtractError::TooLarge { max_bytes } if max_bytes == 4096 * 16));
    }

    #[test]
    fn content_type_is_case_insensitive() {
        let bytes = docx_with_body("<w:p><w:r><w:t>Hello</w:t></w:r></w:p>");
        let upper = DOCX_CONTENT_TYPE.to_ascii_uppercase();

        let text = DocumentExtractor::new(1024 * 1024)
            .extract(&bytes, &upper, None)
            .unwrap();

        assert_eq!(text, "Hello");
    }

    #[test]
    fn unsupported_types_are_rejected() {
        let err = DocumentExtractor::new(1024)
            .extract(b"plain text", "text/plain", None)
            .unwrap_err();

        assert!(matches!(err, ExtractError::UnsupportedType(ref t) if t == "text/plain"));
    }

    #[test]
    fn declared_size_over_the_limit_is_rejected() {
        let err = DocumentExtractor::new(10)
            .extract(b"tiny", PDF_CONTENT_TYPE, Some(11))
            .unwrap_err();

        assert!(matches!(err, ExtractError::TooLarge { max_bytes: 10 }));
    }

    #[test]
    fn actual_size_over_the_limit_is_rejected() {
        let err = DocumentExtractor::new(4)
            .extract(b"more than four bytes", PDF_CONTENT_TYPE, Some(2))
            .unwrap_err();

        assert!(matches!(err, ExtractError::TooLarge { .. }));
    }

    #[test]
    fn corrupt_docx_is_malformed() {
        let err = DocumentExtractor::new(1024)
            .extract(b"not a zip archive", DOCX_CONTENT_TYPE, None)
            .unwrap_err();

        assert!(matches!(err, ExtractError::Malformed { kind: "DOCX", .. }));
    }

    #[test]
    fn corrupt_pdf_is_malformed() {
        let err = DocumentExtractor::new(1024)
            .extract(b"%PDF-garbage", PDF_CONTENT_TYPE, None)
            .unwrap_err();

        assert!(matches!(err, ExtractError::Malformed { kind: "PDF", .. }));
    }
}
