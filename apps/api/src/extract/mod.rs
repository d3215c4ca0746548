//! Text extraction from uploaded PDF and DOCX documents.
//!
//! `TextExtractor` validates the upload, dispatches on the declared MIME type
//! through the closed `DocumentKind` enum, and enforces that the recovered text
//! is non-blank. Parsing itself sits behind `PdfTextParser` / `DocxTextParser`.

use std::sync::Arc;

use bytes::Bytes;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error};

pub mod docx;
pub mod handlers;
mod panic_guard;
pub mod pdf;

pub use docx::{DocxRustParser, DocxTextParser};
pub use pdf::{PdfExtractParser, PdfTextParser};

/// Largest accepted upload: 10 MiB.
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("File size too large. Maximum size is 10MB.")]
    FileTooLarge,

    #[error("Invalid file type. Only PDF and DOCX files are allowed.")]
    UnsupportedFileType,

    #[error("No text could be extracted from the file")]
    NoExtractableText,

    #[error("Error extracting text from PDF: {0}")]
    PdfExtractionFailed(String),

    #[error("Error extracting text from DOCX: {0}")]
    DocxExtractionFailed(String),
}

/// Supported upload formats. Adding a format means adding a variant here and
/// handling it in `TextExtractor::extract`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Unsupported,
}

impl DocumentKind {
    /// Classifies a declared content type, ignoring case and any `;` parameters.
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();

        match essence.as_str() {
            PDF_MIME => DocumentKind::Pdf,
            DOCX_MIME => DocumentKind::Docx,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// A file received from the caller, not yet validated.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub raw_bytes: Bytes,
    pub declared_mime_type: String,
    pub filename: String,
}

/// Text recovered from an upload. Serializes to `{text, filename, fileSize}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractedText {
    pub text: String,
    #[serde(rename = "filename")]
    pub source_filename: String,
    #[serde(rename = "fileSize")]
    pub source_byte_size: usize,
}

/// Stateless extractor; clones share the underlying parsers.
#[derive(Clone)]
pub struct TextExtractor {
    pdf: Arc<dyn PdfTextParser>,
    docx: Arc<dyn DocxTextParser>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        Self::new(Arc::new(PdfExtractParser), Arc::new(DocxRustParser))
    }
}

impl TextExtractor {
    pub fn new(pdf: Arc<dyn PdfTextParser>, docx: Arc<dyn DocxTextParser>) -> Self {
        Self { pdf, docx }
    }

    /// Extracts plain text from `document`.
    ///
    /// Size is checked before the MIME type, so an oversized upload is
    /// rejected as `FileTooLarge` whatever its declared format.
    pub fn extract(
        &self,
        document: Option<&UploadedDocument>,
    ) -> Result<ExtractedText, ExtractError> {
        let document = document.ok_or(ExtractError::MissingFile)?;
        let size = document.raw_bytes.len();

        if size > MAX_FILE_SIZE {
            return Err(ExtractError::FileTooLarge);
        }

        let kind = DocumentKind::from_mime(&document.declared_mime_type);
        debug!(
            "Extracting {:?} '{}' ({} bytes)",
            kind, document.filename, size
        );

        let text = match kind {
            DocumentKind::Pdf => {
                let pages = self.pdf.extract_pages(&document.raw_bytes).map_err(|e| {
                    error!("PDF extraction failed for '{}': {e}", document.filename);
                    ExtractError::PdfExtractionFailed(e.to_string())
                })?;
                pages.into_iter().map(Option::unwrap_or_default).collect::<String>()
            }
            DocumentKind::Docx => self.docx.extract_raw_text(&document.raw_bytes).map_err(|e| {
                error!("DOCX extraction failed for '{}': {e}", document.filename);
                ExtractError::DocxExtractionFailed(e.to_string())
            })?,
            DocumentKind::Unsupported => return Err(ExtractError::UnsupportedFileType),
        };

        if text.trim().is_empty() {
            return Err(ExtractError::NoExtractableText);
        }

        Ok(ExtractedText {
            text,
            source_filename: document.filename.clone(),
            source_byte_size: size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakePdf {
        pages: Vec<Option<String>>,
        calls: AtomicUsize,
    }

    impl FakePdf {
        fn with_pages(pages: &[Option<&str>]) -> Arc<Self> {
            Arc::new(Self {
                pages: pages.iter().map(|p| p.map(String::from)).collect(),
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl PdfTextParser for FakePdf {
        fn extract_pages(&self, _bytes: &[u8]) -> anyhow::Result<Vec<Option<String>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.pages.clone())
        }
    }

    struct BrokenPdf;

    impl PdfTextParser for BrokenPdf {
        fn extract_pages(&self, _bytes: &[u8]) -> anyhow::Result<Vec<Option<String>>> {
            anyhow::bail!("xref table not found")
        }
    }

    struct FakeDocx(Result<String, String>);

    impl DocxTextParser for FakeDocx {
        fn extract_raw_text(&self, _bytes: &[u8]) -> anyhow::Result<String> {
            self.0.clone().map_err(anyhow::Error::msg)
        }
    }

    fn doc(bytes: Vec<u8>, mime: &str) -> UploadedDocument {
        UploadedDocument {
            raw_bytes: Bytes::from(bytes),
            declared_mime_type: mime.to_string(),
            filename: "resume.bin".to_string(),
        }
    }

    fn extractor_with_pdf(pdf: Arc<dyn PdfTextParser>) -> TextExtractor {
        TextExtractor::new(pdf, Arc::new(FakeDocx(Ok("docx text".to_string()))))
    }

    #[test]
    fn test_document_kind_from_mime() {
        assert_eq!(DocumentKind::from_mime("application/pdf"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_mime("Application/PDF; name=x"), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_mime(DOCX_MIME), DocumentKind::Docx);
        assert_eq!(DocumentKind::from_mime("application/msword"), DocumentKind::Unsupported);
        assert_eq!(DocumentKind::from_mime(""), DocumentKind::Unsupported);
    }

    #[test]
    fn test_missing_document_is_missing_file() {
        let extractor = TextExtractor::default();
        assert!(matches!(extractor.extract(None), Err(ExtractError::MissingFile)));
    }

    #[test]
    fn test_unsupported_mime_types_are_rejected() {
        let pdf = FakePdf::with_pages(&[Some("text")]);
        let extractor = extractor_with_pdf(pdf.clone());
        for mime in ["text/plain", "image/png", "application/msword", "application/octet-stream"] {
            let err = extractor.extract(Some(&doc(b"hello".to_vec(), mime))).unwrap_err();
            assert!(matches!(err, ExtractError::UnsupportedFileType), "mime {mime}");
        }
        assert_eq!(pdf.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oversized_upload_rejected_before_parsing() {
        let pdf = FakePdf::with_pages(&[Some("text")]);
        let extractor = extractor_with_pdf(pdf.clone());
        for mime in [PDF_MIME, DOCX_MIME, "text/plain"] {
            let err = extractor
                .extract(Some(&doc(vec![b'a'; MAX_FILE_SIZE + 1], mime)))
                .unwrap_err();
            assert!(matches!(err, ExtractError::FileTooLarge), "mime {mime}");
        }
        assert_eq!(pdf.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exactly_max_size_is_accepted() {
        let extractor = extractor_with_pdf(FakePdf::with_pages(&[Some("ok")]));
        let out = extractor
            .extract(Some(&doc(vec![0u8; MAX_FILE_SIZE], PDF_MIME)))
            .unwrap();
        assert_eq!(out.source_byte_size, MAX_FILE_SIZE);
    }

    #[test]
    fn test_pdf_pages_concatenated_in_order_with_empty_pages() {
        let extractor = extractor_with_pdf(FakePdf::with_pages(&[
            Some("Page one. "),
            None,
            Some("Page three."),
        ]));
        let out = extractor.extract(Some(&doc(b"%PDF".to_vec(), PDF_MIME))).unwrap();
        assert_eq!(out.text, "Page one. Page three.");
        assert_eq!(out.source_filename, "resume.bin");
        assert_eq!(out.source_byte_size, 4);
    }

    #[test]
    fn test_scanned_pdf_has_no_extractable_text() {
        let extractor = extractor_with_pdf(FakePdf::with_pages(&[None, Some("  \n\t"), Some("")]));
        let err = extractor.extract(Some(&doc(b"%PDF".to_vec(), PDF_MIME))).unwrap_err();
        assert!(matches!(err, ExtractError::NoExtractableText));
    }

    #[test]
    fn test_pdf_parser_fault_is_pdf_extraction_failed() {
        let extractor = extractor_with_pdf(Arc::new(BrokenPdf));
        let err = extractor.extract(Some(&doc(b"junk".to_vec(), PDF_MIME))).unwrap_err();
        match err {
            ExtractError::PdfExtractionFailed(detail) => assert!(detail.contains("xref")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_docx_parser_fault_is_docx_extraction_failed() {
        let extractor = TextExtractor::new(
            FakePdf::with_pages(&[]),
            Arc::new(FakeDocx(Err("invalid zip archive".to_string()))),
        );
        let err = extractor.extract(Some(&doc(b"PK".to_vec(), DOCX_MIME))).unwrap_err();
        assert!(matches!(err, ExtractError::DocxExtractionFailed(_)));
    }

    #[test]
    fn test_blank_docx_has_no_extractable_text() {
        let extractor = TextExtractor::new(
            FakePdf::with_pages(&[]),
            Arc::new(FakeDocx(Ok("\r\n  \r\n".to_string()))),
        );
        let err = extractor.extract(Some(&doc(b"PK".to_vec(), DOCX_MIME))).unwrap_err();
        assert!(matches!(err, ExtractError::NoExtractableText));
    }

    #[test]
    fn test_extracted_text_is_not_trimmed() {
        let extractor = extractor_with_pdf(FakePdf::with_pages(&[Some("  padded  ")]));
        let out = extractor.extract(Some(&doc(b"%PDF".to_vec(), PDF_MIME))).unwrap();
        assert_eq!(out.text, "  padded  ");
    }

    #[test]
    fn test_extract_is_idempotent() {
        let extractor = extractor_with_pdf(FakePdf::with_pages(&[Some("A"), Some("B")]));
        let upload = doc(b"%PDF-1.4".to_vec(), PDF_MIME);
        let first = extractor.extract(Some(&upload)).unwrap();
        let second = extractor.extract(Some(&upload)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_extracted_text_wire_shape() {
        let out = ExtractedText {
            text: "Hello".to_string(),
            source_filename: "cv.pdf".to_string(),
            source_byte_size: 42,
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"text": "Hello", "filename": "cv.pdf", "fileSize": 42})
        );
    }
}
