use anyhow::{anyhow, Result};

use crate::extract::panic_guard::contain_parser_panic;

/// Page-by-page text recovery from a PDF.
///
/// Returns one entry per page in document order; `None` marks a page that
/// yielded no text.
pub trait PdfTextParser: Send + Sync {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>>;
}

/// `pdf-extract` backed parser.
pub struct PdfExtractParser;

impl PdfTextParser for PdfExtractParser {
    fn extract_pages(&self, bytes: &[u8]) -> Result<Vec<Option<String>>> {
        // pdf-extract panics on some malformed inputs instead of returning an error.
        let pages = contain_parser_panic("pdf", || {
            pdf_extract::extract_text_from_mem_by_pages(bytes)
                .map_err(|e| anyhow!("pdf parse error: {e}"))
        })?;

        Ok(pages
            .into_iter()
            .map(|page| if page.is_empty() { None } else { Some(page) })
            .collect())
    }
}
