use std::io::Cursor;

use anyhow::{anyhow, Result};
use docx_rust::DocxFile;

use crate::extract::panic_guard::contain_parser_panic;

/// Raw-text recovery from a DOCX (Office Open XML) document.
pub trait DocxTextParser: Send + Sync {
    fn extract_raw_text(&self, bytes: &[u8]) -> Result<String>;
}

/// `docx-rust` backed parser. Paragraphs and tables are joined with line breaks.
pub struct DocxRustParser;

impl DocxTextParser for DocxRustParser {
    fn extract_raw_text(&self, bytes: &[u8]) -> Result<String> {
        contain_parser_panic("docx", || {
            let file = DocxFile::from_reader(Cursor::new(bytes))
                .map_err(|e| anyhow!("docx archive error: {e:?}"))?;
            let docx = file
                .parse()
                .map_err(|e| anyhow!("docx parse error: {e:?}"))?;
            Ok(docx.document.body.text())
        })
    }
}
