//! Document text extraction for DocChat.
//!
//! Turns one uploaded [`Document`] into plain text, or a typed
//! [`ExtractionError`]. The format is taken from the file-name suffix:
//!
//! | Format | Suffixes | Backend |
//! |--------|----------|---------|
//! | PDF    | `pdf` | `pdf-extract`, page by page |
//! | Word   | `docx`, `doc` | `zip` + `quick-xml` over `word/document.xml` |
//! | Excel  | `xlsx`, `xls`, `xlsm`, `ods` | `calamine` |
//!
//! Library failures never escape with their own error type: they are
//! rewrapped as [`ExtractionError::Processing`] carrying the original message.
//! The extractor only reports the outcome for a single file; batch policy
//! lives with the caller.

pub mod excel;
pub mod pdf;
pub mod word;

use docchat_core::document::{Document, DocumentFormat};
use docchat_core::error::ExtractionError;
use tracing::debug;

/// Rows of each sheet rendered into the text preview.
pub const DEFAULT_EXCEL_PREVIEW_ROWS: usize = 100;

/// Format-dispatching extractor. Stateless apart from its options.
#[derive(Debug, Clone)]
pub struct Extractor {
    excel_preview_rows: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            excel_preview_rows: DEFAULT_EXCEL_PREVIEW_ROWS,
        }
    }

    /// Cap the number of rows rendered per sheet.
    pub fn with_excel_preview_rows(mut self, rows: usize) -> Self {
        self.excel_preview_rows = rows.max(1);
        self
    }

    /// Extract one document. Succeeds only with text that is non-empty after trimming.
    pub fn extract(&self, document: &Document) -> Result<String, ExtractionError> {
        let format = document.format()?;
        let text = match format {
            DocumentFormat::Pdf => pdf::extract(document.bytes())?,
            DocumentFormat::Word => word::extract(document.bytes())?,
            DocumentFormat::Excel => excel::extract(document.bytes(), self.excel_preview_rows)?,
        };

        if text.trim().is_empty() {
            return Err(ExtractionError::NoExtractableContent { format });
        }

        debug!(
            document = %document.name(),
            format = %format,
            chars = text.chars().count(),
            "Extracted document text"
        );
        Ok(text)
    }

    /// Convenience wrapper for callers holding a name and raw bytes.
    pub fn extract_bytes(&self, name: &str, bytes: &[u8]) -> Result<String, ExtractionError> {
        self.extract(&Document::new(name, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_suffix_fails_naming_extension() {
        let err = Extractor::new()
            .extract_bytes("notes.txt", b"plain text")
            .unwrap_err();
        assert_eq!(
            err,
            ExtractionError::UnsupportedFormat {
                extension: "txt".into()
            }
        );
        assert!(err.to_string().contains("txt"));
    }

    #[test]
    fn corrupt_pdf_is_processing_error() {
        let err = Extractor::new()
            .extract_bytes("scan.pdf", b"not a pdf at all")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Processing {
                format: DocumentFormat::Pdf,
                ..
            }
        ));
        assert!(err.to_string().starts_with("PDF processing error:"));
    }

    #[test]
    fn corrupt_docx_is_processing_error() {
        let err = Extractor::new()
            .extract_bytes("memo.docx", b"PK garbage")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Processing {
                format: DocumentFormat::Word,
                ..
            }
        ));
    }

    #[test]
    fn corrupt_xlsx_is_processing_error() {
        let err = Extractor::new()
            .extract_bytes("budget.xlsx", b"\x00\x01\x02")
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Processing {
                format: DocumentFormat::Excel,
                ..
            }
        ));
    }

    #[test]
    fn docx_round_trip_through_extractor() {
        let bytes = word::tests::docx_with_body(
            "<w:p><w:r><w:t>Quarterly review</w:t></w:r></w:p>",
        );
        let text = Extractor::new().extract_bytes("Review.DOCX", &bytes).unwrap();
        assert_eq!(text, "Quarterly review");
    }

    #[test]
    fn pdf_parser_panic_stays_inside_extractor() {
        let bytes = pdf::tests::pdf_with_pages(&[Some("Quarterly report.")], "PDFDocEncoding");
        let err = Extractor::new().extract_bytes("odd.pdf", &bytes).unwrap_err();
        assert!(err.to_string().starts_with("PDF processing error:"));

        let bytes = pdf::tests::pdf_with_pages(&[Some("Quarterly report.")], "WinAnsiEncoding");
        let text = Extractor::new().extract_bytes("fine.pdf", &bytes).unwrap();
        assert_eq!(text, "Quarterly report.");
    }

    #[test]
    fn preview_rows_never_zero() {
        let extractor = Extractor::new().with_excel_preview_rows(0);
        assert_eq!(extractor.excel_preview_rows, 1);
    }
}
