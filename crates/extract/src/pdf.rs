//! PDF text extraction.
//!
//! Image-only (scanned) PDFs yield no text; OCR is not attempted.
//!
//! `pdf-extract` panics on some inputs it does not support (unknown font
//! encodings among them). Those panics are caught here and reported as
//! processing errors so one bad file cannot take down a batch.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use docchat_core::document::DocumentFormat;
use docchat_core::error::ExtractionError;
use tracing::warn;

/// Extract the text of every page, in page order, one page per block.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|payload| {
        let message = panic_message(payload.as_ref());
        warn!(error = %message, "PDF parser panicked");
        ExtractionError::processing(DocumentFormat::Pdf, message)
    })?
    .map_err(|e| ExtractionError::processing(DocumentFormat::Pdf, e))?;
    join_pages(pages)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unsupported PDF content".to_string()
    }
}

/// Concatenate page texts with newline separators and trim the result.
fn join_pages(pages: Vec<String>) -> Result<String, ExtractionError> {
    let mut text = String::new();
    for page in pages {
        text.push_str(&page);
        text.push('\n');
    }

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::NoExtractableContent {
            format: DocumentFormat::Pdf,
        });
    }
    Ok(text.to_string())
}
