//! Word (.docx) text extraction.
//!
//! Reads `word/document.xml` out of the OOXML zip container and walks it with
//! a streaming XML reader. Output is every top-level body paragraph, one per
//! line, followed by every top-level table rendered one row per line with
//! cells joined by ` | `.
//!
//! Text boxes (`w:txbxContent`) are anchored inside runs and are not part
//! of the paragraph flow; their content is skipped.
//!
//! Legacy binary `.doc` files are not OOXML containers and fail with a
//! processing error.

use std::io::{Cursor, Read};

use docchat_core::document::DocumentFormat;
use docchat_core::error::ExtractionError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

const DOCUMENT_PART: &str = "word/document.xml";
const CELL_SEPARATOR: &str = " | ";

fn processing(err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::processing(DocumentFormat::Word, err)
}

/// Extract paragraphs, then tables, from a .docx blob.
pub fn extract(bytes: &[u8]) -> Result<String, ExtractionError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(processing)?;
    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(processing)?
        .read_to_string(&mut xml)
        .map_err(processing)?;

    let body = parse_body(&xml)?;
    let text = body.render();
    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::NoExtractableContent {
            format: DocumentFormat::Word,
        });
    }
    Ok(text.to_string())
}

/// Text content of a document body, in document order.
#[derive(Debug, Default, PartialEq)]
pub struct WordBody {
    pub paragraphs: Vec<String>,
    /// Each table is a list of rows, each row a list of trimmed cell texts.
    pub tables: Vec<Vec<Vec<String>>>,
}

impl WordBody {
    pub fn render(&self) -> String {
        let mut text = String::new();
        for paragraph in &self.paragraphs {
            text.push_str(paragraph);
            text.push('\n');
        }
        for table in &self.tables {
            for row in table {
                text.push_str(&row.join(CELL_SEPARATOR));
                text.push('\n');
            }
        }
        text
    }
}

/// Parser state for one pass over `document.xml`.
#[derive(Default)]
struct BodyWalker {
    body: WordBody,
    table_depth: usize,
    run_depth: usize,
    in_text: bool,
    paragraph: String,
    table: Vec<Vec<String>>,
    row: Vec<String>,
    cell_paragraphs: Vec<String>,
    cell_span: usize,
    cell_continues_merge: bool,
    /// Depth of open `w:txbxContent` elements.
    skipped: usize,
}

impl BodyWalker {
    fn start(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractionError> {
        if e.local_name().as_ref() == b"txbxContent" {
            self.skipped += 1;
        }
        if self.skipped > 0 {
            return Ok(());
        }
        match e.local_name().as_ref() {
            b"p" => self.paragraph.clear(),
            b"r" => self.run_depth += 1,
            b"t" if self.run_depth > 0 => self.in_text = true,
            b"tbl" => {
                self.table_depth += 1;
                if self.table_depth == 1 {
                    self.table.clear();
                }
            }
            b"tr" if self.table_depth == 1 => self.row.clear(),
            b"tc" if self.table_depth == 1 => {
                self.cell_paragraphs.clear();
                self.cell_span = 1;
                self.cell_continues_merge = false;
            }
            _ => self.empty(e)?,
        }
        Ok(())
    }

    /// Self-closing elements, and the leaf elements that may also appear open.
    fn empty(&mut self, e: &BytesStart<'_>) -> Result<(), ExtractionError> {
        if self.skipped > 0 {
            return Ok(());
        }
        match e.local_name().as_ref() {
            b"p" => {
                self.paragraph.clear();
                self.finish_paragraph();
            }
            b"tab" if self.run_depth > 0 => self.paragraph.push('\t'),
            b"br" | b"cr" if self.run_depth > 0 => self.paragraph.push('\n'),
            b"gridSpan" if self.table_depth == 1 => {
                self.cell_span = val_attribute(e)?
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(1);
            }
            b"vMerge" if self.table_depth == 1 => {
                // A bare `w:vMerge` continues the cell above; `restart` opens a new one.
                self.cell_continues_merge = val_attribute(e)?.is_none_or(|v| v == "continue");
            }
            _ => {}
        }
        Ok(())
    }

    fn end(&mut self, local_name: &[u8]) {
        if self.skipped > 0 {
            if local_name == b"txbxContent" {
                self.skipped -= 1;
            }
            return;
        }
        match local_name {
            b"p" => self.finish_paragraph(),
            b"r" => self.run_depth = self.run_depth.saturating_sub(1),
            b"t" => self.in_text = false,
            b"tc" if self.table_depth == 1 => {
                let mut text = self.cell_paragraphs.join("\n").trim().to_string();
                if self.cell_continues_merge {
                    let column = self.row.len();
                    if let Some(above) = self.table.last().and_then(|row| row.get(column)) {
                        text = above.clone();
                    }
                }
                // A merged cell is reported once per grid column it spans.
                for _ in 0..self.cell_span.max(1) {
                    self.row.push(text.clone());
                }
            }
            b"tr" if self.table_depth == 1 => {
                let row = std::mem::take(&mut self.row);
                self.table.push(row);
            }
            b"tbl" => {
                if self.table_depth == 1 {
                    let table = std::mem::take(&mut self.table);
                    self.body.tables.push(table);
                }
                self.table_depth = self.table_depth.saturating_sub(1);
            }
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.in_text && self.skipped == 0 {
            self.paragraph.push_str(text);
        }
    }

    fn finish_paragraph(&mut self) {
        let paragraph = std::mem::take(&mut self.paragraph);
        if self.table_depth == 0 {
            self.body.paragraphs.push(paragraph);
        } else {
            // Nested tables fold into the enclosing top-level cell.
            self.cell_paragraphs.push(paragraph);
        }
    }
}

fn val_attribute(e: &BytesStart<'_>) -> Result<Option<String>, ExtractionError> {
    for attr in e.attributes() {
        let attr = attr.map_err(processing)?;
        if attr.key.local_name().as_ref() == b"val" {
            let value = attr.unescape_value().map_err(processing)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Walk `document.xml` and collect top-level paragraphs and tables.
pub fn parse_body(xml: &str) -> Result<WordBody, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event().map_err(processing)? {
            Event::Start(e) => walker.start(&e)?,
            Event::Empty(e) => walker.empty(&e)?,
            Event::End(e) => walker.end(e.local_name().as_ref()),
            Event::Text(t) => {
                let text = t.unescape().map_err(processing)?;
                walker.text(&text);
            }
            Event::CData(t) => {
                let text = String::from_utf8_lossy(&t);
                walker.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(walker.body)
}
