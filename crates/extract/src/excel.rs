//! Excel workbook extraction.
//!
//! Every sheet is read in workbook order. The first row of a sheet's used
//! range is its header and the remaining rows are data; a sheet with no data
//! rows contributes nothing. Each remaining sheet renders as a header block,
//! a right-aligned preview table capped at `preview_rows` rows, and one
//! statistics line per numeric column.

use std::fmt::Write as _;
use std::io::Cursor;

use calamine::{Data, ExcelDateTime, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use docchat_core::document::DocumentFormat;
use docchat_core::error::ExtractionError;
use tracing::debug;

/// Rendering of an empty cell in the preview table.
const MISSING: &str = "NaN";

/// One cell value, reduced to what rendering and statistics need.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl From<&Data> for Cell {
    fn from(data: &Data) -> Self {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::Bool(b) => Cell::Bool(*b),
            Data::String(s) => Cell::Text(s.clone()),
            Data::DateTime(dt) => Cell::Text(render_datetime(dt)),
            other => Cell::Text(other.to_string()),
        }
    }
}

/// Dates as `2024-01-15`, date-times as `2024-01-15 09:30:00`, time-of-day
/// values as `09:30:00` and durations as `1:30:00`.
fn render_datetime(dt: &ExcelDateTime) -> String {
    if dt.is_duration() {
        let seconds = dt.as_duration().map(|d| d.num_seconds()).unwrap_or_default();
        let sign = if seconds < 0 { "-" } else { "" };
        let seconds = seconds.abs();
        return format!(
            "{sign}{}:{:02}:{:02}",
            seconds / 3600,
            seconds / 60 % 60,
            seconds % 60
        );
    }

    match dt.as_datetime() {
        Some(value) if dt.as_f64() < 1.0 => value.time().format("%H:%M:%S").to_string(),
        Some(value) if value.time() == NaiveTime::MIN => value.date().format("%Y-%m-%d").to_string(),
        Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => dt.to_string(),
    }
}

/// A sheet split into header and data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Build a sheet from raw grid rows. The first row becomes the header.
    pub fn from_grid(name: impl Into<String>, grid: Vec<Vec<Cell>>) -> Self {
        let mut grid = grid.into_iter();
        let header = grid.next().unwrap_or_default();
        let mut rows: Vec<Vec<Cell>> = grid.collect();

        while rows
            .last()
            .is_some_and(|row| row.iter().all(|c| *c == Cell::Empty))
        {
            rows.pop();
        }

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header.len()))
            .max()
            .unwrap_or(0);

        let columns = (0..width)
            .map(|i| match header.get(i) {
                None | Some(Cell::Empty) => format!("Unnamed: {i}"),
                Some(cell) => render_plain(cell),
            })
            .collect();

        for row in &mut rows {
            row.resize(width, Cell::Empty);
        }

        Self {
            name: name.into(),
            columns,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().map(move |row| &row[index])
    }

    fn kind(&self, index: usize) -> ColumnKind {
        let mut numbers = 0;
        let mut integral = true;
        let mut gaps = false;
        for cell in self.column(index) {
            match cell {
                Cell::Number(n) => {
                    numbers += 1;
                    integral &= n.fract() == 0.0;
                }
                Cell::Empty => gaps = true,
                Cell::Bool(_) | Cell::Text(_) => return ColumnKind::Mixed,
            }
        }
        match (numbers, integral && !gaps) {
            (0, _) => ColumnKind::Mixed,
            (_, true) => ColumnKind::Integer,
            (_, false) => ColumnKind::Float,
        }
    }

    /// Mean, min and max over the non-empty cells of a numeric column.
    pub fn column_stats(&self, index: usize) -> Option<ColumnStats> {
        if self.kind(index) == ColumnKind::Mixed {
            return None;
        }
        let values: Vec<f64> = self
            .column(index)
            .filter_map(|c| match c {
                Cell::Number(n) => Some(*n),
                _ => None,
            })
            .collect();

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        Some(ColumnStats { mean, min, max })
    }

    /// Render the sheet block, previewing at most `preview_rows` rows.
    pub fn render(&self, preview_rows: usize) -> String {
        let total = self.rows.len();
        let mut out = String::new();

        let _ = write!(out, "\n=== Sheet: {} ===\n", self.name);
        let _ = write!(out, "Columns: {}\n\n", self.columns.join(", "));
        let _ = writeln!(out, "Number of rows: {total}");
        let _ = write!(out, "Number of columns: {}\n\n", self.columns.len());

        if total > preview_rows {
            let _ = writeln!(out, "Showing first {preview_rows} rows:");
        }
        out.push_str(&self.render_table(preview_rows));
        if total > preview_rows {
            let _ = write!(out, "\n... and {} more rows", total - preview_rows);
        }

        let stats: Vec<String> = (0..self.columns.len())
            .filter_map(|i| {
                let kind = self.kind(i);
                self.column_stats(i).map(|s| {
                    format!(
                        "{}: Mean={:.2}, Min={}, Max={}",
                        self.columns[i],
                        s.mean,
                        render_number(s.min, kind),
                        render_number(s.max, kind)
                    )
                })
            })
            .collect();

        if !stats.is_empty() {
            out.push_str("\n\nNumeric Column Statistics:\n");
            for line in stats {
                out.push_str(&line);
                out.push('\n');
            }
        }

        out
    }

    /// Right-aligned table: header line, then one line per previewed row.
    fn render_table(&self, preview_rows: usize) -> String {
        let kinds: Vec<ColumnKind> = (0..self.columns.len()).map(|i| self.kind(i)).collect();
        let body: Vec<Vec<String>> = self
            .rows
            .iter()
            .take(preview_rows)
            .map(|row| {
                row.iter()
                    .zip(&kinds)
                    .map(|(cell, kind)| render_cell(cell, *kind))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                body.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(name.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = vec![aligned_line(&self.columns, &widths)];
        for row in &body {
            lines.push(aligned_line(row, &widths));
        }
        lines.join("\n")
    }
}

fn aligned_line(cells: &[String], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:>width$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    /// Every cell is a whole number.
    Integer,
    /// Numbers, possibly fractional or with gaps.
    Float,
    /// Anything else: text, booleans, or no numbers at all.
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

fn render_cell(cell: &Cell, kind: ColumnKind) -> String {
    match cell {
        Cell::Empty => MISSING.to_string(),
        Cell::Number(n) => render_number(*n, kind),
        other => render_plain(other),
    }
}

/// Cell text as it appears outside a typed column (headers, mixed columns).
fn render_plain(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Number(n) if n.fract() == 0.0 && n.abs() < 1e16 => format!("{n:.0}"),
        Cell::Number(n) => n.to_string(),
        Cell::Bool(true) => "True".into(),
        Cell::Bool(false) => "False".into(),
        Cell::Text(s) => s.clone(),
    }
}

fn render_number(n: f64, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Integer => format!("{n:.0}"),
        ColumnKind::Float if n.fract() == 0.0 && n.abs() < 1e16 => format!("{n:.1}"),
        ColumnKind::Float => n.to_string(),
        ColumnKind::Mixed => render_plain(&Cell::Number(n)),
    }
}

/// Render every non-empty sheet and join them with newlines.
pub fn render_sheets(sheets: &[Sheet], preview_rows: usize) -> Result<String, ExtractionError> {
    let blocks: Vec<String> = sheets
        .iter()
        .filter(|sheet| !sheet.is_empty())
        .map(|sheet| sheet.render(preview_rows))
        .collect();

    if blocks.is_empty() {
        return Err(ExtractionError::NoExtractableContent {
            format: DocumentFormat::Excel,
        });
    }
    Ok(blocks.join("\n"))
}

/// Read every sheet of a workbook blob (xlsx, xlsm, xls or ods).
pub fn read_sheets(bytes: &[u8]) -> Result<Vec<Sheet>, ExtractionError> {
    let processing = |e: calamine::Error| ExtractionError::processing(DocumentFormat::Excel, e);

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(processing)?;
    let names = workbook.sheet_names();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook.worksheet_range(&name).map_err(processing)?;
        let grid: Vec<Vec<Cell>> = range
            .rows()
            .map(|row| row.iter().map(Cell::from).collect())
            .collect();
        debug!(sheet = %name, rows = grid.len(), "Read worksheet");
        sheets.push(Sheet::from_grid(name, grid));
    }
    Ok(sheets)
}

pub fn extract(bytes: &[u8], preview_rows: usize) -> Result<String, ExtractionError> {
    let sheets = read_sheets(bytes)?;
    render_sheets(&sheets, preview_rows)
}
