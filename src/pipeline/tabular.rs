//! Tabular parsers: CSV and spreadsheet (XLSX / XLS) → [`RawRow`]s.
//!
//! Both formats share one shape: the first row is the header, every later
//! row is paired with it positionally. Ragged rows are padded with
//! [`CellValue::Empty`]; rows whose cells are all empty are skipped.

use crate::config::ProcessingConfig;
use crate::error::ParseError;
use crate::pipeline::normalize::require_reg_no_column;
use crate::pipeline::row::{CellValue, RawRow};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::io::Cursor;
use tracing::{debug, info};

/// Parse CSV bytes into rows.
pub fn parse_csv(bytes: &[u8], config: &ProcessingConfig) -> Result<Vec<RawRow>, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Encoding {
        detail: e.to_string(),
    })?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(csv_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    require_reg_no_column(&header, config)?;
    debug!("CSV header: {:?}", header);

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(csv_error)?;
        let row = RawRow::from_positional(&header, record.iter().map(CellValue::text));
        if !row.is_blank() {
            rows.push(row);
        }
    }

    info!("CSV parsed: {} data rows", rows.len());
    Ok(rows)
}

fn csv_error(e: csv::Error) -> ParseError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    ParseError::Csv {
        line,
        detail: e.to_string(),
    }
}

/// Parse the first worksheet of an XLSX / XLS workbook into rows.
pub fn parse_spreadsheet(bytes: &[u8], config: &ProcessingConfig) -> Result<Vec<RawRow>, ParseError> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| ParseError::Spreadsheet {
            detail: e.to_string(),
        })?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(ParseError::NoWorksheet)?
        .map_err(|e| ParseError::Spreadsheet {
            detail: e.to_string(),
        })?;

    let mut sheet_rows = range.rows();
    let header: Vec<String> = sheet_rows
        .next()
        .map(|cells| cells.iter().map(|c| cell_value(c).as_text()).collect())
        .unwrap_or_default();
    require_reg_no_column(&header, config)?;
    debug!("Spreadsheet header: {:?}", header);

    let rows: Vec<RawRow> = sheet_rows
        .map(|cells| RawRow::from_positional(&header, cells.iter().map(cell_value)))
        .filter(|row| !row.is_blank())
        .collect();

    info!("Spreadsheet parsed: {} data rows", rows.len());
    Ok(rows)
}

fn cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) => CellValue::text(s),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Text(dt.as_f64().to_string()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::text(s),
        Data::Error(_) | Data::Empty => CellValue::Empty,
    }
}
