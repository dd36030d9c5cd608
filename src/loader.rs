//! Ingestion boundary: turns a CSV/TSV file or the first sheet of a workbook
//! into a [`RecordTable`].

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{Data, Reader, open_workbook_auto};
use log::{debug, info};

use crate::{data::Value, error::SalesError, io_utils, records::RecordTable};

const WORKBOOK_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub delimiter: Option<u8>,
    pub encoding: Option<String>,
    /// Sheet name or 0-based index; the first sheet when absent.
    pub sheet: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Delimited,
    Workbook,
}

impl InputFormat {
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext)
                if WORKBOOK_EXTENSIONS
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known)) =>
            {
                InputFormat::Workbook
            }
            _ => InputFormat::Delimited,
        }
    }
}

pub fn load_table(path: &Path, options: &LoadOptions) -> Result<RecordTable> {
    info!("Loading data from {path:?}");
    let table = match InputFormat::detect(path) {
        InputFormat::Workbook => load_workbook(path, options.sheet.as_deref())?,
        InputFormat::Delimited => load_delimited(path, options)?,
    };
    info!("Loaded {} record(s)", table.len());
    debug!("Columns: {}", table.headers().join(", "));
    Ok(table)
}

pub fn load_delimited(path: &Path, options: &LoadOptions) -> Result<RecordTable> {
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    let encoding = io_utils::resolve_encoding(options.encoding.as_deref())?;
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, encoding)
        .with_context(|| format!("Reading headers from {path:?}"))?;
    let mut table = RecordTable::new(name_blank_headers(headers));
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.with_context(|| format!("Reading row {}", row_idx + 2))?;
        let decoded = io_utils::decode_record(&record, encoding)
            .with_context(|| format!("Decoding row {}", row_idx + 2))?;
        table.push_row(decoded.iter().map(|cell| Value::from_raw(cell)).collect());
    }
    Ok(table)
}

pub fn load_workbook(path: &Path, sheet: Option<&str>) -> Result<RecordTable> {
    let mut workbook =
        open_workbook_auto(path).with_context(|| format!("Opening workbook {path:?}"))?;
    let sheet_names = workbook.sheet_names().to_vec();
    if sheet_names.is_empty() {
        return Err(SalesError::EmptyWorkbook.into());
    }
    let sheet_name = match sheet {
        None => sheet_names[0].clone(),
        Some(selector) => match selector.parse::<usize>() {
            Ok(idx) => sheet_names
                .get(idx)
                .cloned()
                .ok_or_else(|| SalesError::SheetNotFound(selector.to_string()))?,
            Err(_) => sheet_names
                .iter()
                .find(|name| name.as_str() == selector)
                .cloned()
                .ok_or_else(|| SalesError::SheetNotFound(selector.to_string()))?,
        },
    };
    debug!("Reading sheet '{sheet_name}' ({} in workbook)", sheet_names.len());
    let range = workbook
        .worksheet_range(&sheet_name)
        .with_context(|| format!("Reading sheet '{sheet_name}'"))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RecordTable::default());
    };
    let headers = header_row.iter().map(header_text).collect();
    let mut table = RecordTable::new(name_blank_headers(headers));
    for row in rows {
        let cells: Vec<Value> = row.iter().map(cell_value).collect();
        if cells.iter().all(Value::is_empty) {
            continue;
        }
        table.push_row(cells);
    }
    Ok(table)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Int(i) => Value::Number(*i as f64),
        Data::Float(f) => Value::Number(*f),
        Data::String(s) => Value::from_raw(s),
        Data::Empty | Data::Error(_) => Value::Empty,
        other => Value::Text(other.to_string()),
    }
}

fn name_blank_headers(headers: Vec<String>) -> Vec<String> {
    headers
        .into_iter()
        .enumerate()
        .map(|(idx, header)| {
            if header.trim().is_empty() {
                format!("column_{}", idx + 1)
            } else {
                header
            }
        })
        .collect()
}
