//! In-memory record table.
//!
//! Rows are stored positionally against the header list. Columns added after
//! load (the derived pre-tax price) are joined by row position, and their
//! length is checked against the row count before they are attached.

use std::collections::HashMap;

use crate::{data::Value, error::SalesError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    headers: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl RecordTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(headers);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row, padding short rows with [`Value::Empty`] and dropping
    /// cells beyond the header count.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.headers.len(), Value::Empty);
        self.rows.push(row);
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cells of a column in row order, or `None` when the column is absent.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Renames headers in a single pass, so renames never chain into each other.
    /// Row order and unmatched columns are untouched.
    pub fn rename_columns<'a, 'b, I>(&mut self, renames: I)
    where
        I: IntoIterator<Item = (&'a str, &'b str)>,
    {
        let renames: HashMap<&str, &str> = renames.into_iter().collect();
        for header in &mut self.headers {
            if let Some(target) = renames.get(header.as_str()) {
                *header = (*target).to_string();
            }
        }
    }

    /// Rewrites every cell of a column. Returns `false` if the column is absent.
    pub fn map_column<F>(&mut self, name: &str, mut f: F) -> bool
    where
        F: FnMut(&Value) -> Value,
    {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        for row in &mut self.rows {
            row[idx] = f(&row[idx]);
        }
        true
    }

    /// Keeps rows for which `keep` returns true and reports how many were removed.
    pub fn retain_rows<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&[Value]) -> bool,
    {
        let before = self.rows.len();
        self.rows.retain(|row| keep(row));
        before - self.rows.len()
    }

    /// Attaches a computed column by row position, replacing an existing column
    /// of the same name.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) -> Result<(), SalesError> {
        if values.len() != self.rows.len() {
            return Err(SalesError::ColumnLengthMismatch {
                name: name.to_string(),
                expected: self.rows.len(),
                actual: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.headers.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}
