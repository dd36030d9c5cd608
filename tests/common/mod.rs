#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sales_pulse::{data::Value, records::RecordTable};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

/// Builds a table from string cells; blank cells become `Value::Empty`.
pub fn table(headers: &[&str], rows: &[&[&str]]) -> RecordTable {
    RecordTable::from_rows(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .map(|row| row.iter().map(|cell| Value::from(*cell)).collect())
            .collect(),
    )
}

pub const SALES_HEADERS: &[&str] = &["Ubicación", "Modelo", "Canal", "Cliente", "Precio Venta Real"];

/// Ten sales, the fourth one without a price.
pub const SALES_ROWS: &[&[&str]] = &[
    &["Lima", "Hilux", "Tienda", "C001", "118000"],
    &["Lima", "Yaris", "Online", "C002", "59000"],
    &["Arequipa", "Hilux", "Tienda", "C003", "120360"],
    &["Cusco", "Corolla", "Tienda", "C004", ""],
    &["Arequipa", "RAV4", "Online", "C001", "141600"],
    &["Lima", "Hilux", "Distribuidor", "C005", "118000"],
    &["Cusco", "Yaris", "Online", "C006", "61360"],
    &["Lima", "Corolla", "Tienda", "C002", "94400"],
    &["Piura", "Hilux", "Tienda", "C007", "115640"],
    &["Lima", "Yaris", "Online", "", "59000"],
];

pub fn sales_table() -> RecordTable {
    table(SALES_HEADERS, SALES_ROWS)
}

pub fn sales_csv() -> String {
    let mut out = SALES_HEADERS.join(",");
    out.push('\n');
    for row in SALES_ROWS {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
