use thiserror::Error;

/// Failures raised by the column-mapping and aggregation core.
///
/// Ingestion problems (missing files, malformed CSV, unreadable workbooks) are
/// reported through `anyhow` context chains instead, so callers can tell them
/// apart from these with `downcast_ref::<SalesError>()`.
#[derive(Debug, Error, PartialEq)]
pub enum SalesError {
    #[error(
        "no sale-price column could be found (looked for aliases, legacy names and any header containing 'precio' and 'venta'); headers seen: {}",
        .headers.join(", ")
    )]
    MissingPriceColumn { headers: Vec<String> },

    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    #[error("worksheet '{0}' not found in workbook")]
    SheetNotFound(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("column '{name}' has {actual} value(s) but the table has {expected} row(s)")]
    ColumnLengthMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
}
