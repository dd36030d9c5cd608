//! Price coercion, row filtering and pre-tax derivation.
//!
//! The authoritative price column is located through explicit tiers, each of
//! which can be exercised on its own:
//!
//! 1. [`canonical_price_column()`]: the column the resolver backed the sale price with.
//! 2. [`legacy_price_column()`]: one of the historically exported exact headers.
//! 3. [`heuristic_price_column()`]: the first header whose normalized form
//!    contains both `precio` and `venta`.
//!
//! When all three miss, cleaning fails with [`SalesError::MissingPriceColumn`].

use crate::{
    columns::{CanonicalField, LEGACY_PRICE_HEADERS, Resolution},
    data::Value,
    diagnostics::{DiagnosticEvent, Observer, PriceTier},
    error::SalesError,
    normalize::header_contains_all,
    records::RecordTable,
};

/// Tax rate applied when the export carries no pre-tax price.
pub const DEFAULT_TAX_RATE: f64 = 0.18;

/// A table ready for aggregation. Only readable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedTable {
    table: RecordTable,
    price_column: String,
    pre_tax_column: String,
    price_tier: PriceTier,
    rows_before: usize,
    rows_dropped: usize,
    pre_tax_derived: bool,
}

impl CleanedTable {
    pub fn table(&self) -> &RecordTable {
        &self.table
    }

    /// Authoritative tax-inclusive price column.
    pub fn price_column(&self) -> &str {
        &self.price_column
    }

    pub fn pre_tax_column(&self) -> &str {
        &self.pre_tax_column
    }

    pub fn price_tier(&self) -> PriceTier {
        self.price_tier
    }

    pub fn rows_before(&self) -> usize {
        self.rows_before
    }

    pub fn rows_dropped(&self) -> usize {
        self.rows_dropped
    }

    pub fn pre_tax_derived(&self) -> bool {
        self.pre_tax_derived
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Numeric readings of a column, positionally aligned with the rows.
    pub fn numbers(&self, column: &str) -> Vec<Option<f64>> {
        self.table
            .column(column)
            .map(|cells| cells.map(Value::to_number).collect())
            .unwrap_or_default()
    }
}

pub struct Cleaner<'a> {
    tax_rate: f64,
    observer: &'a dyn Observer,
}

impl<'a> Cleaner<'a> {
    pub fn new(tax_rate: f64, observer: &'a dyn Observer) -> Self {
        Self { tax_rate, observer }
    }

    /// Cleans a table whose headers have already been renamed by `resolution`.
    pub fn clean(
        &self,
        mut table: RecordTable,
        resolution: &Resolution,
    ) -> Result<CleanedTable, SalesError> {
        let rows_before = table.len();

        for column in [resolution.sale_price_column(), resolution.pre_tax_column()]
            .into_iter()
            .flatten()
        {
            table.map_column(column, Value::coerce_numeric);
        }

        let (price_tier, price_column) =
            locate_price_column(&table, resolution).ok_or_else(|| {
                SalesError::MissingPriceColumn {
                    headers: table.headers().to_vec(),
                }
            })?;
        if price_tier != PriceTier::Canonical {
            self.observer.record(DiagnosticEvent::PriceColumnFallback {
                tier: price_tier,
                header: price_column.clone(),
            });
        }

        // Heuristic and legacy columns were not coerced above.
        table.map_column(&price_column, Value::coerce_numeric);
        let price_idx = table
            .column_index(&price_column)
            .ok_or_else(|| SalesError::MissingPriceColumn {
                headers: table.headers().to_vec(),
            })?;
        let rows_dropped = table.retain_rows(|row| !row[price_idx].is_empty());
        self.observer.record(DiagnosticEvent::RowsDropped {
            column: price_column.clone(),
            count: rows_dropped,
        });

        let (pre_tax_column, pre_tax_derived) = match resolution.pre_tax_column() {
            Some(existing) if table.has_column(existing) => (existing.to_string(), false),
            _ => {
                let derived = derive_pre_tax(&table, price_idx, self.tax_rate);
                let name = CanonicalField::SalePriceExclTax.display_name();
                table.set_column(name, derived)?;
                self.observer.record(DiagnosticEvent::PreTaxDerived {
                    from: price_column.clone(),
                    tax_rate: self.tax_rate,
                });
                (name.to_string(), true)
            }
        };

        Ok(CleanedTable {
            table,
            price_column,
            pre_tax_column,
            price_tier,
            rows_before,
            rows_dropped,
            pre_tax_derived,
        })
    }
}

/// Tries each tier in priority order.
pub fn locate_price_column(
    table: &RecordTable,
    resolution: &Resolution,
) -> Option<(PriceTier, String)> {
    canonical_price_column(table, resolution)
        .map(|c| (PriceTier::Canonical, c))
        .or_else(|| legacy_price_column(table).map(|c| (PriceTier::Legacy, c)))
        .or_else(|| heuristic_price_column(table).map(|c| (PriceTier::Heuristic, c)))
}

pub fn canonical_price_column(table: &RecordTable, resolution: &Resolution) -> Option<String> {
    resolution
        .sale_price_column()
        .filter(|column| table.has_column(column))
        .map(str::to_string)
}

pub fn legacy_price_column(table: &RecordTable) -> Option<String> {
    LEGACY_PRICE_HEADERS
        .iter()
        .find(|name| table.has_column(name))
        .map(|name| name.to_string())
}

pub fn heuristic_price_column(table: &RecordTable) -> Option<String> {
    table
        .headers()
        .iter()
        .find(|header| header_contains_all(header, &["precio", "venta"]))
        .cloned()
}

fn derive_pre_tax(table: &RecordTable, price_idx: usize, tax_rate: f64) -> Vec<Value> {
    table
        .rows()
        .iter()
        .map(|row| {
            row[price_idx]
                .to_number()
                .map_or(Value::Empty, |price| Value::Number(price / (1.0 + tax_rate)))
        })
        .collect()
}
