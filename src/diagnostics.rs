//! Observable events emitted while resolving and cleaning a table.
//!
//! Components take a `&dyn Observer` instead of reaching for a global logger.
//! The binary wires in [`LogObserver`]; tests use [`NoopObserver`] or
//! [`RecordingObserver`] to assert on what happened.

use std::cell::RefCell;
use std::fmt;

use log::{debug, info, warn};

use crate::columns::CanonicalField;

/// Fallback tier used to locate the authoritative sale-price column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTier {
    Canonical,
    Legacy,
    Heuristic,
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceTier::Canonical => "canonical",
            PriceTier::Legacy => "legacy name",
            PriceTier::Heuristic => "substring heuristic",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticEvent {
    ColumnMapped {
        field: CanonicalField,
        header: String,
    },
    FieldUnresolved {
        field: CanonicalField,
    },
    PriceColumnFallback {
        tier: PriceTier,
        header: String,
    },
    ModelColumnFallback {
        header: String,
    },
    RowsDropped {
        column: String,
        count: usize,
    },
    PreTaxDerived {
        from: String,
        tax_rate: f64,
    },
    SegmentationDegenerate {
        distinct: usize,
    },
}

pub trait Observer {
    fn record(&self, event: DiagnosticEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record(&self, _event: DiagnosticEvent) {}
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn record(&self, event: DiagnosticEvent) {
        match event {
            DiagnosticEvent::ColumnMapped { field, header } => {
                info!("Mapped column '{header}' -> '{}'", field.display_name());
            }
            DiagnosticEvent::FieldUnresolved { field } => {
                debug!(
                    "No column found for '{}' (aliases: {:?})",
                    field.display_name(),
                    field.builtin_aliases()
                );
            }
            DiagnosticEvent::PriceColumnFallback { tier, header } => {
                info!("Assumed price column '{header}' via {tier}");
            }
            DiagnosticEvent::ModelColumnFallback { header } => {
                info!("Using '{header}' as the model column");
            }
            DiagnosticEvent::RowsDropped { column, count } => {
                if count > 0 {
                    warn!("Dropped {count} row(s) with no numeric value in '{column}'");
                } else {
                    debug!("Every row has a numeric value in '{column}'");
                }
            }
            DiagnosticEvent::PreTaxDerived { from, tax_rate } => {
                info!(
                    "Derived '{}' from '{from}' at tax rate {tax_rate}",
                    CanonicalField::SalePriceExclTax.display_name()
                );
            }
            DiagnosticEvent::SegmentationDegenerate { distinct } => {
                warn!(
                    "Segmentation collapsed to a single bucket ({distinct} distinct pre-tax value(s))"
                );
            }
        }
    }
}

/// Keeps every event in memory, in emission order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<DiagnosticEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<DiagnosticEvent> {
        self.events.borrow().clone()
    }

    pub fn rows_dropped(&self) -> Option<usize> {
        self.events.borrow().iter().find_map(|event| match event {
            DiagnosticEvent::RowsDropped { count, .. } => Some(*count),
            _ => None,
        })
    }
}

impl Observer for RecordingObserver {
    fn record(&self, event: DiagnosticEvent) {
        self.events.borrow_mut().push(event);
    }
}
