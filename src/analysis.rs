//! The eight sales analyses computed from a cleaned table.
//!
//! Every analysis is independent and tolerant of missing columns: an absent
//! input yields an empty grouping or zero, never an error.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::{
    clean::CleanedTable,
    columns::CanonicalField,
    config::AnalysisConfig,
    diagnostics::{DiagnosticEvent, Observer},
    normalize::header_contains_any,
    segment::{Bins, Segment, assign_segments},
};

/// Default number of models kept in `top_modelos`.
pub const DEFAULT_TOP_MODELS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupEntry<T> {
    pub label: String,
    pub value: T,
}

/// Label -> value pairs in presentation order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Grouped<T> {
    entries: Vec<GroupEntry<T>>,
}

pub type GroupedTotals = Grouped<f64>;
pub type GroupedCounts = Grouped<usize>;

impl<T> Grouped<T> {
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, T)>,
    {
        let entries = pairs
            .into_iter()
            .map(|(label, value)| GroupEntry { label, value })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupEntry<T>> {
        self.entries.iter()
    }

    /// First `n` entries.
    pub fn head(&self, n: usize) -> &[GroupEntry<T>] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        self.entries
            .iter()
            .find(|entry| entry.label == label)
            .map(|entry| &entry.value)
    }
}

impl Grouped<f64> {
    pub fn total(&self) -> f64 {
        self.entries.iter().fold(0.0, |acc, entry| acc + entry.value)
    }
}

impl Grouped<usize> {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.value).sum()
    }
}

/// Result set of one run. Field names double as the serialized analysis keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct AnalysisResults {
    pub ventas_por_sede: GroupedTotals,
    pub top_modelos: GroupedCounts,
    pub canales_ventas: GroupedTotals,
    pub segmento_clientes: GroupedCounts,
    pub clientes_unicos: usize,
    pub total_ventas: usize,
    pub monto_total_con_igv: f64,
    pub monto_total_sin_igv: f64,
}

pub struct Aggregator<'a> {
    top_models: usize,
    observer: &'a dyn Observer,
}

impl<'a> Aggregator<'a> {
    pub fn new(top_models: usize, observer: &'a dyn Observer) -> Self {
        Self {
            top_models,
            observer,
        }
    }

    pub fn from_config(config: &AnalysisConfig, observer: &'a dyn Observer) -> Self {
        Self::new(config.top_models, observer)
    }

    pub fn analyze(&self, cleaned: &CleanedTable) -> AnalysisResults {
        AnalysisResults {
            ventas_por_sede: ventas_por_sede(cleaned),
            top_modelos: top_modelos(cleaned, self.top_models, self.observer),
            canales_ventas: canales_ventas(cleaned),
            segmento_clientes: segmento_clientes(cleaned, self.observer),
            clientes_unicos: clientes_unicos(cleaned),
            total_ventas: total_ventas(cleaned),
            monto_total_con_igv: monto_total_con_igv(cleaned),
            monto_total_sin_igv: monto_total_sin_igv(cleaned),
        }
    }
}

/// Pre-tax revenue per location, highest first.
pub fn ventas_por_sede(cleaned: &CleanedTable) -> GroupedTotals {
    sum_pre_tax_by(cleaned, CanonicalField::Location)
}

/// Pre-tax revenue per sales channel, highest first.
pub fn canales_ventas(cleaned: &CleanedTable) -> GroupedTotals {
    sum_pre_tax_by(cleaned, CanonicalField::Channel)
}

/// Most frequent models, ties broken alphabetically, truncated to `top_n`.
pub fn top_modelos(cleaned: &CleanedTable, top_n: usize, observer: &dyn Observer) -> GroupedCounts {
    let Some(column) = model_column(cleaned, observer) else {
        return Grouped::default();
    };
    let Some(cells) = cleaned.table().column(&column) else {
        return Grouped::default();
    };
    let mut counts: HashMap<String, usize> = HashMap::new();
    for label in cells.filter_map(|cell| cell.group_label()) {
        *counts.entry(label).or_insert(0) += 1;
    }
    let mut items = counts.into_iter().collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    items.truncate(top_n);
    Grouped::from_pairs(items)
}

/// Row count per price segment.
pub fn segmento_clientes(cleaned: &CleanedTable, observer: &dyn Observer) -> GroupedCounts {
    let values = cleaned.numbers(cleaned.pre_tax_column());
    let (bins, assigned) = assign_segments(&values);
    let valued = assigned.iter().flatten().count();
    if valued == 0 {
        return Grouped::default();
    }
    if let Bins::Degenerate { distinct } = bins {
        observer.record(DiagnosticEvent::SegmentationDegenerate { distinct });
        return Grouped::from_pairs([(Segment::Bajo.label().to_string(), valued)]);
    }
    let mut counts = Segment::ALL.map(|segment| (segment, 0usize));
    for segment in assigned.into_iter().flatten() {
        counts[segment as usize].1 += 1;
    }
    let mut items = counts.to_vec();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    Grouped::from_pairs(
        items
            .into_iter()
            .map(|(segment, count)| (segment.label().to_string(), count)),
    )
}

pub fn clientes_unicos(cleaned: &CleanedTable) -> usize {
    cleaned
        .table()
        .column(CanonicalField::Customer.display_name())
        .map(|cells| {
            cells
                .filter_map(|cell| cell.group_label())
                .collect::<HashSet<_>>()
                .len()
        })
        .unwrap_or(0)
}

pub fn total_ventas(cleaned: &CleanedTable) -> usize {
    cleaned.len()
}

pub fn monto_total_con_igv(cleaned: &CleanedTable) -> f64 {
    sum_column(cleaned, cleaned.price_column())
}

pub fn monto_total_sin_igv(cleaned: &CleanedTable) -> f64 {
    sum_column(cleaned, cleaned.pre_tax_column())
}

fn sum_column(cleaned: &CleanedTable, column: &str) -> f64 {
    // Starts from +0.0; an empty `sum()` of floats yields -0.0.
    cleaned
        .numbers(column)
        .into_iter()
        .flatten()
        .fold(0.0, |acc, value| acc + value)
}

fn sum_pre_tax_by(cleaned: &CleanedTable, field: CanonicalField) -> GroupedTotals {
    let table = cleaned.table();
    let (Some(label_idx), Some(value_idx)) = (
        table.column_index(field.display_name()),
        table.column_index(cleaned.pre_tax_column()),
    ) else {
        return Grouped::default();
    };
    let mut totals: BTreeMap<String, f64> = BTreeMap::new();
    for row in table.rows() {
        let Some(label) = row[label_idx].group_label() else {
            continue;
        };
        *totals.entry(label).or_insert(0.0) += row[value_idx].to_number().unwrap_or(0.0);
    }
    let mut items = totals.into_iter().collect::<Vec<_>>();
    items.sort_by(|a, b| b.1.total_cmp(&a.1));
    Grouped::from_pairs(items)
}

fn model_column(cleaned: &CleanedTable, observer: &dyn Observer) -> Option<String> {
    let table = cleaned.table();
    let canonical = CanonicalField::Model.display_name();
    if table.has_column(canonical) {
        return Some(canonical.to_string());
    }
    let fallback = table
        .headers()
        .iter()
        .find(|header| header_contains_any(header, &["modelo", "vehicul"]))?
        .clone();
    observer.record(DiagnosticEvent::ModelColumnFallback {
        header: fallback.clone(),
    });
    Some(fallback)
}
