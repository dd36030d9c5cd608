//! Canonical fields, the alias table and the column resolver.
//!
//! The resolver maps a table's real headers onto a fixed set of canonical
//! fields. For each field, explicit aliases are tried in order (first match
//! wins); only when none match is the field's own display name tried. Fields
//! that never match stay unresolved, which downstream analyses treat as
//! "no data" rather than as a failure.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    diagnostics::{DiagnosticEvent, Observer},
    normalize::normalize_header,
    records::RecordTable,
};

/// Exact headers accepted for the sale price when no alias matched.
pub const LEGACY_PRICE_HEADERS: &[&str] = &["Precio Venta Real", "Precio Venta"];
/// Exact headers accepted for the pre-tax price when no alias matched.
pub const LEGACY_PRE_TAX_HEADERS: &[&str] = &["Precio Venta sin IGV"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    SalePrice,
    SalePriceExclTax,
    Location,
    Customer,
    Model,
    Channel,
}

impl CanonicalField {
    /// Declaration order, which is also resolution order.
    pub const ALL: [CanonicalField; 6] = [
        CanonicalField::SalePrice,
        CanonicalField::SalePriceExclTax,
        CanonicalField::Location,
        CanonicalField::Customer,
        CanonicalField::Model,
        CanonicalField::Channel,
    ];

    /// Column name the field is renamed to once resolved.
    pub fn display_name(self) -> &'static str {
        match self {
            CanonicalField::SalePrice => "Precio de venta",
            CanonicalField::SalePriceExclTax => "Precio sin IGV",
            CanonicalField::Location => "Sede",
            CanonicalField::Customer => "Cliente",
            CanonicalField::Model => "Modelo",
            CanonicalField::Channel => "Canal",
        }
    }

    pub fn builtin_aliases(self) -> &'static [&'static str] {
        match self {
            CanonicalField::SalePrice => &[
                "precio de venta",
                "precio venta real",
                "precio_venta",
                "precio venta",
                "precio venta (con igv)",
            ],
            CanonicalField::SalePriceExclTax => &[
                "precio sin igv",
                "precio venta sin igv",
                "precio_venta_sin_igv",
                "precio venta (sin igv)",
            ],
            CanonicalField::Location => &["sede", "ubicación", "ubicacion", "ubicacion sede"],
            CanonicalField::Customer => &["cliente", "clientes"],
            CanonicalField::Model => &["modelo", "id_vehículo", "id_vehiculo"],
            CanonicalField::Channel => &["canal"],
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Ordered aliases per canonical field.
#[derive(Debug, Clone, PartialEq)]
pub struct AliasTable {
    entries: Vec<(CanonicalField, Vec<String>)>,
}

impl Default for AliasTable {
    fn default() -> Self {
        let entries = CanonicalField::ALL
            .iter()
            .map(|field| {
                let aliases = field
                    .builtin_aliases()
                    .iter()
                    .map(|alias| alias.to_string())
                    .collect();
                (*field, aliases)
            })
            .collect();
        Self { entries }
    }
}

impl AliasTable {
    /// Appends extra aliases after the built-in ones, so built-ins keep priority.
    pub fn with_extra_aliases(mut self, extra: &BTreeMap<CanonicalField, Vec<String>>) -> Self {
        for (field, aliases) in &mut self.entries {
            if let Some(more) = extra.get(field) {
                for alias in more {
                    if !aliases.contains(alias) {
                        aliases.push(alias.clone());
                    }
                }
            }
        }
        self
    }

    pub fn aliases(&self, field: CanonicalField) -> &[String] {
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, aliases)| aliases.as_slice())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &[String])> {
        self.entries
            .iter()
            .map(|(field, aliases)| (*field, aliases.as_slice()))
    }
}

/// How a canonical field was matched to a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Alias,
    CanonicalName,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldMatch {
    pub field: CanonicalField,
    /// Header as it appears in the source file.
    pub header: String,
    pub kind: MatchKind,
}

/// Outcome of resolving one table's headers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resolution {
    matches: Vec<FieldMatch>,
    unresolved: Vec<CanonicalField>,
    sale_price_column: Option<String>,
    pre_tax_column: Option<String>,
}

impl Resolution {
    pub fn matches(&self) -> &[FieldMatch] {
        &self.matches
    }

    pub fn unresolved(&self) -> &[CanonicalField] {
        &self.unresolved
    }

    pub fn source_header(&self, field: CanonicalField) -> Option<&str> {
        self.matches
            .iter()
            .find(|m| m.field == field)
            .map(|m| m.header.as_str())
    }

    pub fn is_resolved(&self, field: CanonicalField) -> bool {
        self.source_header(field).is_some()
    }

    /// Rename instructions (source header -> canonical name). Matches whose
    /// header already carries the canonical name are left out.
    pub fn renames(&self) -> impl Iterator<Item = (&str, &'static str)> {
        self.matches
            .iter()
            .filter(|m| m.header != m.field.display_name())
            .map(|m| (m.header.as_str(), m.field.display_name()))
    }

    /// Column backing the sale price in the renamed table.
    pub fn sale_price_column(&self) -> Option<&str> {
        self.sale_price_column.as_deref()
    }

    /// Column backing the pre-tax price in the renamed table.
    pub fn pre_tax_column(&self) -> Option<&str> {
        self.pre_tax_column.as_deref()
    }

    /// Applies the renames to the table headers.
    pub fn apply(&self, table: &mut RecordTable) {
        table.rename_columns(self.renames());
    }
}

pub struct ColumnResolver<'a> {
    aliases: &'a AliasTable,
    observer: &'a dyn Observer,
}

impl<'a> ColumnResolver<'a> {
    pub fn new(aliases: &'a AliasTable, observer: &'a dyn Observer) -> Self {
        Self { aliases, observer }
    }

    pub fn resolve(&self, headers: &[String]) -> Resolution {
        let lookup = build_lookup(headers);
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut resolution = Resolution::default();

        for (field, aliases) in self.aliases.iter() {
            let found = match_aliases(&lookup, aliases, &claimed)
                .map(|header| (header, MatchKind::Alias))
                .or_else(|| {
                    match_alias(&lookup, field.display_name(), &claimed)
                        .map(|header| (header, MatchKind::CanonicalName))
                });
            match found {
                Some((header, kind)) => {
                    claimed.insert(header);
                    self.observer.record(DiagnosticEvent::ColumnMapped {
                        field,
                        header: header.to_string(),
                    });
                    resolution.matches.push(FieldMatch {
                        field,
                        header: header.to_string(),
                        kind,
                    });
                }
                None => {
                    self.observer
                        .record(DiagnosticEvent::FieldUnresolved { field });
                    resolution.unresolved.push(field);
                }
            }
        }

        let renamed = renamed_headers(headers, &resolution);
        resolution.sale_price_column =
            backing_column(&renamed, CanonicalField::SalePrice, LEGACY_PRICE_HEADERS);
        resolution.pre_tax_column = backing_column(
            &renamed,
            CanonicalField::SalePriceExclTax,
            LEGACY_PRE_TAX_HEADERS,
        );
        resolution
    }
}

/// Normalized key -> original header. The first header wins when two
/// normalize to the same key.
fn build_lookup(headers: &[String]) -> HashMap<String, &str> {
    let mut lookup = HashMap::with_capacity(headers.len());
    for header in headers {
        lookup
            .entry(normalize_header(header))
            .or_insert(header.as_str());
    }
    lookup
}

fn match_aliases<'h>(
    lookup: &HashMap<String, &'h str>,
    aliases: &[String],
    claimed: &HashSet<&str>,
) -> Option<&'h str> {
    aliases
        .iter()
        .find_map(|alias| match_alias(lookup, alias, claimed))
}

fn match_alias<'h>(
    lookup: &HashMap<String, &'h str>,
    alias: &str,
    claimed: &HashSet<&str>,
) -> Option<&'h str> {
    lookup
        .get(&normalize_header(alias))
        .copied()
        .filter(|header| !claimed.contains(header))
}

fn renamed_headers(headers: &[String], resolution: &Resolution) -> Vec<String> {
    let renames: HashMap<&str, &str> = resolution.renames().collect();
    headers
        .iter()
        .map(|h| renames.get(h.as_str()).map_or_else(|| h.clone(), |t| t.to_string()))
        .collect()
}

fn backing_column(
    renamed: &[String],
    field: CanonicalField,
    legacy: &[&str],
) -> Option<String> {
    std::iter::once(field.display_name())
        .chain(legacy.iter().copied())
        .find(|name| renamed.iter().any(|h| h == name))
        .map(str::to_string)
}
