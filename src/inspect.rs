//! The `columns` command: prints how each canonical field resolved.

use anyhow::Result;
use log::info;

use crate::{
    clean::locate_price_column,
    cli::ColumnsArgs,
    columns::{CanonicalField, ColumnResolver, MatchKind, Resolution},
    diagnostics::NoopObserver,
    loader,
    records::RecordTable,
    report::{base_config, load_options},
    table,
};

pub fn execute(args: &ColumnsArgs) -> Result<()> {
    let config = base_config(&args.input)?;
    let mut records = loader::load_table(&args.input.input, &load_options(&args.input))?;
    let aliases = config.alias_table();
    let resolution = ColumnResolver::new(&aliases, &NoopObserver).resolve(records.headers());
    resolution.apply(&mut records);

    let headers = vec![
        "field".to_string(),
        "column".to_string(),
        "matched by".to_string(),
    ];
    table::print_table(&headers, &resolution_rows(&resolution, &records));
    info!(
        "{} of {} field(s) resolved",
        CanonicalField::ALL.len() - resolution.unresolved().len(),
        CanonicalField::ALL.len()
    );
    Ok(())
}

/// One row per canonical field plus the authoritative price column.
pub fn resolution_rows(resolution: &Resolution, renamed: &RecordTable) -> Vec<Vec<String>> {
    let mut rows = CanonicalField::ALL
        .iter()
        .map(|field| match resolution.matches().iter().find(|m| m.field == *field) {
            Some(found) => vec![
                field.display_name().to_string(),
                found.header.clone(),
                match found.kind {
                    MatchKind::Alias => "alias".to_string(),
                    MatchKind::CanonicalName => "canonical name".to_string(),
                },
            ],
            None => vec![
                field.display_name().to_string(),
                "<unresolved>".to_string(),
                String::new(),
            ],
        })
        .collect::<Vec<_>>();
    let price = match locate_price_column(renamed, resolution) {
        Some((tier, column)) => vec!["price source".to_string(), column, tier.to_string()],
        None => vec![
            "price source".to_string(),
            "<missing>".to_string(),
            String::new(),
        ],
    };
    rows.push(price);
    rows
}
