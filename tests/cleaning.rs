mod common;

use proptest::prelude::*;
use sales_pulse::{
    clean::{Cleaner, DEFAULT_TAX_RATE},
    columns::{AliasTable, ColumnResolver},
    data::Value,
    diagnostics::{DiagnosticEvent, NoopObserver, PriceTier, RecordingObserver},
    records::RecordTable,
};

fn clean(mut table: RecordTable, observer: &RecordingObserver) -> sales_pulse::clean::CleanedTable {
    let aliases = AliasTable::default();
    let resolution = ColumnResolver::new(&aliases, observer).resolve(table.headers());
    resolution.apply(&mut table);
    Cleaner::new(DEFAULT_TAX_RATE, observer)
        .clean(table, &resolution)
        .expect("table has a price column")
}

fn price_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        4 => (0u32..5_000_000).prop_map(|n| format!("{}.{:02}", n / 100, n % 100)),
        1 => Just(String::new()),
        1 => Just("N/A".to_string()),
        1 => Just(" - ".to_string()),
        1 => "[a-z]{1,6}",
    ]
}

proptest! {
    #[test]
    fn kept_plus_dropped_equals_loaded(cells in proptest::collection::vec(price_cell(), 0..40)) {
        let rows: Vec<Vec<Value>> = cells
            .iter()
            .map(|cell| vec![Value::from("Lima"), Value::from(cell.as_str())])
            .collect();
        let table = RecordTable::from_rows(vec!["Sede".into(), "Precio Venta".into()], rows);
        let observer = RecordingObserver::new();
        let cleaned = clean(table, &observer);

        let numeric = cells
            .iter()
            .filter(|c| c.trim().parse::<f64>().is_ok_and(f64::is_finite))
            .count();
        prop_assert_eq!(cleaned.len(), numeric);
        prop_assert_eq!(cleaned.len() + cleaned.rows_dropped(), cleaned.rows_before());
        prop_assert_eq!(observer.rows_dropped(), Some(cleaned.rows_dropped()));
        prop_assert!(
            cleaned
                .numbers(cleaned.price_column())
                .iter()
                .all(Option::is_some)
        );
    }

    #[test]
    fn derived_pre_tax_times_rate_gives_price(cells in proptest::collection::vec(price_cell(), 1..40)) {
        let rows: Vec<Vec<Value>> = cells.iter().map(|c| vec![Value::from(c.as_str())]).collect();
        let table = RecordTable::from_rows(vec!["PRECIO_VENTA_REAL".into()], rows);
        let cleaned = clean(table, &RecordingObserver::new());
        prop_assert!(cleaned.pre_tax_derived());
        let prices = cleaned.numbers(cleaned.price_column());
        let pre_tax = cleaned.numbers(cleaned.pre_tax_column());
        prop_assert_eq!(prices.len(), pre_tax.len());
        for (price, base) in prices.into_iter().zip(pre_tax) {
            let (price, base) = (price.unwrap(), base.unwrap());
            prop_assert!((base * (1.0 + DEFAULT_TAX_RATE) - price).abs() < 1e-6);
        }
    }
}

#[test]
fn substring_heuristic_is_reported() {
    let table = common::table(&["Sede", "Precio_Venta_Final"], &[&["Lima", "236"], &["Lima", "x"]]);
    let observer = RecordingObserver::new();
    let cleaned = clean(table, &observer);
    assert_eq!(cleaned.price_tier(), PriceTier::Heuristic);
    assert_eq!(cleaned.price_column(), "Precio_Venta_Final");
    assert_eq!(cleaned.len(), 1);
    assert!(observer.events().contains(&DiagnosticEvent::PriceColumnFallback {
        tier: PriceTier::Heuristic,
        header: "Precio_Venta_Final".into(),
    }));
}

#[test]
fn other_columns_are_not_coerced() {
    let table = common::table(&["Cliente", "Precio de venta"], &[&["007", "10"]]);
    let cleaned = clean(table, &RecordingObserver::new());
    assert_eq!(cleaned.table().rows()[0][0], Value::Text("007".into()));
}

#[test]
fn custom_tax_rate_drives_derivation() {
    let mut table = common::table(&["Precio de venta"], &[&["110"]]);
    let aliases = AliasTable::default();
    let resolution = ColumnResolver::new(&aliases, &NoopObserver).resolve(table.headers());
    resolution.apply(&mut table);
    let cleaned = Cleaner::new(0.10, &NoopObserver)
        .clean(table, &resolution)
        .unwrap();
    common::assert_close(cleaned.numbers("Precio sin IGV")[0].unwrap(), 100.0);
}
