mod common;

use common::{assert_close, sales_table, table};
use sales_pulse::{
    columns::{AliasTable, CanonicalField},
    config::AnalysisConfig,
    diagnostics::{DiagnosticEvent, NoopObserver, PriceTier, RecordingObserver},
    error::SalesError,
    report::build_report,
};

#[test]
fn ten_row_export_with_one_blank_price() {
    let observer = RecordingObserver::new();
    let report = build_report(
        sales_table(),
        &AnalysisConfig::default(),
        &AliasTable::default(),
        &observer,
    )
    .expect("report builds");

    let results = &report.results;
    assert_eq!(results.total_ventas, 9);
    assert_eq!(report.cleaned.rows_before(), 10);
    assert_eq!(report.cleaned.rows_dropped(), 1);
    assert_eq!(observer.rows_dropped(), Some(1));
    assert_eq!(results.clientes_unicos, 6);
    assert_close(results.monto_total_con_igv, 887_360.0);
    assert_close(results.monto_total_sin_igv, 752_000.0);
    assert!(report.cleaned.pre_tax_derived());
    assert_eq!(report.cleaned.price_tier(), PriceTier::Canonical);

    let sedes: Vec<_> = results
        .ventas_por_sede
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(sedes, ["Lima", "Arequipa", "Piura", "Cusco"]);
    assert_close(*results.ventas_por_sede.get("Lima").unwrap(), 380_000.0);
    assert_close(*results.ventas_por_sede.get("Cusco").unwrap(), 52_000.0);

    let modelos: Vec<_> = results
        .top_modelos
        .iter()
        .map(|e| (e.label.as_str(), e.value))
        .collect();
    assert_eq!(
        modelos,
        [("Hilux", 4), ("Yaris", 3), ("Corolla", 1), ("RAV4", 1)]
    );

    let canales: Vec<_> = results
        .canales_ventas
        .iter()
        .map(|e| e.label.as_str())
        .collect();
    assert_eq!(canales, ["Tienda", "Online", "Distribuidor"]);

    assert_eq!(results.segmento_clientes.get("Bajo"), Some(&3));
    assert_eq!(results.segmento_clientes.get("Medio-Bajo"), Some(&2));
    assert_eq!(results.segmento_clientes.get("Medio-Alto"), Some(&2));
    assert_eq!(results.segmento_clientes.get("Alto"), Some(&2));
    assert_eq!(results.segmento_clientes.head(1)[0].label, "Bajo");

    assert!(report.summary.contains("• Total de ventas: 9"));
    assert!(report.summary.contains("• Monto total (con IGV): $887,360.00"));
    assert!(report.summary.contains("1. Hilux: 4 unidades"));
    assert!(report.summary.contains("• Piura: $98,000.00"));
    assert!(!report.summary.contains("Cusco"));
}

#[test]
fn export_without_any_price_column_fails() {
    let input = table(
        &["Sede", "Modelo", "Costo"],
        &[&["Lima", "Hilux", "1000"], &["Cusco", "Yaris", "800"]],
    );
    let err = build_report(
        input,
        &AnalysisConfig::default(),
        &AliasTable::default(),
        &NoopObserver,
    )
    .unwrap_err();
    assert!(matches!(err, SalesError::MissingPriceColumn { .. }));
    assert!(err.to_string().contains("no sale-price column"));
}

#[test]
fn existing_pre_tax_column_is_used_untouched() {
    let input = table(
        &["Sede", "Precio Venta Real", "Precio Venta sin IGV"],
        &[
            &["Lima", "118", "90"],
            &["Lima", "236", "150"],
            &["Cusco", "", "70"],
        ],
    );
    let observer = RecordingObserver::new();
    let report = build_report(
        input,
        &AnalysisConfig::default(),
        &AliasTable::default(),
        &observer,
    )
    .unwrap();
    assert!(!report.cleaned.pre_tax_derived());
    assert_eq!(
        report.cleaned.numbers(CanonicalField::SalePriceExclTax.display_name()),
        vec![Some(90.0), Some(150.0)]
    );
    assert_close(report.results.monto_total_sin_igv, 240.0);
    assert_close(report.results.monto_total_con_igv, 354.0);
    assert!(
        !observer
            .events()
            .iter()
            .any(|e| matches!(e, DiagnosticEvent::PreTaxDerived { .. }))
    );
}

#[test]
fn tax_rate_comes_from_config() {
    let config = AnalysisConfig {
        tax_rate: 0.0,
        ..AnalysisConfig::default()
    };
    let report = build_report(sales_table(), &config, &AliasTable::default(), &NoopObserver).unwrap();
    assert_close(
        report.results.monto_total_sin_igv,
        report.results.monto_total_con_igv,
    );
}

#[test]
fn top_models_respects_configured_count() {
    let config = AnalysisConfig {
        top_models: 2,
        ..AnalysisConfig::default()
    };
    let report = build_report(sales_table(), &config, &AliasTable::default(), &NoopObserver).unwrap();
    assert_eq!(report.results.top_modelos.len(), 2);
    assert!(report.summary.contains("TOP 2 MODELOS"));
}

#[test]
fn missing_optional_columns_yield_empty_groups() {
    let input = table(&["precio_venta"], &[&["118"], &["236"]]);
    let report = build_report(
        input,
        &AnalysisConfig::default(),
        &AliasTable::default(),
        &NoopObserver,
    )
    .unwrap();
    let results = &report.results;
    assert!(results.ventas_por_sede.is_empty());
    assert!(results.canales_ventas.is_empty());
    assert!(results.top_modelos.is_empty());
    assert_eq!(results.clientes_unicos, 0);
    assert_eq!(results.total_ventas, 2);
    assert_eq!(results.segmento_clientes.total(), 2);
}

#[test]
fn every_price_dropped_gives_zero_totals() {
    let input = table(
        &["Sede", "Modelo", "Precio de venta"],
        &[&["Lima", "Hilux", ""], &["Cusco", "Yaris", "x"]],
    );
    let report = build_report(
        input,
        &AnalysisConfig::default(),
        &AliasTable::default(),
        &NoopObserver,
    )
    .unwrap();
    let results = &report.results;
    assert_eq!(report.cleaned.rows_dropped(), 2);
    assert!(report.cleaned.is_empty());
    assert_eq!(results.total_ventas, 0);
    assert_eq!(results.clientes_unicos, 0);
    assert!(results.ventas_por_sede.is_empty());
    assert!(results.top_modelos.is_empty());
    assert!(results.segmento_clientes.is_empty());
    assert_eq!(results.monto_total_con_igv, 0.0);
    assert!(results.monto_total_con_igv.is_sign_positive());
    assert!(results.monto_total_sin_igv.is_sign_positive());

    assert!(report.summary.contains("• Monto total (con IGV): $0.00"));
    assert!(report.summary.contains("• Monto total (sin IGV): $0.00"));
    assert!(!report.summary.contains("$-"));

    let json = serde_json::to_string(results).unwrap();
    assert!(json.contains("\"monto_total_con_igv\":0.0"));
    assert!(!json.contains("-0.0"));
}
