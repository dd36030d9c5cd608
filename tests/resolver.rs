mod common;

use proptest::prelude::*;
use sales_pulse::{
    columns::{AliasTable, CanonicalField, ColumnResolver, MatchKind},
    diagnostics::{DiagnosticEvent, NoopObserver, RecordingObserver},
    normalize::normalize_header,
};

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[test]
fn pre_tax_spellings_resolve_to_the_same_field() {
    let aliases = AliasTable::default();
    for spelling in [
        "PRECIO_VENTA_SIN_IGV",
        "Precio Venta sin IGV",
        "precio venta sin igv",
    ] {
        let resolution =
            ColumnResolver::new(&aliases, &NoopObserver).resolve(&headers(&[spelling]));
        assert_eq!(
            resolution.source_header(CanonicalField::SalePriceExclTax),
            Some(spelling),
            "spelling {spelling:?}"
        );
        assert_eq!(resolution.pre_tax_column(), Some("Precio sin IGV"));
    }
}

#[test]
fn accented_and_plain_location_headers_match() {
    let aliases = AliasTable::default();
    for spelling in ["Ubicación", "ubicacion", "UBICACION", "Ubicacion_Sede"] {
        let resolution =
            ColumnResolver::new(&aliases, &NoopObserver).resolve(&headers(&[spelling]));
        assert_eq!(
            resolution.source_header(CanonicalField::Location),
            Some(spelling)
        );
    }
}

#[test]
fn resolving_a_canonical_table_is_a_no_op() {
    let canonical: Vec<String> = CanonicalField::ALL
        .iter()
        .map(|field| field.display_name().to_string())
        .collect();
    let aliases = AliasTable::default();
    let resolution = ColumnResolver::new(&aliases, &NoopObserver).resolve(&canonical);
    assert!(resolution.unresolved().is_empty());
    assert_eq!(resolution.renames().count(), 0);
    for field in CanonicalField::ALL {
        assert_eq!(resolution.source_header(field), Some(field.display_name()));
    }

    let mut table = common::table(
        &canonical.iter().map(String::as_str).collect::<Vec<_>>(),
        &[],
    );
    resolution.apply(&mut table);
    assert_eq!(table.headers(), canonical.as_slice());
}

#[test]
fn mapping_events_are_emitted_per_field() {
    let aliases = AliasTable::default();
    let observer = RecordingObserver::new();
    ColumnResolver::new(&aliases, &observer).resolve(&headers(&["Sede", "Precio Venta"]));
    let events = observer.events();
    assert_eq!(events.len(), CanonicalField::ALL.len());
    assert!(events.contains(&DiagnosticEvent::ColumnMapped {
        field: CanonicalField::Location,
        header: "Sede".into(),
    }));
    assert!(events.contains(&DiagnosticEvent::FieldUnresolved {
        field: CanonicalField::Channel,
    }));
}

#[test]
fn apply_renames_without_reordering_or_dropping() {
    let mut table = common::table(
        &["Fecha", "Ubicación", "Precio Venta Real", "Notas"],
        &[&["2024-01-02", "Lima", "100", "x"]],
    );
    let aliases = AliasTable::default();
    let resolution = ColumnResolver::new(&aliases, &NoopObserver).resolve(table.headers());
    resolution.apply(&mut table);
    assert_eq!(table.headers(), ["Fecha", "Sede", "Precio de venta", "Notas"]);
    assert_eq!(table.rows()[0][3].as_display(), "x");
}

#[test]
fn id_vehiculo_resolves_model_by_alias() {
    let aliases = AliasTable::default();
    let resolution =
        ColumnResolver::new(&aliases, &NoopObserver).resolve(&headers(&["ID_Vehículo"]));
    let found = &resolution.matches()[0];
    assert_eq!(found.field, CanonicalField::Model);
    assert_eq!(found.kind, MatchKind::Alias);
}

fn alias_variant() -> impl Strategy<Value = (CanonicalField, String)> {
    let pairs: Vec<(CanonicalField, &'static str)> = CanonicalField::ALL
        .iter()
        .flat_map(|field| field.builtin_aliases().iter().map(move |a| (*field, *a)))
        .collect();
    (
        proptest::sample::select(pairs),
        proptest::collection::vec(any::<bool>(), 32),
        prop_oneof![Just(" "), Just("_"), Just("  "), Just(" _ ")],
        "[ \t]{0,2}",
        "[ \t]{0,2}",
    )
        .prop_map(|((field, alias), upper, separator, lead, trail)| {
            let cased: String = alias
                .chars()
                .enumerate()
                .map(|(idx, ch)| {
                    if upper[idx % upper.len()] {
                        ch.to_uppercase().collect::<String>()
                    } else {
                        ch.to_string()
                    }
                })
                .collect();
            let spaced = cased.split([' ', '_']).collect::<Vec<_>>().join(separator);
            (field, format!("{lead}{spaced}{trail}"))
        })
}

proptest! {
    #[test]
    fn alias_variants_resolve_to_their_field((field, header) in alias_variant()) {
        let aliases = AliasTable::default();
        let resolution = ColumnResolver::new(&aliases, &NoopObserver)
            .resolve(std::slice::from_ref(&header));
        prop_assert_eq!(resolution.source_header(field), Some(header.as_str()));
    }

    #[test]
    fn normalization_is_idempotent(text in "[A-Za-zÁÉÍÓÚáéíóúÑñ_ \t]{0,24}") {
        let once = normalize_header(&text);
        prop_assert_eq!(normalize_header(&once), once.clone());
    }
}
