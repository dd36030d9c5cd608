//! Header normalization.
//!
//! Spreadsheet exports spell the same column many ways: `"Ubicación"`,
//! `"UBICACION"`, `" ubicacion "`. [`normalize_header()`] folds those into a
//! single comparison key so the resolver can match them against its aliases.

use itertools::Itertools;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Builds the comparison key for a header or alias.
///
/// Steps: compatibility-decompose and drop combining marks, trim, lower-case,
/// turn underscores into spaces and collapse whitespace runs to one space.
pub fn normalize_header(text: &str) -> String {
    let stripped = strip_accents(text);
    let lowered = stripped.trim().to_lowercase().replace('_', " ");
    lowered.split_whitespace().join(" ")
}

/// Removes diacritical marks, keeping the base letters.
fn strip_accents(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// True when the normalized header contains every one of `needles`.
pub(crate) fn header_contains_all(header: &str, needles: &[&str]) -> bool {
    let normalized = normalize_header(header);
    needles.iter().all(|needle| normalized.contains(needle))
}

/// True when the normalized header contains at least one of `needles`.
pub(crate) fn header_contains_any(header: &str, needles: &[&str]) -> bool {
    let normalized = normalize_header(header);
    needles.iter().any(|needle| normalized.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accents_and_case_fold_to_same_key() {
        assert_eq!(normalize_header("Ubicación"), "ubicacion");
        assert_eq!(normalize_header("UBICACION"), "ubicacion");
        assert_eq!(normalize_header("  ubicacion "), "ubicacion");
    }

    #[test]
    fn underscores_and_whitespace_collapse() {
        assert_eq!(normalize_header("Ubicacion_Sede"), "ubicacion sede");
        assert_eq!(normalize_header("PRECIO__VENTA\t SIN  IGV"), "precio venta sin igv");
        assert_ne!(normalize_header("Ubicacion_Sede"), normalize_header("Ubicación"));
    }

    #[test]
    fn enye_loses_its_tilde() {
        assert_eq!(normalize_header("Año"), "ano");
        assert_eq!(normalize_header("ID_Vehículo"), "id vehiculo");
    }

    #[test]
    fn substring_helpers_use_normalized_form() {
        assert!(header_contains_all("Precio_Venta_Final", &["precio", "venta"]));
        assert!(!header_contains_all("Precio Costo", &["precio", "venta"]));
        assert!(header_contains_any("Vehículo vendido", &["modelo", "vehicul"]));
    }

    #[test]
    fn empty_input_stays_empty() {
        assert_eq!(normalize_header(""), "");
        assert_eq!(normalize_header("   "), "");
    }
}
