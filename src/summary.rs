//! Chat-ready summary of an analysis run.

use std::fmt::Write as _;

use crate::analysis::AnalysisResults;

/// Locations listed in the summary.
pub const DEFAULT_TOP_LOCATIONS: usize = 3;

const BANNER_WIDTH: usize = 45;

#[derive(Debug, Clone, Copy)]
pub struct SummaryFormatter {
    top_locations: usize,
}

impl Default for SummaryFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_TOP_LOCATIONS)
    }
}

impl SummaryFormatter {
    pub fn new(top_locations: usize) -> Self {
        Self { top_locations }
    }

    /// Renders the fixed section order: banner, core metrics, top models (if
    /// any), top locations (if any), closing notice.
    pub fn format(&self, results: &AnalysisResults) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "📊 *REPORTE DE VENTAS - ANÁLISIS AUTOMÁTICO*");
        let _ = writeln!(out, "{}", "=".repeat(BANNER_WIDTH));
        out.push('\n');

        let _ = writeln!(out, "📈 *MÉTRICAS PRINCIPALES*");
        let _ = writeln!(out, "• Total de ventas: {}", results.total_ventas);
        let _ = writeln!(out, "• Clientes únicos: {}", results.clientes_unicos);
        let _ = writeln!(
            out,
            "• Monto total (con IGV): {}",
            format_currency(results.monto_total_con_igv)
        );
        let _ = writeln!(
            out,
            "• Monto total (sin IGV): {}",
            format_currency(results.monto_total_sin_igv)
        );
        out.push('\n');

        if !results.top_modelos.is_empty() {
            let _ = writeln!(
                out,
                "🚗 *TOP {} MODELOS MÁS VENDIDOS*",
                results.top_modelos.len()
            );
            for (rank, entry) in results.top_modelos.iter().enumerate() {
                let _ = writeln!(out, "{}. {}: {} unidades", rank + 1, entry.label, entry.value);
            }
            out.push('\n');
        }

        if !results.ventas_por_sede.is_empty() {
            let _ = writeln!(out, "🏢 *VENTAS POR SEDE (sin IGV)*");
            for entry in results.ventas_por_sede.head(self.top_locations) {
                let _ = writeln!(out, "• {}: {}", entry.label, format_currency(entry.value));
            }
            out.push('\n');
        }

        out.push_str("📱 Gráficos adjuntos en los siguientes mensajes.\n");
        out.push_str("🤖 Reporte generado automáticamente");
        out
    }
}

pub fn format_summary(results: &AnalysisResults) -> String {
    SummaryFormatter::default().format(results)
}

/// `$1,234.56` style amount: comma thousands separator, dot decimal point, two
/// decimals, independent of locale. Negative amounts render as `$-9.99`;
/// anything that rounds to zero renders as `$0.00`.
pub fn format_currency(amount: f64) -> String {
    let magnitude = format_amount(amount.abs());
    if amount < 0.0 && magnitude != "0.00" {
        format!("$-{magnitude}")
    } else {
        format!("${magnitude}")
    }
}

/// Non-negative amount with thousands separators and two decimals.
fn format_amount(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (integer, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}.{fraction}", group_thousands(integer))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (idx, ch) in digits.chars().enumerate() {
        if idx != 0 && idx % 3 == offset {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}
