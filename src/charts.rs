//! Chart collaborator seam.
//!
//! A renderer receives the cleaned table and the result set and returns the
//! files it produced, in the order they should be delivered. [`CsvChartWriter`]
//! writes one series file per non-empty grouped analysis plus a dashboard of
//! scalar metrics, ready for any plotting tool.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info};

use crate::{
    analysis::{AnalysisResults, Grouped},
    clean::CleanedTable,
    io_utils,
};

pub trait ChartRenderer {
    fn render(&self, cleaned: &CleanedTable, results: &AnalysisResults) -> Result<Vec<PathBuf>>;
}

pub struct CsvChartWriter {
    output_dir: PathBuf,
    stamp: String,
}

impl CsvChartWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_stamp(output_dir, Local::now().format("%Y%m%d_%H%M%S").to_string())
    }

    pub fn with_stamp(output_dir: impl Into<PathBuf>, stamp: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            stamp: stamp.into(),
        }
    }

    fn path_for(&self, name: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_{}.csv", self.stamp))
    }

    fn write_series<T: ToString>(
        &self,
        name: &str,
        value_header: &str,
        series: &Grouped<T>,
    ) -> Result<Option<PathBuf>> {
        if series.is_empty() {
            debug!("Skipping chart '{name}': no data");
            return Ok(None);
        }
        let path = self.path_for(name);
        let mut writer = io_utils::open_csv_writer(&path)?;
        writer.write_record(["label", value_header])?;
        for entry in series.iter() {
            writer.write_record([entry.label.as_str(), entry.value.to_string().as_str()])?;
        }
        writer
            .flush()
            .with_context(|| format!("Flushing chart file {path:?}"))?;
        Ok(Some(path))
    }

    fn write_dashboard(&self, results: &AnalysisResults) -> Result<PathBuf> {
        let path = self.path_for("dashboard_resumen");
        let mut writer = io_utils::open_csv_writer(&path)?;
        writer.write_record(["metric", "value"])?;
        let metrics = [
            ("total_ventas", results.total_ventas.to_string()),
            ("clientes_unicos", results.clientes_unicos.to_string()),
            ("monto_total_con_igv", format!("{:.2}", results.monto_total_con_igv)),
            ("monto_total_sin_igv", format!("{:.2}", results.monto_total_sin_igv)),
        ];
        for (metric, value) in &metrics {
            writer.write_record([*metric, value.as_str()])?;
        }
        writer
            .flush()
            .with_context(|| format!("Flushing chart file {path:?}"))?;
        Ok(path)
    }
}

impl ChartRenderer for CsvChartWriter {
    fn render(&self, _cleaned: &CleanedTable, results: &AnalysisResults) -> Result<Vec<PathBuf>> {
        ensure_dir(&self.output_dir)?;
        let written = [
            self.write_series("ventas_por_sede", "total_sin_igv", &results.ventas_por_sede)?,
            self.write_series("top_modelos", "unidades", &results.top_modelos)?,
            self.write_series("canales_ventas", "total_sin_igv", &results.canales_ventas)?,
            self.write_series("segmentacion_clientes", "clientes", &results.segmento_clientes)?,
            Some(self.write_dashboard(results)?),
        ];
        let files: Vec<PathBuf> = written.into_iter().flatten().collect();
        info!("Wrote {} chart file(s) to {:?}", files.len(), self.output_dir);
        Ok(files)
    }
}

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("Creating output directory {dir:?}"))
}
