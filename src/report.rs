//! The `report` command: load → resolve → clean → analyze → render → deliver.

use std::{io, time::Duration};

use anyhow::{Context, Result, anyhow};
use log::info;

use crate::{
    analysis::{Aggregator, AnalysisResults},
    charts::{ChartRenderer, CsvChartWriter},
    clean::{CleanedTable, Cleaner},
    cli::{InputArgs, ReportArgs},
    columns::{AliasTable, ColumnResolver, Resolution},
    config::{AnalysisConfig, Config},
    delivery::{ConsoleDelivery, deliver},
    diagnostics::{LogObserver, Observer},
    error::SalesError,
    loader::{self, LoadOptions},
    records::RecordTable,
    summary::SummaryFormatter,
};

/// Everything one run produces. Collaborators read from it and never
/// re-resolve columns.
#[derive(Debug, Clone)]
pub struct Report {
    pub resolution: Resolution,
    pub cleaned: CleanedTable,
    pub results: AnalysisResults,
    pub summary: String,
}

/// Runs the core pipeline on an already loaded table.
pub fn build_report(
    mut table: RecordTable,
    config: &AnalysisConfig,
    aliases: &AliasTable,
    observer: &dyn Observer,
) -> Result<Report, SalesError> {
    let resolution = ColumnResolver::new(aliases, observer).resolve(table.headers());
    resolution.apply(&mut table);
    let cleaned = Cleaner::new(config.tax_rate, observer).clean(table, &resolution)?;
    let results = Aggregator::from_config(config, observer).analyze(&cleaned);
    let summary = SummaryFormatter::new(config.top_locations).format(&results);
    Ok(Report {
        resolution,
        cleaned,
        results,
        summary,
    })
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    let config = report_config(args)?;
    let table = loader::load_table(&args.input.input, &load_options(&args.input))?;
    let report = build_report(
        table,
        &config.analysis,
        &config.alias_table(),
        &LogObserver,
    )
    .with_context(|| format!("Analyzing {:?}", args.input.input))?;
    info!(
        "Analysis complete: {} sale(s), {} row(s) dropped",
        report.results.total_ventas,
        report.cleaned.rows_dropped()
    );

    let charts = if args.no_charts {
        Vec::new()
    } else {
        CsvChartWriter::new(&config.output_dir).render(&report.cleaned, &report.results)?
    };

    if args.json {
        let json = serde_json::to_string_pretty(&report.results)
            .context("Serializing analysis results")?;
        println!("{json}");
    } else if !config.delivery.enabled {
        println!("{}", report.summary);
    }

    if config.delivery.enabled {
        let recipient = config
            .delivery
            .recipient
            .as_deref()
            .ok_or_else(|| anyhow!("Delivery requires a recipient"))?;
        let mut console = ConsoleDelivery::new(io::stdout().lock());
        deliver(
            &mut console,
            recipient,
            &report.summary,
            &charts,
            Duration::from_millis(config.delivery.pacing_ms),
        )?;
    } else {
        info!("Delivery disabled");
    }
    Ok(())
}

pub(crate) fn load_options(args: &InputArgs) -> LoadOptions {
    LoadOptions {
        delimiter: args.delimiter,
        encoding: args.input_encoding.clone(),
        sheet: args.sheet.clone(),
    }
}

pub(crate) fn base_config(args: &InputArgs) -> Result<Config> {
    match &args.config {
        Some(path) => Config::load(path).with_context(|| format!("Loading config from {path:?}")),
        None => Ok(Config::default()),
    }
}

fn report_config(args: &ReportArgs) -> Result<Config> {
    let mut config = base_config(&args.input)?;
    if let Some(rate) = args.tax_rate {
        config.analysis.tax_rate = rate;
    }
    if let Some(top) = args.top {
        config.analysis.top_models = top as usize;
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if args.deliver {
        config.delivery.enabled = true;
    }
    if let Some(recipient) = &args.recipient {
        config.delivery.recipient = Some(recipient.clone());
    }
    if let Some(pacing) = args.pacing_ms {
        config.delivery.pacing_ms = pacing;
    }
    config.validate()?;
    Ok(config)
}
