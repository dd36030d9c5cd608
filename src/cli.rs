use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(author, version, about = "Sales metrics from loosely formatted spreadsheet exports", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a sales export, write chart data and print or deliver the summary
    Report(ReportArgs),
    /// Show how the file's headers map to canonical fields
    Columns(ColumnsArgs),
}

#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Input file (.csv, .tsv, .xlsx, .xls, .ods; '-' reads CSV from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Worksheet name or 0-based index for workbook inputs
    #[arg(long)]
    pub sheet: Option<String>,
    /// CSV delimiter character (supports ',', 'tab', ';', '|')
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of CSV input (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// YAML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Tax rate used to derive pre-tax prices (default 0.18)
    #[arg(long = "tax-rate", value_parser = parse_tax_rate)]
    pub tax_rate: Option<f64>,
    /// Number of models listed in the ranking (default 5)
    #[arg(long = "top", value_parser = clap::value_parser!(u32).range(1..))]
    pub top: Option<u32>,
    /// Directory for chart data files
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Skip writing chart data files
    #[arg(long = "no-charts")]
    pub no_charts: bool,
    /// Send the summary and chart files to the configured recipient
    #[arg(long)]
    pub deliver: bool,
    /// Recipient for delivery
    #[arg(long, env = "SALES_PULSE_RECIPIENT")]
    pub recipient: Option<String>,
    /// Pause between successive sends, in milliseconds
    #[arg(long = "pacing-ms")]
    pub pacing_ms: Option<u64>,
    /// Print the result set as JSON instead of the text summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}

/// Accepts `0.18` or `18%`.
pub fn parse_tax_rate(value: &str) -> Result<f64, String> {
    let trimmed = value.trim();
    let rate = match trimmed.strip_suffix('%') {
        Some(percent) => percent
            .trim()
            .parse::<f64>()
            .map(|p| p / 100.0)
            .map_err(|_| format!("Invalid tax rate '{value}'"))?,
        None => trimmed
            .parse::<f64>()
            .map_err(|_| format!("Invalid tax rate '{value}'"))?,
    };
    if !rate.is_finite() || rate < 0.0 {
        return Err(format!("Tax rate must be a non-negative number, got '{value}'"));
    }
    Ok(rate)
}
