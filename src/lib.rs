pub mod analysis;
pub mod charts;
pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod delivery;
pub mod diagnostics;
pub mod error;
pub mod inspect;
pub mod io_utils;
pub mod loader;
pub mod normalize;
pub mod records;
pub mod report;
pub mod segment;
pub mod summary;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging(verbose: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            let level = if verbose {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            };
            builder.filter_module("sales_pulse", level);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Report(args) => report::execute(&args),
        Commands::Columns(args) => inspect::execute(&args),
    }
}
