//! Run configuration.
//!
//! Values come from an optional YAML file and are then overridden by command
//! line flags. Every section uses `#[serde(default)]`, so a file only needs the
//! keys it changes:
//!
//! ```yaml
//! analysis:
//!   tax_rate: 0.18
//!   top_models: 5
//! delivery:
//!   recipient: "+51999888777"
//!   pacing_ms: 1000
//! aliases:
//!   location: ["tienda"]
//! ```

use std::{
    collections::BTreeMap,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::DEFAULT_TOP_MODELS,
    clean::DEFAULT_TAX_RATE,
    columns::{AliasTable, CanonicalField},
    error::SalesError,
    summary::DEFAULT_TOP_LOCATIONS,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub tax_rate: f64,
    pub top_models: usize,
    pub top_locations: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tax_rate: DEFAULT_TAX_RATE,
            top_models: DEFAULT_TOP_MODELS,
            top_locations: DEFAULT_TOP_LOCATIONS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliveryConfig {
    pub enabled: bool,
    pub recipient: Option<String>,
    pub pacing_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            recipient: None,
            pacing_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub delivery: DeliveryConfig,
    pub output_dir: PathBuf,
    pub aliases: BTreeMap<CanonicalField, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            delivery: DeliveryConfig::default(),
            output_dir: PathBuf::from("output"),
            aliases: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Reads the file without validating it; command-line overrides are applied
    /// on top before [`Config::validate`] runs.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let reader = BufReader::new(file);
        serde_yaml::from_reader(reader).context("Parsing config YAML")
    }

    pub fn validate(&self) -> Result<(), SalesError> {
        let tax_rate = self.analysis.tax_rate;
        if !tax_rate.is_finite() || tax_rate < 0.0 {
            return Err(SalesError::InvalidConfig(format!(
                "tax rate must be a non-negative number, got {tax_rate}"
            )));
        }
        if self.analysis.top_models == 0 {
            return Err(SalesError::InvalidConfig(
                "top_models must be at least 1".to_string(),
            ));
        }
        if self.analysis.top_locations == 0 {
            return Err(SalesError::InvalidConfig(
                "top_locations must be at least 1".to_string(),
            ));
        }
        if self.delivery.enabled && self.delivery.recipient.is_none() {
            return Err(SalesError::InvalidConfig(
                "delivery is enabled but no recipient is configured".to_string(),
            ));
        }
        Ok(())
    }

    /// Built-in aliases followed by any configured extras.
    pub fn alias_table(&self) -> AliasTable {
        AliasTable::default().with_extra_aliases(&self.aliases)
    }
}
