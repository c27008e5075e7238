//! Dataset configuration management.
//!
//! One [`DatasetConfig`] describes one dataset: which instruments, which
//! window/horizon, which output mode, which date range. It serializes to TOML
//! or JSON so a dataset can be rebuilt exactly from a config file.
//!
//! # Example
//!
//! ```ignore
//! use window_dataset::config::DatasetConfig;
//!
//! let config = DatasetConfig::default()
//!     .with_auxiliary(vec!["^GSPC".into(), "GC=F".into()])
//!     .with_window(20, 5);
//!
//! config.save_toml("btc_w20_h5.toml")?;
//! let loaded = DatasetConfig::load_toml("btc_w20_h5.toml")?;
//! ```

use crate::catalog;
use crate::error::{DatasetError, Result};
use crate::labeling::TargetMode;
use crate::windowing::WindowParams;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Largest selectable window size.
pub const MAX_WINDOW_SIZE: usize = 60;

/// Selectable prediction horizons, in days.
pub const SUPPORTED_HORIZONS: [usize; 4] = [1, 3, 5, 7];

/// Complete description of one dataset build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Target and auxiliary instruments
    pub instruments: InstrumentSelection,

    /// Window size W, in rows (1..=60)
    pub window_size: usize,

    /// Horizon H, in rows (1, 3, 5 or 7)
    pub horizon: usize,

    /// Continuous target or binary direction label
    #[serde(default)]
    pub mode: TargetMode,

    /// Price history to request from the provider
    pub date_range: DateRange,

    /// Experiment metadata (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExperimentMetadata>,
}

/// Target instrument plus auxiliary feature instruments.
///
/// The target is always panel column 0; auxiliaries follow in the given
/// order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentSelection {
    pub target: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub auxiliary: Vec<String>,
}

impl InstrumentSelection {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            auxiliary: Vec::new(),
        }
    }

    /// Panel column order: target first, then auxiliaries.
    pub fn ordered_ids(&self) -> Vec<String> {
        std::iter::once(self.target.clone())
            .chain(self.auxiliary.iter().cloned())
            .collect()
    }

    pub fn validate(&self) -> Result<()> {
        if self.target.trim().is_empty() {
            return Err(DatasetError::config("a target instrument must be selected"));
        }
        let mut seen = HashSet::new();
        for id in std::iter::once(&self.target).chain(&self.auxiliary) {
            if id.trim().is_empty() {
                return Err(DatasetError::config("instrument ids must not be empty"));
            }
            if !seen.insert(id.as_str()) {
                return Err(DatasetError::config(format!(
                    "instrument '{id}' selected more than once"
                )));
            }
        }
        Ok(())
    }
}

/// Closed date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Five years ending `today`.
    pub fn default_ending(today: NaiveDate) -> Self {
        let (start, end) = catalog::default_date_range(today);
        Self { start, end }
    }

    /// Parse `YYYY-MM-DD` bounds.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: NaiveDate::parse_from_str(start, "%Y-%m-%d")?,
            end: NaiveDate::parse_from_str(end, "%Y-%m-%d")?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.start > self.end {
            return Err(DatasetError::config(format!(
                "start date ({}) must not be after end date ({})",
                self.start, self.end
            )));
        }
        Ok(())
    }
}

/// Experiment metadata for tracking and reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMetadata {
    /// Experiment name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            instruments: InstrumentSelection::new("BTC-USD"),
            window_size: 10,
            horizon: 1,
            mode: TargetMode::Continuous,
            date_range: DateRange::default_ending(chrono::Local::now().date_naive()),
            metadata: None,
        }
    }
}

impl DatasetConfig {
    pub fn new(target: impl Into<String>, window_size: usize, horizon: usize) -> Self {
        Self {
            instruments: InstrumentSelection::new(target),
            window_size,
            horizon,
            ..Default::default()
        }
    }

    pub fn with_auxiliary(mut self, auxiliary: Vec<String>) -> Self {
        self.instruments.auxiliary = auxiliary;
        self
    }

    pub fn with_window(mut self, window_size: usize, horizon: usize) -> Self {
        self.window_size = window_size;
        self.horizon = horizon;
        self
    }

    pub fn with_mode(mut self, mode: TargetMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = range;
        self
    }

    pub fn with_metadata(mut self, metadata: ExperimentMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn window_params(&self) -> WindowParams {
        WindowParams::new(self.window_size, self.horizon)
    }

    /// Validate every user-facing range.
    pub fn validate(&self) -> Result<()> {
        self.instruments.validate()?;
        self.date_range.validate()?;

        if !(1..=MAX_WINDOW_SIZE).contains(&self.window_size) {
            return Err(DatasetError::config(format!(
                "window_size must be in 1..={MAX_WINDOW_SIZE}, got {}",
                self.window_size
            )));
        }
        if !SUPPORTED_HORIZONS.contains(&self.horizon) {
            return Err(DatasetError::config(format!(
                "horizon must be one of {SUPPORTED_HORIZONS:?}, got {}",
                self.horizon
            )));
        }
        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DatasetConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: DatasetConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}
