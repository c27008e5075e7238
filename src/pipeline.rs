//! Dataset construction pipeline.
//!
//! One pass, no retained state:
//!
//! ```text
//! Provider ──► Panel ──► WindowConstructor ──► (feature rows, target rows)
//!                                                        │
//!                                                 reconcile()
//!                                                        │
//!                                      (aligned features, raw targets)
//!                                                        │
//!                                        LabelTransformer (binary mode)
//!                                                        │
//!                                                  DatasetOutcome
//! ```
//!
//! Insufficient data is a status, not an error: every path that cannot yield
//! samples still returns a [`DatasetOutcome`] with an empty [`Dataset`] and a
//! [`DatasetStatus`] saying why.
//!
//! # Example
//!
//! ```ignore
//! use window_dataset::prelude::*;
//!
//! let config = DatasetConfig::new("BTC-USD", 20, 5).with_mode(TargetMode::Binary);
//! let outcome = Pipeline::new(config)?.run(&CsvProvider::new("prices.csv"))?;
//!
//! match outcome.status {
//!     DatasetStatus::Ready => train(outcome.dataset.feature_matrix()),
//!     status => eprintln!("{status}"),
//! }
//! ```

use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::labeling::{DirectionLabel, LabelStats, LabelTransformer, TargetMode};
use crate::panel::Panel;
use crate::provider::{fetch_or_empty, FetchOutcome, PanelProvider};
use crate::reconcile::{reconcile, ReconcileStats, Reconciled};
use crate::windowing::{WindowConstructor, WindowParams};
use chrono::NaiveDate;
use ndarray::{Array1, Array2};
use std::fmt;

/// Rows of the loaded panel kept on every outcome for display.
pub const PREVIEW_ROWS: usize = 5;

/// Target column of a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum Targets {
    /// Raw future prices.
    Continuous(Vec<f64>),

    /// Up/Down labels.
    Binary(Vec<DirectionLabel>),
}

impl Targets {
    pub fn len(&self) -> usize {
        match self {
            Targets::Continuous(v) => v.len(),
            Targets::Binary(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> TargetMode {
        match self {
            Targets::Continuous(_) => TargetMode::Continuous,
            Targets::Binary(_) => TargetMode::Binary,
        }
    }

    pub fn as_continuous(&self) -> Option<&[f64]> {
        match self {
            Targets::Continuous(v) => Some(v),
            Targets::Binary(_) => None,
        }
    }

    pub fn as_labels(&self) -> Option<&[DirectionLabel]> {
        match self {
            Targets::Binary(v) => Some(v),
            Targets::Continuous(_) => None,
        }
    }

    fn empty(mode: TargetMode) -> Self {
        match mode {
            TargetMode::Continuous => Targets::Continuous(Vec::new()),
            TargetMode::Binary => Targets::Binary(Vec::new()),
        }
    }
}

/// Final `(X, y)` pair, index-aligned by origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Surviving origin indices, strictly increasing
    pub origins: Vec<usize>,

    /// Panel date at each origin (first row of the window)
    pub origin_dates: Vec<NaiveDate>,

    /// One flattened window per origin, length `W·k` each
    pub features: Vec<Vec<f64>>,

    /// One target or label per origin
    pub targets: Targets,

    /// Column names for `features`
    pub feature_names: Vec<String>,

    /// Panel instruments, target first
    pub instruments: Vec<String>,

    pub params: WindowParams,
}

impl Dataset {
    fn empty(params: WindowParams, instruments: Vec<String>, mode: TargetMode) -> Self {
        Self {
            origins: Vec::new(),
            origin_dates: Vec::new(),
            features: Vec::new(),
            targets: Targets::empty(mode),
            feature_names: Vec::new(),
            instruments,
            params,
        }
    }

    /// Number of samples (possibly zero).
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.origins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    /// Feature vector length, `W·k`.
    pub fn n_features(&self) -> usize {
        self.params.feature_len(self.instruments.len())
    }

    /// Features as an `N × W·k` matrix.
    pub fn feature_matrix(&self) -> Result<Array2<f64>> {
        let flat: Vec<f64> = self.features.iter().flatten().copied().collect();
        Array2::from_shape_vec((self.n_samples(), self.n_features()), flat)
            .map_err(|e| DatasetError::alignment(format!("feature matrix: {e}")))
    }

    /// Continuous targets as `f64`, labels as `0.0 / 1.0`.
    pub fn target_vector(&self) -> Array1<f64> {
        match &self.targets {
            Targets::Continuous(v) => Array1::from_vec(v.clone()),
            Targets::Binary(v) => v.iter().map(|l| l.as_int() as f64).collect(),
        }
    }

    /// Label distribution, when the dataset is binary.
    pub fn label_stats(&self) -> Option<LabelStats> {
        self.targets.as_labels().map(LabelStats::from_labels)
    }
}

/// Why a dataset has (or lacks) samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetStatus {
    /// At least one sample.
    Ready,

    /// The panel had no rows; `warning` is set when the provider failed.
    NoData { warning: Option<String> },

    /// The panel is shorter than `W + H`.
    InsufficientRows { rows: usize, required: usize },

    /// Windows existed, but none survived reconciliation.
    NoUsableSamples,
}

impl DatasetStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, DatasetStatus::Ready)
    }
}

impl fmt::Display for DatasetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetStatus::Ready => write!(f, "dataset ready"),
            DatasetStatus::NoData { warning: Some(w) } => write!(f, "no price data: {w}"),
            DatasetStatus::NoData { warning: None } => write!(f, "no price data"),
            DatasetStatus::InsufficientRows { rows, required } => write!(
                f,
                "insufficient samples: {rows} rows available, at least {required} required"
            ),
            DatasetStatus::NoUsableSamples => write!(f, "no usable samples after alignment"),
        }
    }
}

/// Dataset plus the conditions under which it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOutcome {
    pub dataset: Dataset,
    pub status: DatasetStatus,

    /// Rows in the panel the dataset was built from
    pub panel_rows: usize,

    /// Drop counters from reconciliation (zero when it never ran)
    pub reconcile_stats: ReconcileStats,

    /// Last [`PREVIEW_ROWS`] rows of the panel
    pub preview: Panel,
}

impl DatasetOutcome {
    /// Number of samples produced (possibly zero).
    pub fn n_samples(&self) -> usize {
        self.dataset.n_samples()
    }
}

/// Builds datasets for one validated configuration.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: DatasetConfig,
    constructor: WindowConstructor,
}

impl Pipeline {
    /// Validate `config` and prepare the pipeline.
    pub fn new(config: DatasetConfig) -> Result<Self> {
        config.validate()?;
        let constructor = WindowConstructor::new(config.window_params())?;
        Ok(Self {
            config,
            constructor,
        })
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Fetch the panel from `provider` and build the dataset.
    ///
    /// Provider failures become `DatasetStatus::NoData` with a warning.
    pub fn run<P: PanelProvider + ?Sized>(&self, provider: &P) -> Result<DatasetOutcome> {
        let ids = self.config.instruments.ordered_ids();
        let range = self.config.date_range;
        let fetched = fetch_or_empty(provider, &ids, range.start, range.end)?;

        let warning = fetched.warning().map(str::to_string);
        let panel = match fetched {
            FetchOutcome::Loaded(panel) => panel,
            FetchOutcome::Empty(panel) | FetchOutcome::Failed { panel, .. } => {
                return Ok(self.empty_outcome(&panel, DatasetStatus::NoData { warning }));
            }
        };

        if panel.instruments() != ids.as_slice() {
            return Err(DatasetError::alignment(format!(
                "provider returned columns {:?}, requested {:?}",
                panel.instruments(),
                ids
            )));
        }

        self.build(&panel)
    }

    /// Build the dataset from an already materialized panel.
    ///
    /// The panel's column 0 is the target instrument regardless of the
    /// configured selection.
    pub fn build(&self, panel: &Panel) -> Result<DatasetOutcome> {
        let params = self.constructor.params();

        if panel.is_empty() {
            return Ok(self.empty_outcome(panel, DatasetStatus::NoData { warning: None }));
        }
        if panel.len() < params.required_rows() {
            tracing::warn!(
                rows = panel.len(),
                required = params.required_rows(),
                window_size = params.window_size,
                horizon = params.horizon,
                "panel too short for the requested window and horizon"
            );
            let status = DatasetStatus::InsufficientRows {
                rows: panel.len(),
                required: params.required_rows(),
            };
            return Ok(self.empty_outcome(panel, status));
        }

        let features = self.constructor.feature_rows(panel)?;
        let targets = self.constructor.target_rows(panel)?;
        self.assemble(panel, reconcile(features, targets)?)
    }

    /// Turn reconciled rows into the final outcome.
    ///
    /// Panels are gap-free, so a panel of at least `W + H` rows always
    /// leaves one sample; the `NoUsableSamples` path covers reconciled sets
    /// that end up empty anyway.
    fn assemble(&self, panel: &Panel, aligned: Reconciled) -> Result<DatasetOutcome> {
        let params = self.constructor.params();
        let reconcile_stats = aligned.stats;

        if aligned.is_empty() {
            let mut outcome = self.empty_outcome(panel, DatasetStatus::NoUsableSamples);
            outcome.reconcile_stats = reconcile_stats;
            return Ok(outcome);
        }

        let targets = match self.config.mode {
            TargetMode::Continuous => Targets::Continuous(aligned.targets),
            TargetMode::Binary => {
                let transformer = LabelTransformer::new(params)?;
                Targets::Binary(transformer.transform(panel, &aligned.origins, &aligned.targets)?)
            }
        };

        let origin_dates = aligned
            .origins
            .iter()
            .map(|&i| panel.dates()[i])
            .collect();

        let dataset = Dataset {
            origin_dates,
            features: aligned.features,
            targets,
            feature_names: self.constructor.feature_names(panel.instruments()),
            instruments: panel.instruments().to_vec(),
            origins: aligned.origins,
            params,
        };

        tracing::info!(
            samples = dataset.n_samples(),
            features = dataset.n_features(),
            mode = %self.config.mode,
            "dataset built"
        );

        Ok(DatasetOutcome {
            dataset,
            status: DatasetStatus::Ready,
            panel_rows: panel.len(),
            reconcile_stats,
            preview: panel.tail(PREVIEW_ROWS),
        })
    }

    fn empty_outcome(&self, panel: &Panel, status: DatasetStatus) -> DatasetOutcome {
        DatasetOutcome {
            dataset: Dataset::empty(
                self.constructor.params(),
                panel.instruments().to_vec(),
                self.config.mode,
            ),
            status,
            panel_rows: panel.len(),
            reconcile_stats: ReconcileStats::default(),
            preview: panel.tail(PREVIEW_ROWS),
        }
    }
}
