//! Prelude module for convenient imports.
//!
//! # Usage
//!
//! ```ignore
//! use window_dataset::prelude::*;
//!
//! let config = DatasetConfig::new("BTC-USD", 20, 5);
//! let outcome = Pipeline::new(config)?.run(&CsvProvider::new("prices.csv"))?;
//! ```
//!
//! # What's Included
//!
//! ## Core Pipeline
//! - [`Pipeline`] - Provider to dataset in one pass
//! - [`DatasetConfig`] - Dataset configuration
//! - [`DatasetOutcome`] / [`DatasetStatus`] - Dataset plus why it has (or lacks) samples
//!
//! ## Panel & Providers
//! - [`Panel`] - Gap-free date × instrument price matrix
//! - [`PanelProvider`] - Provider trait
//! - [`CsvProvider`], [`InMemoryProvider`] - Offline providers
//!
//! ## Windowing & Labels
//! - [`WindowConstructor`], [`WindowParams`] - Sliding windows
//! - [`reconcile`] - Origin-keyed alignment of features and targets
//! - [`LabelTransformer`], [`DirectionLabel`] - Binary direction labels
//!
//! ## Export & Validation
//! - [`NumpyExporter`] - Export to NumPy format
//! - [`validate_dataset`] - Post-hoc dataset checks

// ============================================================================
// Core Pipeline
// ============================================================================

pub use crate::config::{
    DatasetConfig, DateRange, ExperimentMetadata, InstrumentSelection, MAX_WINDOW_SIZE,
    SUPPORTED_HORIZONS,
};
pub use crate::pipeline::{
    Dataset, DatasetOutcome, DatasetStatus, Pipeline, Targets, PREVIEW_ROWS,
};

// ============================================================================
// Panel & Providers
// ============================================================================

pub use crate::catalog::{default_catalog, find_asset, Asset, AssetClass};
pub use crate::panel::Panel;
pub use crate::provider::{
    fetch_or_empty, CsvProvider, FetchOutcome, InMemoryProvider, PanelProvider,
};

// ============================================================================
// Windowing, Alignment & Labeling
// ============================================================================

pub use crate::labeling::{DirectionLabel, LabelStats, LabelTransformer, TargetMode};
pub use crate::reconcile::{reconcile, KeyedRows, ReconcileStats, Reconciled};
pub use crate::windowing::{WindowConstructor, WindowParams, WindowSample};

// ============================================================================
// Export & Validation
// ============================================================================

pub use crate::export::{ExportMetadata, ExportResult, NumpyExporter};
pub use crate::validation::{validate_dataset, ValidationLevel, ValidationResult};

// ============================================================================
// Errors
// ============================================================================

pub use crate::error::{DatasetError, Result};
