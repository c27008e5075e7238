//! Window Dataset
//!
//! Supervised learning datasets from daily multi-asset closing prices.
//!
//! # Overview
//!
//! Given a price panel (one row per trading day, one column per instrument,
//! the prediction target in column 0), this crate slides a fixed-length
//! window over the history and pairs each window with the target's price `H`
//! rows after the window ends:
//!
//! - **Features**: rows `[i, i+W)` flattened time-major, length `W·k`
//! - **Target**: `panel[target][i + W + H − 1]`, raw or as an Up/Down label
//! - **Alignment**: features and targets are keyed by origin and reconciled
//!   explicitly, so a drop on one side can never shift the other
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Window Dataset                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  provider/   - Price sources (CSV, in-memory) → Panel           │
//! │  windowing/  - Origin-keyed feature and target rows             │
//! │  reconcile/  - Intersect origins, drop invalid rows             │
//! │  labeling/   - Binary direction labels                          │
//! │  pipeline/   - Config → DatasetOutcome                          │
//! │  export/     - NumPy export for Python/PyTorch                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use window_dataset::prelude::*;
//!
//! let config = DatasetConfig::new("BTC-USD", 20, 5)
//!     .with_auxiliary(vec!["^GSPC".into(), "GC=F".into()])
//!     .with_mode(TargetMode::Binary);
//!
//! let outcome = Pipeline::new(config)?.run(&CsvProvider::new("prices.csv"))?;
//! if outcome.status.is_ready() {
//!     let x = outcome.dataset.feature_matrix()?;
//!     let y = outcome.dataset.target_vector();
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod export;
pub mod labeling;
pub mod panel;
pub mod pipeline;
pub mod prelude;
pub mod provider;
pub mod reconcile;
pub mod validation;
pub mod windowing;

// Re-exports - Config
pub use config::{DatasetConfig, DateRange, ExperimentMetadata, InstrumentSelection};

// Re-exports - Errors
pub use error::{DatasetError, Result};

// Re-exports - Data
pub use panel::Panel;
pub use provider::{CsvProvider, FetchOutcome, InMemoryProvider, PanelProvider};

// Re-exports - Windowing
pub use reconcile::{reconcile, KeyedRows, ReconcileStats, Reconciled};
pub use windowing::{WindowConstructor, WindowParams, WindowSample};

// Re-exports - Labeling
pub use labeling::{DirectionLabel, LabelStats, LabelTransformer, TargetMode};

// Re-exports - Export
pub use export::{ExportMetadata, ExportResult, NumpyExporter};

// Re-exports - Validation
pub use validation::{validate_dataset, ValidationLevel, ValidationResult};

// Re-exports - Pipeline
pub use pipeline::{Dataset, DatasetOutcome, DatasetStatus, Pipeline, Targets};
