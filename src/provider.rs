//! Price panel providers.
//!
//! A provider turns `(instruments, start, end)` into a [`Panel`] restricted
//! to rows where *every* requested instrument has a price. Providers are
//! plain calls; caching across invocations is the caller's business.
//!
//! # Failure handling
//!
//! The pipeline never lets a provider failure escape as an error.
//! [`fetch_or_empty`] folds every outcome into a [`FetchOutcome`]:
//!
//! | Outcome | Meaning |
//! |---------|---------|
//! | `Loaded(panel)` | non-empty panel |
//! | `Empty(panel)` | provider succeeded but returned no rows |
//! | `Failed { panel, warning }` | provider errored; empty panel + warning |
//!
//! Both empty variants are distinguishable from "non-empty panel that yields
//! zero windows", which is decided later by the pipeline.

use crate::error::{DatasetError, Result};
use crate::panel::Panel;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Source of aligned closing-price panels.
pub trait PanelProvider {
    /// Fetch closing prices for `instruments` (column order preserved) over
    /// the closed range `[start, end]`, dropping rows with any gap.
    fn fetch_panel(&self, instruments: &[String], start: NaiveDate, end: NaiveDate)
        -> Result<Panel>;
}

/// Result of a provider call after failure recovery.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Loaded(Panel),
    Empty(Panel),
    Failed { panel: Panel, warning: String },
}

impl FetchOutcome {
    pub fn panel(&self) -> &Panel {
        match self {
            FetchOutcome::Loaded(panel)
            | FetchOutcome::Empty(panel)
            | FetchOutcome::Failed { panel, .. } => panel,
        }
    }

    pub fn into_panel(self) -> Panel {
        match self {
            FetchOutcome::Loaded(panel)
            | FetchOutcome::Empty(panel)
            | FetchOutcome::Failed { panel, .. } => panel,
        }
    }

    pub fn warning(&self) -> Option<&str> {
        match self {
            FetchOutcome::Failed { warning, .. } => Some(warning),
            _ => None,
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, FetchOutcome::Loaded(_))
    }
}

/// Call `provider`, converting any failure into an empty panel plus warning.
///
/// Errors only if `instruments` itself cannot form a panel (empty or
/// duplicated ids), which is caller misuse rather than provider failure.
pub fn fetch_or_empty<P: PanelProvider + ?Sized>(
    provider: &P,
    instruments: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<FetchOutcome> {
    match provider.fetch_panel(instruments, start, end) {
        Ok(panel) if panel.is_empty() => {
            tracing::warn!(?instruments, %start, %end, "provider returned no rows");
            Ok(FetchOutcome::Empty(panel))
        }
        Ok(panel) => {
            tracing::info!(rows = panel.len(), instruments = panel.n_instruments(), "panel loaded");
            Ok(FetchOutcome::Loaded(panel))
        }
        Err(e) => {
            let warning = format!("could not load prices: {e}");
            tracing::warn!(error = %e, "provider failed, continuing with an empty panel");
            Ok(FetchOutcome::Failed {
                panel: Panel::empty(instruments.to_vec())?,
                warning,
            })
        }
    }
}

// ============================================================================
// In-memory provider
// ============================================================================

/// Serves sub-panels of a panel held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryProvider {
    panel: Panel,
}

impl InMemoryProvider {
    pub fn new(panel: Panel) -> Self {
        Self { panel }
    }

    pub fn panel(&self) -> &Panel {
        &self.panel
    }
}

impl PanelProvider for InMemoryProvider {
    fn fetch_panel(
        &self,
        instruments: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Panel> {
        self.panel
            .select(instruments, start, end)
            .map_err(|e| DatasetError::Provider(e.to_string()))
    }
}

// ============================================================================
// CSV provider
// ============================================================================

/// Reads a wide CSV of closing prices.
///
/// Layout: a header `date,<id1>,<id2>,…` followed by one row per day with
/// ISO dates (`YYYY-MM-DD`). Empty or non-numeric cells count as missing.
/// Rows may be in any order.
///
/// ```text
/// date,BTC-USD,^GSPC
/// 2024-01-02,45000.5,4742.8
/// 2024-01-03,42800.1,
/// ```
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Instrument ids present in the file header.
    pub fn available_instruments(&self) -> Result<Vec<String>> {
        let mut reader = csv::Reader::from_path(&self.path)?;
        Ok(reader
            .headers()?
            .iter()
            .skip(1)
            .map(|name| name.trim().to_string())
            .collect())
    }

    /// Requested ids absent from the file header, in request order.
    pub fn missing_instruments(&self, instruments: &[String]) -> Result<Vec<String>> {
        let available = self.available_instruments()?;
        Ok(instruments
            .iter()
            .filter(|id| !available.contains(id))
            .cloned()
            .collect())
    }
}

impl PanelProvider for CsvProvider {
    fn fetch_panel(
        &self,
        instruments: &[String],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Panel> {
        let file = File::open(&self.path)?;
        read_wide_csv(file, instruments, start, end)
    }
}

/// Parse a wide price CSV from any reader.
pub fn read_wide_csv<R: Read>(
    source: R,
    instruments: &[String],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Panel> {
    let mut reader = csv::Reader::from_reader(source);

    let mut header_index: HashMap<String, usize> = HashMap::new();
    for (i, name) in reader.headers()?.iter().enumerate().skip(1) {
        let id = name.trim();
        if header_index.insert(id.to_string(), i).is_some() {
            return Err(DatasetError::Provider(format!(
                "duplicate column '{id}' in price file"
            )));
        }
    }

    let columns = instruments
        .iter()
        .map(|id| {
            header_index
                .get(id)
                .copied()
                .ok_or_else(|| DatasetError::Provider(format!("instrument '{id}' not in price file")))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut rows = Vec::new();
    for (n, record) in reader.records().enumerate() {
        let record = record?;
        let raw_date = match record.get(0).map(str::trim) {
            Some(raw) if !raw.is_empty() => raw,
            _ => {
                return Err(DatasetError::Provider(format!(
                    "row {} has no date",
                    n + 1
                )))
            }
        };
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")?;
        if date < start || date > end {
            continue;
        }

        let values = columns
            .iter()
            .map(|&col| record.get(col).and_then(|cell| cell.trim().parse::<f64>().ok()))
            .collect();
        rows.push((date, values));
    }

    Panel::from_rows_dropping_gaps(instruments.to_vec(), rows)
}
