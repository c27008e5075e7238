//! Aligned multi-instrument price panel.
//!
//! A [`Panel`] is the only input of the dataset pipeline: an `N × k` table of
//! closing prices, one row per trading day, one column per instrument. Column
//! 0 is always the *target instrument*.
//!
//! # Invariants
//!
//! Checked once in [`Panel::new`] and never re-checked afterwards:
//!
//! - `values.shape() == (dates.len(), instruments.len())`
//! - at least one instrument, instrument ids unique
//! - every value finite (no gaps)
//! - dates strictly increasing (no duplicate time step)
//!
//! Values are stored row-major, so the rows of a window are one contiguous
//! slice and flattening is a copy, not a gather.

use crate::error::{DatasetError, Result};
use chrono::NaiveDate;
use ndarray::{s, Array2, ArrayView2};
use std::collections::HashSet;

/// Immutable, gap-free price table.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    dates: Vec<NaiveDate>,
    instruments: Vec<String>,
    values: Array2<f64>,
}

impl Panel {
    /// Build a panel, validating every invariant.
    pub fn new(dates: Vec<NaiveDate>, instruments: Vec<String>, values: Array2<f64>) -> Result<Self> {
        validate_instruments(&instruments)?;

        let (rows, cols) = values.dim();
        if rows != dates.len() || cols != instruments.len() {
            return Err(DatasetError::panel(format!(
                "value matrix is {rows}×{cols} but panel has {} dates and {} instruments",
                dates.len(),
                instruments.len()
            )));
        }

        if let Some(pos) = dates.windows(2).position(|pair| pair[0] >= pair[1]) {
            return Err(DatasetError::panel(format!(
                "dates must be strictly increasing: {} is followed by {}",
                dates[pos],
                dates[pos + 1]
            )));
        }

        if let Some(((row, col), value)) = values.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(DatasetError::panel(format!(
                "gap at {} / {}: {value}",
                dates[row], instruments[col]
            )));
        }

        // Window flattening relies on contiguous rows.
        let values = if values.is_standard_layout() {
            values
        } else {
            values.as_standard_layout().into_owned()
        };

        Ok(Self {
            dates,
            instruments,
            values,
        })
    }

    /// A panel with the given columns and no rows.
    pub fn empty(instruments: Vec<String>) -> Result<Self> {
        let cols = instruments.len();
        Self::new(Vec::new(), instruments, Array2::zeros((0, cols)))
    }

    /// Build a panel from rows that may contain missing values, dropping
    /// every row in which any instrument is missing or non-finite.
    ///
    /// Rows are sorted by date first. A date appearing twice is an error.
    pub fn from_rows_dropping_gaps(
        instruments: Vec<String>,
        rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        validate_instruments(&instruments)?;
        let k = instruments.len();

        let mut rows = rows;
        rows.sort_by_key(|(date, _)| *date);

        let mut dates = Vec::with_capacity(rows.len());
        let mut flat = Vec::with_capacity(rows.len() * k);
        let mut dropped = 0usize;

        for (date, row) in rows {
            if row.len() != k {
                return Err(DatasetError::panel(format!(
                    "row for {date} has {} values, expected {k}",
                    row.len()
                )));
            }
            if !row.iter().all(|v| v.is_some_and(f64::is_finite)) {
                dropped += 1;
                continue;
            }
            dates.push(date);
            flat.extend(row.into_iter().flatten());
        }

        if dropped > 0 {
            tracing::debug!(dropped, kept = dates.len(), "dropped panel rows with gaps");
        }

        let values = Array2::from_shape_vec((dates.len(), k), flat)
            .map_err(|e| DatasetError::panel(e.to_string()))?;
        Self::new(dates, instruments, values)
    }

    /// Number of rows (time steps), `N`.
    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Number of instruments, `k`.
    #[inline]
    pub fn n_instruments(&self) -> usize {
        self.instruments.len()
    }

    pub fn instruments(&self) -> &[String] {
        &self.instruments
    }

    /// The target instrument (column 0).
    pub fn target_instrument(&self) -> &str {
        &self.instruments[0]
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Price of `instrument` (column index) at row `row`.
    #[inline]
    pub fn value(&self, row: usize, instrument: usize) -> Option<f64> {
        self.values.get((row, instrument)).copied()
    }

    /// Target-instrument price at row `row`.
    #[inline]
    pub fn target_value(&self, row: usize) -> Option<f64> {
        self.value(row, 0)
    }

    /// All prices on row `row`, in instrument order.
    pub fn row(&self, row: usize) -> Option<&[f64]> {
        if row >= self.len() {
            return None;
        }
        self.values.row(row).to_slice()
    }

    /// Rows `[origin, origin + size)`, or `None` when the window does not fit.
    pub fn window(&self, origin: usize, size: usize) -> Option<ArrayView2<'_, f64>> {
        let end = origin.checked_add(size)?;
        if size == 0 || end > self.len() {
            return None;
        }
        Some(self.values.slice(s![origin..end, ..]))
    }

    /// Column index of an instrument id.
    pub fn column_of(&self, instrument: &str) -> Option<usize> {
        self.instruments.iter().position(|id| id == instrument)
    }

    /// The last `n` rows, for previews.
    pub fn tail(&self, n: usize) -> Panel {
        let start = self.len().saturating_sub(n);
        Panel {
            dates: self.dates[start..].to_vec(),
            instruments: self.instruments.clone(),
            values: self.values.slice(s![start.., ..]).to_owned(),
        }
    }

    /// Restrict to a subset of columns (in the given order) and a closed date
    /// range.
    pub fn select(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<Panel> {
        let columns = instruments
            .iter()
            .map(|id| {
                self.column_of(id)
                    .ok_or_else(|| DatasetError::panel(format!("unknown instrument '{id}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        let rows: Vec<usize> = self
            .dates
            .iter()
            .enumerate()
            .filter(|(_, d)| **d >= start && **d <= end)
            .map(|(i, _)| i)
            .collect();

        let values = Array2::from_shape_fn((rows.len(), columns.len()), |(r, c)| {
            self.values[(rows[r], columns[c])]
        });
        let dates = rows.iter().map(|&r| self.dates[r]).collect();

        Panel::new(dates, instruments.to_vec(), values)
    }
}

fn validate_instruments(instruments: &[String]) -> Result<()> {
    if instruments.is_empty() {
        return Err(DatasetError::panel("panel needs at least one instrument"));
    }
    let mut seen = HashSet::with_capacity(instruments.len());
    for id in instruments {
        if !seen.insert(id.as_str()) {
            return Err(DatasetError::panel(format!("duplicate instrument '{id}'")));
        }
    }
    Ok(())
}
