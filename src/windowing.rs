//! Window/target construction.
//!
//! Slides a fixed-width window over a [`Panel`] and, for each origin index
//! `i`, produces:
//!
//! - a **feature vector**: rows `[i, i + W)` flattened time-step-major,
//!   instrument-minor (`[a₀(t), a₁(t), …, a₀(t+1), a₁(t+1), …]`), length `W·k`
//! - a **raw target**: the target-instrument price at row `i + W + H − 1`,
//!   i.e. `H` steps after the window's last row
//!
//! ```text
//!   row:   0   1   2   3   4   5   6 …
//!          [ window W=3 ]
//!          i          i+W-1       i+W+H-1   (H=2)
//!                                  ↑ target
//! ```
//!
//! Both passes are independent and keyed by origin; they are joined by
//! [`crate::reconcile::reconcile`]. For a panel of `N` rows the joined result
//! covers origins `0 ..= N − W − H`; a panel shorter than `W + H` yields no
//! samples, which is not an error.

use crate::error::{DatasetError, Result};
use crate::panel::Panel;
use crate::reconcile::{reconcile, KeyedRows};
use serde::{Deserialize, Serialize};

/// Window size and prediction horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowParams {
    /// Number of consecutive rows per feature vector (W).
    pub window_size: usize,

    /// Steps after the window's last row at which the target is read (H).
    pub horizon: usize,
}

impl WindowParams {
    pub fn new(window_size: usize, horizon: usize) -> Self {
        Self {
            window_size,
            horizon,
        }
    }

    /// Structural check only: `W ≥ 1` and `H ≥ 1`.
    ///
    /// The user-facing ranges live in [`crate::config::DatasetConfig::validate`].
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(DatasetError::config("window_size must be > 0"));
        }
        if self.horizon == 0 {
            return Err(DatasetError::config("horizon must be > 0"));
        }
        Ok(())
    }

    /// Minimum panel length for at least one sample: `W + H`.
    #[inline]
    pub fn required_rows(&self) -> usize {
        self.window_size + self.horizon
    }

    /// Number of samples a panel of `n_rows` rows yields: `max(0, N − W − H + 1)`.
    #[inline]
    pub fn expected_samples(&self, n_rows: usize) -> usize {
        (n_rows + 1).saturating_sub(self.required_rows())
    }

    /// Row holding the raw target for `origin`: `i + W + H − 1`.
    #[inline]
    pub fn target_position(&self, origin: usize) -> usize {
        origin + self.window_size + self.horizon - 1
    }

    /// Feature vector length for `n_instruments` columns: `W·k`.
    #[inline]
    pub fn feature_len(&self, n_instruments: usize) -> usize {
        self.window_size * n_instruments
    }
}

/// One joined (origin, features, raw target) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSample {
    pub origin: usize,
    pub features: Vec<f64>,
    pub target: f64,
}

/// Builds feature rows and raw targets from a panel.
#[derive(Debug, Clone, Copy)]
pub struct WindowConstructor {
    params: WindowParams,
}

impl WindowConstructor {
    /// Create a constructor. Fails if `W == 0` or `H == 0`.
    pub fn new(params: WindowParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> WindowParams {
        self.params
    }

    /// Candidate feature rows for every origin whose window fits:
    /// `i ∈ [0, N − W]`.
    ///
    /// Row `i` reads only panel rows `[i, i + W)`.
    pub fn feature_rows(&self, panel: &Panel) -> Result<KeyedRows<Vec<f64>>> {
        let w = self.params.window_size;
        let n_candidates = (panel.len() + 1).saturating_sub(w);

        let (origins, rows): (Vec<usize>, Vec<Vec<f64>>) = (0..n_candidates)
            .filter_map(|origin| {
                let window = panel.window(origin, w)?;
                Some((origin, window.iter().copied().collect()))
            })
            .unzip();

        KeyedRows::new(origins, rows)
    }

    /// Candidate raw targets for the same origins as [`Self::feature_rows`].
    ///
    /// `None` where the target position `i + W + H − 1` falls outside the
    /// panel.
    pub fn target_rows(&self, panel: &Panel) -> Result<KeyedRows<Option<f64>>> {
        let n_candidates = (panel.len() + 1).saturating_sub(self.params.window_size);

        let origins: Vec<usize> = (0..n_candidates).collect();
        let targets = origins
            .iter()
            .map(|&origin| panel.target_value(self.params.target_position(origin)))
            .collect();

        KeyedRows::new(origins, targets)
    }

    /// Joined `(origin, features, target)` triples for `i ∈ [0, N − W − H]`.
    ///
    /// Empty when the panel is shorter than `W + H`.
    pub fn construct(&self, panel: &Panel) -> Result<Vec<WindowSample>> {
        let aligned = reconcile(self.feature_rows(panel)?, self.target_rows(panel)?)?;

        Ok(aligned
            .origins
            .into_iter()
            .zip(aligned.features)
            .zip(aligned.targets)
            .map(|((origin, features), target)| WindowSample {
                origin,
                features,
                target,
            })
            .collect())
    }

    /// Column names matching the feature vector layout: `{id}_t-{lag}` with
    /// lag `W−1 … 0`, lag 0 being the window's last row.
    pub fn feature_names(&self, instruments: &[String]) -> Vec<String> {
        let w = self.params.window_size;
        (0..w)
            .flat_map(|step| {
                let lag = w - 1 - step;
                instruments.iter().map(move |id| format!("{id}_t-{lag}"))
            })
            .collect()
    }
}
