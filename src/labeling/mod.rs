//! Binary direction labels for classification datasets.
//!
//! When the caller asks for a classification dataset, the continuous raw
//! target of every sample is replaced by an Up/Down label obtained by
//! comparing it with a *reference price*.
//!
//! # Reference price
//!
//! The reference is read from the target instrument at row `i + W + H − 1`,
//! the same row the raw target itself comes from:
//!
//! ```text
//! label(i) = 1  if  target(i) > price[i + W + H − 1]
//!            0  otherwise
//! ```
//!
//! On exact data this compares a value with itself, so every label is
//! `Down`. Switching the reference to the window's last observed price
//! (`i + W − 1`) is pending a product decision, see `DESIGN.md`.
//!
//! # Example
//!
//! ```
//! use window_dataset::labeling::{DirectionLabel, LabelStats};
//!
//! let labels = vec![DirectionLabel::Down, DirectionLabel::Up, DirectionLabel::Down];
//! let stats = LabelStats::from_labels(&labels);
//! assert_eq!(stats.up_count, 1);
//! assert_eq!(stats.down_count, 2);
//! ```

pub mod direction;

pub use direction::LabelTransformer;

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// Output mode requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetMode {
    /// Keep the raw future price as the target (regression).
    #[default]
    Continuous,

    /// Replace the raw target with an Up/Down label (classification).
    Binary,
}

impl TargetMode {
    pub fn name(&self) -> &'static str {
        match self {
            TargetMode::Continuous => "continuous",
            TargetMode::Binary => "binary",
        }
    }
}

impl std::fmt::Display for TargetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Binary price direction.
///
/// # Example
///
/// ```
/// use window_dataset::labeling::DirectionLabel;
///
/// assert_eq!(DirectionLabel::Up.as_int(), 1);
/// assert_eq!(DirectionLabel::from_int(0), Some(DirectionLabel::Down));
/// assert_eq!(DirectionLabel::from_int(-1), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DirectionLabel {
    /// Target did not exceed the reference price.
    Down = 0,

    /// Target exceeded the reference price.
    Up = 1,
}

impl DirectionLabel {
    /// Label for a target/reference pair: `Up` iff `target > reference`.
    #[inline]
    pub fn compare(target: f64, reference: f64) -> Self {
        if target > reference {
            DirectionLabel::Up
        } else {
            DirectionLabel::Down
        }
    }

    /// Integer representation for ML models: 0 (Down), 1 (Up).
    #[inline]
    pub fn as_int(&self) -> i8 {
        *self as i8
    }

    pub fn from_int(value: i8) -> Option<Self> {
        match value {
            0 => Some(DirectionLabel::Down),
            1 => Some(DirectionLabel::Up),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DirectionLabel::Down => "Down",
            DirectionLabel::Up => "Up",
        }
    }
}

impl std::fmt::Display for DirectionLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Label distribution summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelStats {
    /// Total number of labels
    pub total: usize,

    /// Number of Up labels
    pub up_count: usize,

    /// Number of Down labels
    pub down_count: usize,
}

impl LabelStats {
    pub fn from_labels(labels: &[DirectionLabel]) -> Self {
        let up_count = labels.iter().filter(|&&l| l == DirectionLabel::Up).count();
        Self {
            total: labels.len(),
            up_count,
            down_count: labels.len() - up_count,
        }
    }

    /// Returns (up_fraction, down_fraction), both 0.0 when empty.
    pub fn class_balance(&self) -> (f64, f64) {
        if self.total == 0 {
            return (0.0, 0.0);
        }
        let total = self.total as f64;
        (self.up_count as f64 / total, self.down_count as f64 / total)
    }

    /// True when every label falls in one class (or there are none).
    pub fn is_degenerate(&self) -> bool {
        self.up_count == 0 || self.down_count == 0
    }

    pub fn majority_class(&self) -> DirectionLabel {
        if self.up_count > self.down_count {
            DirectionLabel::Up
        } else {
            DirectionLabel::Down
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
