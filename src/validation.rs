//! Dataset Validation Module
//!
//! Post-hoc checks on a built [`Dataset`] before it is handed to a model or
//! written to disk. The pipeline already guarantees these properties; the
//! validator makes them observable (and catches hand-assembled datasets that
//! do not hold them).
//!
//! # Checks
//!
//! 1. **Alignment**: one target per feature row, one date per origin
//! 2. **Origins**: strictly increasing, no duplicates
//! 3. **Shape**: every feature row has length `W·k`, names match
//! 4. **Values**: no NaN/Inf in features or continuous targets
//! 5. **Labels**: degenerate (single-class) label sets are flagged
//!
//! # Usage
//!
//! ```ignore
//! use window_dataset::validation::validate_dataset;
//!
//! let result = validate_dataset(&outcome.dataset);
//! if result.has_errors() {
//!     for error in result.errors() {
//!         eprintln!("{error}");
//!     }
//! }
//! ```

use crate::labeling::LabelStats;
use crate::pipeline::{Dataset, Targets};
use std::fmt;

/// Validation result for a single check.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationLevel {
    /// Data is valid
    Valid,
    /// Data has minor issues (warnings)
    Warning(String),
    /// Data has serious issues (errors)
    Error(String),
}

impl ValidationLevel {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationLevel::Valid)
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, ValidationLevel::Warning(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, ValidationLevel::Error(_))
    }
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationLevel::Valid => write!(f, "Valid"),
            ValidationLevel::Warning(msg) => write!(f, "Warning: {msg}"),
            ValidationLevel::Error(msg) => write!(f, "Error: {msg}"),
        }
    }
}

/// Aggregated validation result.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    results: Vec<(String, ValidationLevel)>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, check_name: &str, level: ValidationLevel) {
        self.results.push((check_name.to_string(), level));
    }

    /// Check if all validations passed (no errors or warnings).
    pub fn is_valid(&self) -> bool {
        self.results.iter().all(|(_, level)| level.is_valid())
    }

    pub fn has_errors(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.results.iter().any(|(_, level)| level.is_warning())
    }

    pub fn warnings(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Warning(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.results
            .iter()
            .filter_map(|(name, level)| match level {
                ValidationLevel::Error(msg) => Some(format!("{name}: {msg}")),
                _ => None,
            })
            .collect()
    }

    pub fn all_results(&self) -> &[(String, ValidationLevel)] {
        &self.results
    }

    pub fn check_count(&self) -> usize {
        self.results.len()
    }

    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|(_, l)| l.is_valid()).count()
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let passed = self.passed_count();
        let total = self.check_count();
        writeln!(f, "Validation: {passed}/{total} checks passed")?;

        for (name, level) in &self.results {
            if !level.is_valid() {
                writeln!(f, "  - {name}: {level}")?;
            }
        }

        Ok(())
    }
}

/// Run every dataset check.
pub fn validate_dataset(dataset: &Dataset) -> ValidationResult {
    let mut result = ValidationResult::new();

    result.add("alignment", check_alignment(dataset));
    result.add("origin_order", check_origins(&dataset.origins));
    result.add("feature_shape", check_feature_shape(dataset));
    result.add("finite_values", check_finite(dataset));
    result.add("label_balance", check_labels(&dataset.targets));

    result
}

fn check_alignment(dataset: &Dataset) -> ValidationLevel {
    let n = dataset.origins.len();
    if dataset.features.len() != n || dataset.targets.len() != n {
        return ValidationLevel::Error(format!(
            "{n} origins, {} feature rows, {} targets",
            dataset.features.len(),
            dataset.targets.len()
        ));
    }
    if dataset.origin_dates.len() != n {
        return ValidationLevel::Error(format!(
            "{n} origins but {} origin dates",
            dataset.origin_dates.len()
        ));
    }
    ValidationLevel::Valid
}

fn check_origins(origins: &[usize]) -> ValidationLevel {
    match origins.windows(2).position(|pair| pair[0] >= pair[1]) {
        Some(pos) => ValidationLevel::Error(format!(
            "origin {} at position {} is not greater than {}",
            origins[pos + 1],
            pos + 1,
            origins[pos]
        )),
        None => ValidationLevel::Valid,
    }
}

fn check_feature_shape(dataset: &Dataset) -> ValidationLevel {
    let expected = dataset.n_features();
    if let Some((i, row)) = dataset
        .features
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != expected)
    {
        return ValidationLevel::Error(format!(
            "feature row {i} has length {}, expected {expected}",
            row.len()
        ));
    }
    if !dataset.is_empty() && dataset.feature_names.len() != expected {
        return ValidationLevel::Warning(format!(
            "{} feature names for {expected} features",
            dataset.feature_names.len()
        ));
    }
    ValidationLevel::Valid
}

fn check_finite(dataset: &Dataset) -> ValidationLevel {
    for (i, row) in dataset.features.iter().enumerate() {
        if let Some((j, value)) = row.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return ValidationLevel::Error(format!("feature row {i}, column {j}: {value}"));
        }
    }
    if let Targets::Continuous(targets) = &dataset.targets {
        if let Some((i, value)) = targets.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return ValidationLevel::Error(format!("target {i}: {value}"));
        }
    }
    ValidationLevel::Valid
}

fn check_labels(targets: &Targets) -> ValidationLevel {
    match targets {
        Targets::Binary(labels) if !labels.is_empty() => {
            let stats = LabelStats::from_labels(labels);
            if stats.is_degenerate() {
                ValidationLevel::Warning(format!(
                    "all {} labels are {}",
                    stats.total,
                    stats.majority_class()
                ))
            } else {
                ValidationLevel::Valid
            }
        }
        _ => ValidationLevel::Valid,
    }
}
