//! Index reconciliation between feature rows and target values.
//!
//! Feature rows and target values are produced by independent passes and
//! filtered independently (a feature row is unusable if any value in it is
//! undefined, a target is unusable if it is undefined). Reconciliation keeps
//! exactly the origin indices that survive on *both* sides, so that
//! `features[j]` and `targets[j]` always describe the same window.
//!
//! ```text
//! features: origins {0, 1, 2, 3, 4, 5}     (window fits)
//! targets:  origins {0, 1, 2, 3}           (horizon fits)
//!                      ↓ intersect
//! aligned:  origins {0, 1, 2, 3}
//! ```
//!
//! The intersection is computed on explicit index sets; no positional
//! alignment is ever assumed.

use crate::error::{DatasetError, Result};
use std::collections::BTreeSet;

/// Values keyed by window origin index.
///
/// Origins must be strictly increasing; both constructors reject anything
/// else, so every `KeyedRows` in circulation is duplicate-free.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRows<T> {
    origins: Vec<usize>,
    values: Vec<T>,
}

impl<T> KeyedRows<T> {
    /// Build from parallel origin/value vectors.
    pub fn new(origins: Vec<usize>, values: Vec<T>) -> Result<Self> {
        if origins.len() != values.len() {
            return Err(DatasetError::alignment(format!(
                "{} origins but {} values",
                origins.len(),
                values.len()
            )));
        }
        check_strictly_increasing(&origins)?;
        Ok(Self { origins, values })
    }

    /// Build from `(origin, value)` pairs.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, T)>) -> Result<Self> {
        let (origins, values): (Vec<_>, Vec<_>) = pairs.into_iter().unzip();
        Self::new(origins, values)
    }

    pub fn empty() -> Self {
        Self {
            origins: Vec::new(),
            values: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }

    pub fn origins(&self) -> &[usize] {
        &self.origins
    }

    pub fn values(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.origins.iter().copied().zip(self.values.iter())
    }

    pub fn into_parts(self) -> (Vec<usize>, Vec<T>) {
        (self.origins, self.values)
    }

    /// Keep only entries whose value satisfies `keep`; returns the number dropped.
    fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.len();
        let mut origins = Vec::with_capacity(before);
        let mut values = Vec::with_capacity(before);
        for (origin, value) in self.origins.drain(..).zip(self.values.drain(..)) {
            if keep(&value) {
                origins.push(origin);
                values.push(value);
            }
        }
        self.origins = origins;
        self.values = values;
        before - self.len()
    }

    /// Restrict to origins in `keep` (which must be a subset of this set).
    fn restrict(self, keep: &BTreeSet<usize>) -> Vec<T> {
        self.origins
            .into_iter()
            .zip(self.values)
            .filter(|(origin, _)| keep.contains(origin))
            .map(|(_, value)| value)
            .collect()
    }
}

/// Drop counters from one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    /// Feature rows dropped for containing an undefined value.
    pub features_dropped: usize,

    /// Targets dropped for being undefined.
    pub targets_dropped: usize,

    /// Surviving rows (either side) without a partner on the other side.
    pub unmatched: usize,
}

/// Feature rows and targets restricted to their common origin set.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciled {
    pub origins: Vec<usize>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
    pub stats: ReconcileStats,
}

impl Reconciled {
    #[inline]
    pub fn len(&self) -> usize {
        self.origins.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.origins.is_empty()
    }
}

/// Filter both sides independently, then restrict both to the intersection
/// of the surviving origin indices.
///
/// An empty intersection is a valid result. Inputs whose origins are not
/// strictly increasing cannot exist (see [`KeyedRows::new`]); the output is
/// re-checked anyway and any mismatch is an [`DatasetError::Alignment`].
pub fn reconcile(
    mut features: KeyedRows<Vec<f64>>,
    targets: KeyedRows<Option<f64>>,
) -> Result<Reconciled> {
    let features_dropped = features.retain(|row| row.iter().all(|v| v.is_finite()));

    let mut targets = targets;
    let targets_dropped = targets.retain(|t| t.is_some_and(f64::is_finite));

    let feature_set: BTreeSet<usize> = features.origins().iter().copied().collect();
    let target_set: BTreeSet<usize> = targets.origins().iter().copied().collect();
    let common: BTreeSet<usize> = feature_set.intersection(&target_set).copied().collect();

    let unmatched = feature_set.len() + target_set.len() - 2 * common.len();
    let origins: Vec<usize> = common.iter().copied().collect();

    let aligned_features = features.restrict(&common);
    let aligned_targets: Vec<f64> = targets.restrict(&common).into_iter().flatten().collect();

    if aligned_features.len() != origins.len() || aligned_targets.len() != origins.len() {
        return Err(DatasetError::alignment(format!(
            "{} origins, {} feature rows, {} targets after reconciliation",
            origins.len(),
            aligned_features.len(),
            aligned_targets.len()
        )));
    }

    let stats = ReconcileStats {
        features_dropped,
        targets_dropped,
        unmatched,
    };
    tracing::debug!(
        samples = origins.len(),
        features_dropped,
        targets_dropped,
        unmatched,
        "reconciled feature and target rows"
    );

    Ok(Reconciled {
        origins,
        features: aligned_features,
        targets: aligned_targets,
        stats,
    })
}

fn check_strictly_increasing(origins: &[usize]) -> Result<()> {
    if let Some(pos) = origins.windows(2).position(|pair| pair[0] >= pair[1]) {
        return Err(DatasetError::alignment(format!(
            "origin indices must be strictly increasing: {} is followed by {}",
            origins[pos],
            origins[pos + 1]
        )));
    }
    Ok(())
}
