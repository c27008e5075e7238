//! Label transformation over reconciled samples.

use super::DirectionLabel;
use crate::error::{DatasetError, Result};
use crate::panel::Panel;
use crate::windowing::WindowParams;

/// Converts raw targets into [`DirectionLabel`]s.
///
/// Stateless; one instance can be reused for any panel built with the same
/// window parameters.
#[derive(Debug, Clone, Copy)]
pub struct LabelTransformer {
    params: WindowParams,
}

impl LabelTransformer {
    pub fn new(params: WindowParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Row of the reference price for `origin`: `i + W + H − 1`.
    #[inline]
    pub fn reference_position(&self, origin: usize) -> usize {
        self.params.target_position(origin)
    }

    /// Label every surviving origin.
    ///
    /// `origins` and `targets` are the reconciled, index-aligned outputs. A
    /// length mismatch or a reference row outside the panel means the caller
    /// broke alignment upstream; that is reported instead of producing a
    /// partially labelled dataset.
    pub fn transform(
        &self,
        panel: &Panel,
        origins: &[usize],
        targets: &[f64],
    ) -> Result<Vec<DirectionLabel>> {
        if origins.len() != targets.len() {
            return Err(DatasetError::alignment(format!(
                "{} origins but {} targets to label",
                origins.len(),
                targets.len()
            )));
        }

        origins
            .iter()
            .zip(targets)
            .map(|(&origin, &target)| {
                let position = self.reference_position(origin);
                let reference = panel.target_value(position).ok_or_else(|| {
                    DatasetError::alignment(format!(
                        "reference row {position} for origin {origin} is outside a panel of {} rows",
                        panel.len()
                    ))
                })?;
                Ok(DirectionLabel::compare(target, reference))
            })
            .collect()
    }
}
