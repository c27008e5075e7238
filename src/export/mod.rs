//! Data Export Module
//!
//! Writes a built dataset to NumPy files plus JSON metadata for Python/PyTorch
//! consumers.
//!
//! # Files
//!
//! For a dataset exported under `name`:
//!
//! | File | Shape | dtype |
//! |------|-------|-------|
//! | `{name}_features.npy` | `[N, W·k]` | `f64` |
//! | `{name}_targets.npy` | `[N]` | `f64` (continuous) or `i8` (binary, 0 = Down, 1 = Up) |
//! | `{name}_origins.npy` | `[N]` | `u64` |
//! | `{name}_metadata.json` | | |
//!
//! Row `j` of every array refers to the same sample.
//!
//! # Example
//!
//! ```ignore
//! use window_dataset::export::NumpyExporter;
//!
//! let exporter = NumpyExporter::new("datasets/");
//! let result = exporter.export("btc_w20_h5", &outcome, pipeline.config())?;
//! println!("{} samples written", result.n_samples);
//! ```

use crate::config::DatasetConfig;
use crate::error::{DatasetError, Result};
use crate::labeling::{LabelStats, TargetMode};
use crate::pipeline::{DatasetOutcome, Targets};
use chrono::NaiveDate;
use ndarray::Array1;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Metadata written next to the arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    /// Export name (file prefix)
    pub name: String,

    /// Number of samples
    pub n_samples: usize,

    /// Feature vector length, `W·k`
    pub n_features: usize,

    pub window_size: usize,
    pub horizon: usize,
    pub mode: TargetMode,

    /// Panel instruments, target first
    pub instruments: Vec<String>,

    /// Column names of the feature matrix
    pub feature_names: Vec<String>,

    /// Origin date of the first and last sample
    pub first_origin_date: NaiveDate,
    pub last_origin_date: NaiveDate,

    /// Rows in the source panel
    pub panel_rows: usize,

    /// Samples dropped during alignment
    pub dropped_features: usize,
    pub dropped_targets: usize,
    pub unmatched: usize,

    /// Label distribution (binary mode only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_distribution: Option<LabelStats>,

    /// Configuration the dataset was built from
    pub config: DatasetConfig,

    /// RFC 3339 export time
    pub export_timestamp: String,
}

/// Summary of one export.
#[derive(Debug, Clone)]
pub struct ExportResult {
    pub name: String,
    pub n_samples: usize,
    pub n_features: usize,
    pub label_distribution: Option<LabelStats>,

    /// Every file written, in write order
    pub files: Vec<PathBuf>,
}

/// NumPy exporter rooted at one output directory.
#[derive(Debug, Clone)]
pub struct NumpyExporter {
    output_dir: PathBuf,
}

impl NumpyExporter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Export `outcome` under `name`.
    ///
    /// Fails with [`DatasetError::Export`] when the dataset has no samples or
    /// `name` is not a plain file prefix.
    pub fn export(
        &self,
        name: &str,
        outcome: &DatasetOutcome,
        config: &DatasetConfig,
    ) -> Result<ExportResult> {
        validate_name(name)?;

        let dataset = &outcome.dataset;
        let (Some(&first), Some(&last)) =
            (dataset.origin_dates.first(), dataset.origin_dates.last())
        else {
            return Err(DatasetError::export(format!(
                "no samples to export for '{name}' ({})",
                outcome.status
            )));
        };

        fs::create_dir_all(&self.output_dir)?;
        let mut files = Vec::with_capacity(4);

        let features_path = self.path_for(name, "features.npy");
        dataset
            .feature_matrix()?
            .write_npy(BufWriter::new(File::create(&features_path)?))?;
        files.push(features_path);

        let targets_path = self.path_for(name, "targets.npy");
        let targets_file = BufWriter::new(File::create(&targets_path)?);
        match &dataset.targets {
            Targets::Continuous(values) => Array1::from(values.clone()).write_npy(targets_file)?,
            Targets::Binary(labels) => labels
                .iter()
                .map(|l| l.as_int())
                .collect::<Array1<i8>>()
                .write_npy(targets_file)?,
        }
        files.push(targets_path);

        let origins_path = self.path_for(name, "origins.npy");
        dataset
            .origins
            .iter()
            .map(|&i| i as u64)
            .collect::<Array1<u64>>()
            .write_npy(BufWriter::new(File::create(&origins_path)?))?;
        files.push(origins_path);

        let label_distribution = dataset.label_stats();
        let metadata = ExportMetadata {
            name: name.to_string(),
            n_samples: dataset.n_samples(),
            n_features: dataset.n_features(),
            window_size: dataset.params.window_size,
            horizon: dataset.params.horizon,
            mode: dataset.targets.mode(),
            instruments: dataset.instruments.clone(),
            feature_names: dataset.feature_names.clone(),
            first_origin_date: first,
            last_origin_date: last,
            panel_rows: outcome.panel_rows,
            dropped_features: outcome.reconcile_stats.features_dropped,
            dropped_targets: outcome.reconcile_stats.targets_dropped,
            unmatched: outcome.reconcile_stats.unmatched,
            label_distribution: label_distribution.clone(),
            config: config.clone(),
            export_timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let metadata_path = self.path_for(name, "metadata.json");
        serde_json::to_writer_pretty(BufWriter::new(File::create(&metadata_path)?), &metadata)?;
        files.push(metadata_path);

        tracing::info!(
            export = name,
            samples = metadata.n_samples,
            features = metadata.n_features,
            dir = %self.output_dir.display(),
            "dataset exported"
        );

        Ok(ExportResult {
            name: name.to_string(),
            n_samples: metadata.n_samples,
            n_features: metadata.n_features,
            label_distribution,
            files,
        })
    }

    /// Read back the metadata of a previous export.
    pub fn read_metadata(&self, name: &str) -> Result<ExportMetadata> {
        let file = File::open(self.path_for(name, "metadata.json"))?;
        Ok(serde_json::from_reader(file)?)
    }

    fn path_for(&self, name: &str, suffix: &str) -> PathBuf {
        self.output_dir.join(format!("{name}_{suffix}"))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(DatasetError::export("export name must not be empty"));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(DatasetError::export(format!(
            "export name '{name}' must be a file prefix, not a path"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DateRange;
    use crate::panel::Panel;
    use crate::pipeline::Pipeline;
    use ndarray::Array2;
    use tempfile::TempDir;

    fn rising_panel(n: usize) -> Panel {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let dates = (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect();
        let values = Array2::from_shape_fn((n, 2), |(r, c)| (c + 1) as f64 * 10.0 + r as f64);
        Panel::new(dates, vec!["BTC-USD".into(), "GC=F".into()], values).unwrap()
    }

    fn config(mode: TargetMode) -> DatasetConfig {
        DatasetConfig::new("BTC-USD", 4, 3)
            .with_auxiliary(vec!["GC=F".to_string()])
            .with_mode(mode)
            .with_date_range(DateRange::parse("2023-01-01", "2023-12-31").unwrap())
    }

    fn outcome(mode: TargetMode, rows: usize) -> DatasetOutcome {
        Pipeline::new(config(mode))
            .unwrap()
            .build(&rising_panel(rows))
            .unwrap()
    }

    #[test]
    fn test_export_writes_all_files() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = NumpyExporter::new(temp_dir.path());

        let result = exporter
            .export("btc", &outcome(TargetMode::Continuous, 20), &config(TargetMode::Continuous))
            .unwrap();

        assert_eq!(result.n_samples, 14);
        assert_eq!(result.n_features, 8);
        assert_eq!(result.files.len(), 4);
        for file in &result.files {
            assert!(file.exists(), "{} should exist", file.display());
        }
        assert!(temp_dir.path().join("btc_features.npy").exists());
        assert!(temp_dir.path().join("btc_metadata.json").exists());
    }

    #[test]
    fn test_metadata_accuracy() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = NumpyExporter::new(temp_dir.path());
        exporter
            .export("labels", &outcome(TargetMode::Binary, 20), &config(TargetMode::Binary))
            .unwrap();

        let metadata = exporter.read_metadata("labels").unwrap();
        assert_eq!(metadata.n_samples, 14);
        assert_eq!(metadata.window_size, 4);
        assert_eq!(metadata.horizon, 3);
        assert_eq!(metadata.mode, TargetMode::Binary);
        assert_eq!(metadata.feature_names.len(), 8);
        assert_eq!(metadata.panel_rows, 20);
        assert_eq!(
            metadata.first_origin_date,
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        );
        let stats = metadata.label_distribution.unwrap();
        assert_eq!(stats.total, 14);
        assert_eq!(stats.down_count, 14);
        assert_eq!(metadata.config, config(TargetMode::Binary));
    }

    #[test]
    fn test_empty_dataset_error() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = NumpyExporter::new(temp_dir.path());

        let result = exporter.export(
            "short",
            &outcome(TargetMode::Continuous, 5),
            &config(TargetMode::Continuous),
        );
        assert!(matches!(result, Err(DatasetError::Export(_))));
        assert!(!temp_dir.path().join("short_features.npy").exists());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let temp_dir = TempDir::new().unwrap();
        let exporter = NumpyExporter::new(temp_dir.path());
        let ready = outcome(TargetMode::Continuous, 20);
        let cfg = config(TargetMode::Continuous);

        for name in ["", "  ", "../escape", "a/b", ".."] {
            assert!(exporter.export(name, &ready, &cfg).is_err(), "name {name:?}");
        }
    }
}
