//! Export Integration Tests
//!
//! Builds datasets through the pipeline, exports them, and reads the arrays
//! back to check shapes, dtypes and row alignment.

use chrono::{Duration, NaiveDate};
use ndarray::{Array1, Array2};
use ndarray_npy::ReadNpyExt;
use std::fs::File;
use tempfile::TempDir;
use window_dataset::prelude::*;

fn panel(rows: usize) -> Panel {
    let start = NaiveDate::from_ymd_opt(2022, 6, 1).unwrap();
    let dates = (0..rows).map(|i| start + Duration::days(i as i64)).collect();
    let values = Array2::from_shape_fn((rows, 2), |(r, c)| {
        if c == 0 {
            30_000.0 + (r as f64 * 0.7).cos() * 500.0
        } else {
            1_800.0 + r as f64
        }
    });
    Panel::new(dates, vec!["BTC-USD".to_string(), "GC=F".to_string()], values).unwrap()
}

fn config(mode: TargetMode) -> DatasetConfig {
    DatasetConfig::new("BTC-USD", 10, 5)
        .with_auxiliary(vec!["GC=F".to_string()])
        .with_mode(mode)
        .with_date_range(DateRange::parse("2022-06-01", "2022-12-31").unwrap())
}

fn build(mode: TargetMode, rows: usize) -> (DatasetConfig, DatasetOutcome) {
    let cfg = config(mode);
    let outcome = Pipeline::new(cfg.clone())
        .unwrap()
        .run(&InMemoryProvider::new(panel(rows)))
        .unwrap();
    (cfg, outcome)
}

fn open(dir: &TempDir, file: &str) -> File {
    File::open(dir.path().join(file)).unwrap()
}

#[test]
fn test_continuous_export_shapes() {
    let temp_dir = TempDir::new().unwrap();
    let (cfg, outcome) = build(TargetMode::Continuous, 100);

    let result = NumpyExporter::new(temp_dir.path())
        .export("btc", &outcome, &cfg)
        .unwrap();
    assert_eq!(result.n_samples, 86);
    assert_eq!(result.n_features, 20);

    let features = Array2::<f64>::read_npy(open(&temp_dir, "btc_features.npy")).unwrap();
    let targets = Array1::<f64>::read_npy(open(&temp_dir, "btc_targets.npy")).unwrap();
    let origins = Array1::<u64>::read_npy(open(&temp_dir, "btc_origins.npy")).unwrap();

    assert_eq!(features.dim(), (86, 20));
    assert_eq!(targets.len(), 86);
    assert_eq!(origins.len(), 86);

    // Row j of each array describes the same sample.
    let source = panel(100);
    for j in [0usize, 40, 85] {
        let origin = origins[j] as usize;
        assert_eq!(origin, j);
        assert_eq!(features[(j, 0)], source.value(origin, 0).unwrap());
        assert_eq!(features[(j, 19)], source.value(origin + 9, 1).unwrap());
        assert_eq!(targets[j], source.target_value(origin + 14).unwrap());
    }
}

#[test]
fn test_binary_export_writes_i8_labels() {
    let temp_dir = TempDir::new().unwrap();
    let (cfg, outcome) = build(TargetMode::Binary, 60);

    let result = NumpyExporter::new(temp_dir.path())
        .export("btc_dir", &outcome, &cfg)
        .unwrap();

    let labels = Array1::<i8>::read_npy(open(&temp_dir, "btc_dir_targets.npy")).unwrap();
    assert_eq!(labels.len(), 46);
    assert!(labels.iter().all(|&l| l == 0));

    let dist = result.label_distribution.unwrap();
    assert_eq!(dist.down_count, 46);
    assert_eq!(dist.up_count, 0);
}

#[test]
fn test_metadata_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let (cfg, outcome) = build(TargetMode::Continuous, 50);
    let exporter = NumpyExporter::new(temp_dir.path().join("nested/out"));

    exporter.export("run1", &outcome, &cfg).unwrap();
    let metadata = exporter.read_metadata("run1").unwrap();

    assert_eq!(metadata.name, "run1");
    assert_eq!(metadata.n_samples, 36);
    assert_eq!(metadata.instruments, vec!["BTC-USD", "GC=F"]);
    assert_eq!(metadata.feature_names.len(), 20);
    assert_eq!(metadata.mode, TargetMode::Continuous);
    assert_eq!(metadata.first_origin_date, NaiveDate::from_ymd_opt(2022, 6, 1).unwrap());
    assert_eq!(metadata.last_origin_date, NaiveDate::from_ymd_opt(2022, 7, 6).unwrap());
    assert_eq!(metadata.dropped_targets, 5);
    assert!(metadata.label_distribution.is_none());
    assert_eq!(metadata.config, cfg);
}

#[test]
fn test_export_refuses_empty_dataset() {
    let temp_dir = TempDir::new().unwrap();
    let (cfg, outcome) = build(TargetMode::Continuous, 12);
    assert!(!outcome.status.is_ready());

    let result = NumpyExporter::new(temp_dir.path()).export("short", &outcome, &cfg);
    assert!(matches!(result, Err(DatasetError::Export(_))));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}
