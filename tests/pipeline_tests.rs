//! Pipeline Integration Tests
//!
//! End-to-end runs from a provider through windowing, reconciliation and
//! labeling, covering the status paths for missing or insufficient data.

use chrono::{Duration, NaiveDate};
use ndarray::Array2;
use std::fs;
use tempfile::TempDir;
use window_dataset::prelude::*;

// ============================================================================
// Helpers
// ============================================================================

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// BTC, S&P 500 and gold over `rows` consecutive days from 2023-01-01.
fn market_panel(rows: usize) -> Panel {
    let start = date("2023-01-01");
    let dates = (0..rows).map(|i| start + Duration::days(i as i64)).collect();
    let values = Array2::from_shape_fn((rows, 3), |(r, c)| match c {
        0 => 20_000.0 + 150.0 * (r as f64 * 0.3).sin() + r as f64 * 10.0,
        1 => 4_000.0 + r as f64,
        _ => 1_900.0 - r as f64 * 0.5,
    });
    Panel::new(dates, ids(&["BTC-USD", "^GSPC", "GC=F"]), values).unwrap()
}

fn config(target: &str, auxiliary: &[&str], w: usize, h: usize) -> DatasetConfig {
    DatasetConfig::new(target, w, h)
        .with_auxiliary(ids(auxiliary))
        .with_date_range(DateRange::parse("2023-01-01", "2023-12-31").unwrap())
}

struct EmptyProvider;

impl PanelProvider for EmptyProvider {
    fn fetch_panel(&self, instruments: &[String], _: NaiveDate, _: NaiveDate) -> Result<Panel> {
        Panel::empty(instruments.to_vec())
    }
}

struct UnreachableProvider;

impl PanelProvider for UnreachableProvider {
    fn fetch_panel(&self, _: &[String], _: NaiveDate, _: NaiveDate) -> Result<Panel> {
        Err(DatasetError::Provider("HTTP 503 from quote service".to_string()))
    }
}

/// Always returns its columns in reverse order.
struct ShuffledProvider(Panel);

impl PanelProvider for ShuffledProvider {
    fn fetch_panel(&self, instruments: &[String], start: NaiveDate, end: NaiveDate) -> Result<Panel> {
        let reversed: Vec<String> = instruments.iter().rev().cloned().collect();
        self.0.select(&reversed, start, end)
    }
}

// ============================================================================
// Provider Outcomes
// ============================================================================

#[test]
fn test_empty_provider_yields_no_data_status() {
    let pipeline = Pipeline::new(config("BTC-USD", &[], 5, 1)).unwrap();
    let outcome = pipeline.run(&EmptyProvider).unwrap();

    assert_eq!(outcome.status, DatasetStatus::NoData { warning: None });
    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.panel_rows, 0);
}

#[test]
fn test_provider_failure_is_recovered_with_warning() {
    let pipeline = Pipeline::new(config("BTC-USD", &["^GSPC"], 5, 1)).unwrap();
    let outcome = pipeline.run(&UnreachableProvider).unwrap();

    match &outcome.status {
        DatasetStatus::NoData { warning: Some(w) } => assert!(w.contains("503")),
        other => panic!("expected NoData with warning, got {other:?}"),
    }
    assert_eq!(outcome.n_samples(), 0);
    assert_eq!(outcome.dataset.instruments, ids(&["BTC-USD", "^GSPC"]));
}

#[test]
fn test_reordered_provider_columns_are_rejected() {
    let pipeline = Pipeline::new(config("BTC-USD", &["GC=F"], 5, 1)).unwrap();
    let result = pipeline.run(&ShuffledProvider(market_panel(40)));
    assert!(matches!(result, Err(DatasetError::Alignment(_))));
}

#[test]
fn test_in_memory_provider_selects_columns_and_dates() {
    let provider = InMemoryProvider::new(market_panel(365));
    let cfg = config("GC=F", &["BTC-USD"], 10, 3)
        .with_date_range(DateRange::parse("2023-02-01", "2023-02-28").unwrap());

    let outcome = Pipeline::new(cfg).unwrap().run(&provider).unwrap();

    assert!(outcome.status.is_ready());
    assert_eq!(outcome.panel_rows, 28);
    assert_eq!(outcome.n_samples(), 28 - 10 - 3 + 1);
    assert_eq!(outcome.dataset.instruments, ids(&["GC=F", "BTC-USD"]));
    assert_eq!(outcome.dataset.origin_dates[0], date("2023-02-01"));

    // Column 0 is gold, so the target is gold's price.
    let full = market_panel(365);
    let gold = full.column_of("GC=F").unwrap();
    let first_target_row = 31 + 10 + 3 - 1;
    assert_eq!(
        outcome.dataset.targets.as_continuous().unwrap()[0],
        full.value(first_target_row, gold).unwrap()
    );
}

// ============================================================================
// Status Paths
// ============================================================================

#[test]
fn test_insufficient_rows_is_not_an_error() {
    let provider = InMemoryProvider::new(market_panel(10));
    let outcome = Pipeline::new(config("BTC-USD", &[], 8, 3))
        .unwrap()
        .run(&provider)
        .unwrap();

    assert_eq!(
        outcome.status,
        DatasetStatus::InsufficientRows {
            rows: 10,
            required: 11
        }
    );
    assert!(outcome.dataset.is_empty());
    assert_eq!(outcome.dataset.feature_matrix().unwrap().dim(), (0, 8));
}

#[test]
fn test_exact_minimum_rows_yields_one_sample() {
    let provider = InMemoryProvider::new(market_panel(11));
    let outcome = Pipeline::new(config("BTC-USD", &["^GSPC", "GC=F"], 8, 3))
        .unwrap()
        .run(&provider)
        .unwrap();

    assert!(outcome.status.is_ready());
    assert_eq!(outcome.n_samples(), 1);
    assert_eq!(outcome.dataset.n_features(), 24);
}

// ============================================================================
// Targets and Labels
// ============================================================================

#[test]
fn test_continuous_dataset_matches_panel() {
    let panel = market_panel(120);
    let pipeline = Pipeline::new(config("BTC-USD", &["^GSPC", "GC=F"], 20, 5)).unwrap();
    let outcome = pipeline.build(&panel).unwrap();
    let ds = &outcome.dataset;

    assert_eq!(ds.n_samples(), 120 - 20 - 5 + 1);
    assert_eq!(ds.feature_names.len(), 60);
    assert_eq!(ds.feature_names[0], "BTC-USD_t-19");
    assert_eq!(ds.feature_names[59], "GC=F_t-0");

    let targets = ds.targets.as_continuous().unwrap();
    for (j, &origin) in ds.origins.iter().enumerate() {
        assert_eq!(targets[j], panel.target_value(origin + 24).unwrap());
        assert_eq!(ds.features[j][0], panel.value(origin, 0).unwrap());
        assert_eq!(ds.features[j][59], panel.value(origin + 19, 2).unwrap());
    }

    let matrix = ds.feature_matrix().unwrap();
    assert_eq!(matrix.dim(), (96, 60));
    assert_eq!(ds.target_vector().len(), 96);
    assert!(validate_dataset(ds).is_valid());
}

#[test]
fn test_binary_labels_are_always_down_on_exact_data() {
    for (w, h) in [(1, 1), (10, 3), (30, 7)] {
        let pipeline = Pipeline::new(
            config("BTC-USD", &["GC=F"], w, h).with_mode(TargetMode::Binary),
        )
        .unwrap();
        let outcome = pipeline.build(&market_panel(200)).unwrap();

        let labels = outcome.dataset.targets.as_labels().unwrap();
        assert_eq!(labels.len(), 200 - w - h + 1);
        assert!(labels.iter().all(|&l| l == DirectionLabel::Down));
        assert_eq!(outcome.dataset.label_stats().unwrap().up_count, 0);

        let validation = validate_dataset(&outcome.dataset);
        assert!(!validation.has_errors());
        assert!(validation.has_warnings());
    }
}

#[test]
fn test_binary_and_continuous_share_features() {
    let panel = market_panel(90);
    let continuous = Pipeline::new(config("BTC-USD", &["^GSPC"], 15, 5))
        .unwrap()
        .build(&panel)
        .unwrap();
    let binary = Pipeline::new(config("BTC-USD", &["^GSPC"], 15, 5).with_mode(TargetMode::Binary))
        .unwrap()
        .build(&panel)
        .unwrap();

    assert_eq!(continuous.dataset.origins, binary.dataset.origins);
    assert_eq!(continuous.dataset.features, binary.dataset.features);
}

#[test]
fn test_label_transformer_rejects_misaligned_inputs() {
    let panel = market_panel(20);
    let transformer = LabelTransformer::new(WindowParams::new(5, 3)).unwrap();

    let result = transformer.transform(&panel, &[0, 1], &[1.0]);
    assert!(matches!(result, Err(DatasetError::Alignment(_))));

    let result = transformer.transform(&panel, &[13], &[1.0]);
    assert!(matches!(result, Err(DatasetError::Alignment(_))));
}

#[test]
fn test_pipeline_is_idempotent() {
    let provider = InMemoryProvider::new(market_panel(150));
    let pipeline = Pipeline::new(config("BTC-USD", &["^GSPC", "GC=F"], 30, 7)).unwrap();

    let first = pipeline.run(&provider).unwrap();
    let second = pipeline.run(&provider).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// CSV End to End
// ============================================================================

#[test]
fn test_csv_provider_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("closes.csv");

    // Weekends missing for ^GSPC: those rows are dropped for the full panel.
    let mut csv = String::from("date,BTC-USD,^GSPC\n");
    let start = date("2024-01-01");
    for i in 0..28 {
        let day = start + Duration::days(i);
        let gspc = if i % 7 >= 5 {
            String::new()
        } else {
            format!("{:.1}", 4700.0 + i as f64)
        };
        csv.push_str(&format!("{day},{:.1},{gspc}\n", 42_000.0 + 100.0 * i as f64));
    }
    fs::write(&path, csv).unwrap();

    let provider = CsvProvider::new(&path);
    let cfg = DatasetConfig::new("BTC-USD", 5, 3)
        .with_date_range(DateRange::parse("2024-01-01", "2024-01-31").unwrap());

    // BTC alone trades every day.
    let btc_only = Pipeline::new(cfg.clone()).unwrap().run(&provider).unwrap();
    assert_eq!(btc_only.panel_rows, 28);
    assert_eq!(btc_only.n_samples(), 28 - 5 - 3 + 1);

    // Adding ^GSPC drops the eight weekend rows.
    let joint = Pipeline::new(cfg.with_auxiliary(ids(&["^GSPC"])))
        .unwrap()
        .run(&provider)
        .unwrap();
    assert_eq!(joint.panel_rows, 20);
    assert_eq!(joint.n_samples(), 20 - 5 - 3 + 1);
    assert!(joint
        .dataset
        .origin_dates
        .iter()
        .all(|d| d.format("%a").to_string() != "Sat"));
}

#[test]
fn test_csv_provider_missing_file_is_recovered() {
    let temp_dir = TempDir::new().unwrap();
    let provider = CsvProvider::new(temp_dir.path().join("missing.csv"));

    let outcome = Pipeline::new(config("BTC-USD", &[], 5, 1))
        .unwrap()
        .run(&provider)
        .unwrap();
    assert!(matches!(
        outcome.status,
        DatasetStatus::NoData { warning: Some(_) }
    ));
}
