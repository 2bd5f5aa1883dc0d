//! 異常検知の統合テスト

use agrisense::analytics::anomaly::{detect, AnomalyDetector, DetectionParams, IsolationForest};
use agrisense::analytics::{ingest, Observation, Series};
use chrono::{Days, NaiveDate};

fn series_from(values: &[f64]) -> Series {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let observations: Vec<Observation> = values
        .iter()
        .enumerate()
        .map(|(i, v)| Observation::new(start.checked_add_days(Days::new(i as u64)).unwrap(), *v))
        .collect();
    ingest(&observations).unwrap()
}

fn spike_series() -> Series {
    let mut values = vec![0.4; 90];
    values[60] = 0.9;
    series_from(&values)
}

#[test]
fn test_single_spike_is_the_only_anomaly() {
    let series = spike_series();

    let analyzed = detect(&series, 30, 2.5, 0.05).unwrap();

    let flagged: Vec<usize> = analyzed
        .points
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_anomaly)
        .map(|(i, _)| i)
        .collect();
    assert_eq!(flagged, vec![60]);

    let spike = &analyzed.points[60];
    assert!(spike.is_anomaly_z);
    assert!(spike.z_score.unwrap() > 2.5);
}

#[test]
fn test_constant_series_has_no_anomalies() {
    let series = series_from(&[0.55; 60]);

    let analyzed = AnomalyDetector::default().detect(&series).unwrap();

    assert_eq!(analyzed.len(), 60);
    assert_eq!(analyzed.anomaly_count(), 0);
    for point in &analyzed.points {
        assert_eq!(point.z_score, None);
        assert!(!point.is_anomaly_z);
    }
}

#[test]
fn test_warmup_window_has_undefined_statistics() {
    let values: Vec<f64> = (0..45).map(|i| 0.3 + 0.01 * (i % 7) as f64).collect();
    let series = series_from(&values);

    let analyzed = detect(&series, 30, 2.5, 0.05).unwrap();

    for point in &analyzed.points[..29] {
        assert!(point.rolling_mean.is_none());
        assert!(point.rolling_std.is_none());
        assert!(!point.is_anomaly_z);
    }
    assert!(analyzed.points[29].rolling_mean.is_some());
}

#[test]
fn test_detection_is_repeatable() {
    let values: Vec<f64> = (0..120)
        .map(|i| 0.5 + 0.1 * ((i as f64) / 9.0).sin() + if i == 80 { 0.4 } else { 0.0 })
        .collect();
    let series = series_from(&values);

    let first = detect(&series, 30, 2.5, 0.05).unwrap();
    let second = detect(&series, 30, 2.5, 0.05).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_anomaly_flag_is_union_of_both_detectors() {
    let values: Vec<f64> = (0..100)
        .map(|i| 0.45 + 0.05 * ((i as f64) / 5.0).cos() + if i % 37 == 0 { 0.3 } else { 0.0 })
        .collect();
    let series = series_from(&values);

    let params = DetectionParams {
        window: 20,
        z_threshold: 2.0,
        contamination: 0.1,
    };
    let detector = AnomalyDetector::with_strategy(
        params,
        Box::new(IsolationForest::new(0.1).with_estimators(50)),
    );
    let analyzed = detector.detect(&series).unwrap();

    for point in &analyzed.points {
        assert_eq!(point.is_anomaly, point.is_anomaly_z || point.is_anomaly_ensemble);
    }
}

#[test]
fn test_invalid_parameters_are_rejected() {
    let series = spike_series();

    assert!(detect(&series, 0, 2.5, 0.05).is_err());
    assert!(detect(&series, 30, 2.5, 0.0).is_err());
    assert!(detect(&series, 30, 2.5, 0.6).is_err());
}

#[test]
fn test_extreme_finite_values_are_analyzed_without_panic() {
    let series = series_from(&[1e308, -1e308, 0.0, 0.0, 0.5]);

    let analyzed = detect(&series, 30, 2.5, 0.05).unwrap();
    assert_eq!(analyzed.len(), 5);

    // ウィンドウ内で分散がオーバーフローする場合
    let analyzed = detect(&series, 2, 2.5, 0.05).unwrap();
    assert_eq!(analyzed.len(), 5);
    assert!(analyzed
        .points
        .iter()
        .all(|p| p.z_score.map_or(true, f64::is_finite)));
}
