//! 時系列取り込みの統合テスト

use agrisense::analytics::{ingest, Observation};
use agrisense::Error;
use chrono::{Days, NaiveDate};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_gaps_are_filled_on_a_daily_grid() {
    let observations = vec![
        Observation::new(date(2024, 3, 1), 0.2),
        Observation::new(date(2024, 3, 5), 0.6),
        Observation::new(date(2024, 3, 10), 0.1),
    ];

    let series = ingest(&observations).unwrap();

    assert_eq!(series.len(), 10);
    assert_eq!(series.first_date(), Some(date(2024, 3, 1)));
    assert_eq!(series.last_date(), Some(date(2024, 3, 10)));

    // 連続した日付
    for pair in series.points().windows(2) {
        assert_eq!(pair[0].date.checked_add_days(Days::new(1)), Some(pair[1].date));
    }

    // 線形補間
    assert!((series.value_at(date(2024, 3, 3)).unwrap() - 0.4).abs() < 1e-12);
    assert!((series.value_at(date(2024, 3, 7)).unwrap() - 0.4).abs() < 1e-12);
}

#[test]
fn test_observed_values_are_kept_exactly() {
    let observations = vec![
        Observation::new(date(2024, 1, 1), 0.31),
        Observation::new(date(2024, 1, 4), 0.77),
    ];

    let series = ingest(&observations).unwrap();

    assert_eq!(series.value_at(date(2024, 1, 1)), Some(0.31));
    assert_eq!(series.value_at(date(2024, 1, 4)), Some(0.77));
}

#[test]
fn test_unsorted_duplicates_are_averaged() {
    let observations = vec![
        Observation::new(date(2024, 6, 3), 0.5),
        Observation::new(date(2024, 6, 1), 0.2),
        Observation::new(date(2024, 6, 3), 0.7),
        Observation::new(date(2024, 6, 2), f64::NAN),
    ];

    let series = ingest(&observations).unwrap();

    assert_eq!(series.len(), 3);
    assert!((series.value_at(date(2024, 6, 3)).unwrap() - 0.6).abs() < 1e-12);
    assert!((series.value_at(date(2024, 6, 2)).unwrap() - 0.4).abs() < 1e-12);
}

#[test]
fn test_empty_input_is_rejected() {
    assert!(matches!(ingest(&[]), Err(Error::EmptySeries)));

    let only_missing = vec![Observation::new(date(2024, 1, 1), f64::NAN)];
    assert!(matches!(ingest(&only_missing), Err(Error::EmptySeries)));
}

#[test]
fn test_missing_readings_at_both_ends_are_edge_filled() {
    let observations = vec![
        Observation::new(date(2024, 1, 1), f64::NAN),
        Observation::new(date(2024, 1, 2), 0.3),
        Observation::new(date(2024, 1, 3), 0.5),
        Observation::new(date(2024, 1, 5), f64::INFINITY),
    ];

    let series = ingest(&observations).unwrap();

    assert_eq!(series.len(), 5);
    assert_eq!(series.first_date(), Some(date(2024, 1, 1)));
    assert_eq!(series.last_date(), Some(date(2024, 1, 5)));
    assert_eq!(series.value_at(date(2024, 1, 1)), Some(0.3));
    assert_eq!(series.value_at(date(2024, 1, 5)), Some(0.5));
}
