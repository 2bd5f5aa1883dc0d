//! Series Ingestion
//!
//! 不規則な観測値を日次の連続時系列に整形する

use super::types::{Observation, Series, SeriesPoint};
use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// 観測値を日次時系列に変換
///
/// Same-day observations are averaged, the calendar between the first and
/// last date is filled day by day, and missing days are linearly
/// interpolated from their nearest known neighbours. Non-finite readings
/// count as missing.
pub fn ingest(observations: &[Observation]) -> Result<Series> {
    let daily = average_by_date(observations);
    if daily.is_empty() {
        return Err(Error::EmptySeries);
    }

    // 非有限値のみの日も暦の範囲に含める
    let (first, last) = match (
        observations.iter().map(|o| o.date).min(),
        observations.iter().map(|o| o.date).max(),
    ) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::EmptySeries),
    };

    let span = (last - first).num_days() as usize + 1;
    let mut grid: Vec<Option<f64>> = vec![None; span];
    for (date, value) in &daily {
        let offset = (*date - first).num_days() as usize;
        grid[offset] = Some(*value);
    }

    let missing = span - daily.len();
    let filled = interpolate_linear(&grid);

    let points: Vec<SeriesPoint> = filled
        .into_iter()
        .enumerate()
        .filter_map(|(offset, value)| {
            let value = value?;
            let date = first.checked_add_days(Days::new(offset as u64))?;
            Some(SeriesPoint { date, value })
        })
        .collect();

    if points.is_empty() {
        return Err(Error::EmptySeries);
    }

    tracing::debug!(
        observations = observations.len(),
        days = points.len(),
        interpolated = missing,
        "series ingested"
    );

    Ok(Series::from_points(points))
}

/// 同一日の観測値を平均化
fn average_by_date(observations: &[Observation]) -> BTreeMap<NaiveDate, f64> {
    let mut sums: BTreeMap<NaiveDate, (f64, usize)> = BTreeMap::new();
    for obs in observations.iter().filter(|o| o.value.is_finite()) {
        let entry = sums.entry(obs.date).or_insert((0.0, 0));
        entry.0 += obs.value;
        entry.1 += 1;
    }

    sums.into_iter()
        .map(|(date, (sum, count))| (date, sum / count as f64))
        .collect()
}

/// 線形補間（両方向）
///
/// Interior gaps are filled on the straight line between the known values on
/// either side. Leading and trailing gaps take the nearest known value. A
/// slice with no known value is returned unchanged.
fn interpolate_linear(values: &[Option<f64>]) -> Vec<Option<f64>> {
    let known: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();

    let (Some(&(first_idx, first_val)), Some(&(last_idx, last_val))) =
        (known.first(), known.last())
    else {
        return values.to_vec();
    };

    let mut out = values.to_vec();
    for slot in out.iter_mut().take(first_idx) {
        *slot = Some(first_val);
    }
    for slot in out.iter_mut().skip(last_idx + 1) {
        *slot = Some(last_val);
    }

    for pair in known.windows(2) {
        let (left_idx, left_val) = pair[0];
        let (right_idx, right_val) = pair[1];
        let gap = (right_idx - left_idx) as f64;
        for idx in (left_idx + 1)..right_idx {
            let t = (idx - left_idx) as f64 / gap;
            out[idx] = Some(left_val * (1.0 - t) + right_val * t);
        }
    }

    out
}
