//! Series Types
//!
//! 時系列データの型定義

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 観測値（日付と指標値）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// 観測日
    pub date: NaiveDate,
    /// 指標値（NDVI 等）
    pub value: f64,
}

impl Observation {
    /// 新しい観測値を作成
    pub fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// 日次グリッド上の1点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// 欠損のない日次時系列
///
/// Dates are strictly increasing with a step of exactly one day and every
/// value is finite. Deserialization goes through the same check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SeriesPoint>", into = "Vec<SeriesPoint>")]
pub struct Series {
    points: Vec<SeriesPoint>,
}

impl Series {
    /// Builds a series from points that already satisfy the daily-grid invariant.
    pub(crate) fn from_points(points: Vec<SeriesPoint>) -> Self {
        debug_assert!(points
            .windows(2)
            .all(|w| w[0].date.succ_opt() == Some(w[1].date)));
        Self { points }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// 指定日の値を取得
    pub fn value_at(&self, date: NaiveDate) -> Option<f64> {
        let first = self.first_date()?;
        let offset = usize::try_from((date - first).num_days()).ok()?;
        self.points.get(offset).map(|p| p.value)
    }
}

impl TryFrom<Vec<SeriesPoint>> for Series {
    type Error = Error;

    /// 日次グリッドの条件を満たす点列のみ受け付ける
    fn try_from(points: Vec<SeriesPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(Error::EmptySeries);
        }
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-finite value {} on {}",
                p.value, p.date
            )));
        }
        if let Some(w) = points
            .windows(2)
            .find(|w| w[0].date.succ_opt() != Some(w[1].date))
        {
            return Err(Error::InvalidInput(format!(
                "series is not a contiguous daily grid: {} followed by {}",
                w[0].date, w[1].date
            )));
        }
        Ok(Self { points })
    }
}

impl From<Series> for Vec<SeriesPoint> {
    fn from(series: Series) -> Self {
        series.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(day: u32, value: f64) -> SeriesPoint {
        SeriesPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            value,
        }
    }

    #[test]
    fn test_contiguous_points_are_accepted() {
        let series = Series::try_from(vec![point(1, 0.2), point(2, 0.3)]).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.value_at(point(2, 0.0).date), Some(0.3));
    }

    #[test]
    fn test_gapped_or_unsorted_points_are_rejected() {
        assert!(Series::try_from(vec![point(1, 0.2), point(3, 0.3)]).is_err());
        assert!(Series::try_from(vec![point(2, 0.2), point(1, 0.3)]).is_err());
        assert!(Series::try_from(vec![point(1, 0.2), point(1, 0.3)]).is_err());
        assert!(matches!(Series::try_from(Vec::new()), Err(Error::EmptySeries)));
        assert!(Series::try_from(vec![point(1, f64::NAN)]).is_err());
    }

    #[test]
    fn test_deserialization_enforces_daily_grid() {
        let gapped = r#"[{"date":"2024-03-01","value":0.2},{"date":"2024-03-05","value":0.4}]"#;
        assert!(serde_json::from_str::<Series>(gapped).is_err());

        let series = Series::try_from(vec![point(1, 0.2), point(2, 0.3)]).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(serde_json::from_str::<Series>(&json).unwrap(), series);
    }
}
