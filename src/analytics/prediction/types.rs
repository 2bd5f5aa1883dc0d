//! Prediction Types
//!
//! 予測系列の型定義

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 予測パラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastParams {
    /// 末尾統計を取る点数
    pub window: usize,
    /// 予測日数
    pub horizon_days: usize,
    /// 想定外れ値比率
    pub contamination: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            window: 30,
            horizon_days: 30,
            contamination: 0.05,
        }
    }
}

/// 予測の1日分
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub is_anomaly: bool,
}

/// 予測系列
///
/// Starts the day after the last historical date and covers exactly the
/// requested horizon. Never merged back into the historical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    /// 予測に使った平均
    pub mu: f64,
    /// 予測に使った標準偏差
    pub sigma: f64,
    pub points: Vec<ForecastPoint>,
}

impl ForecastSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 異常と判定された予測日
    pub fn anomaly_dates(&self) -> Vec<NaiveDate> {
        self.points
            .iter()
            .filter(|p| p.is_anomaly)
            .map(|p| p.date)
            .collect()
    }
}
