//! Anomaly Detection Types
//!
//! 異常検知用の型定義

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// 検知パラメータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionParams {
    /// ローリングウィンドウ（日数、当日を含む）
    pub window: usize,
    /// Z-スコア閾値
    pub z_threshold: f64,
    /// 想定外れ値比率
    pub contamination: f64,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            window: 30,
            z_threshold: 2.5,
            contamination: 0.05,
        }
    }
}

impl DetectionParams {
    /// パラメータを検証
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::InvalidInput("window must be at least 1".to_string()));
        }
        if !(self.z_threshold > 0.0) {
            return Err(Error::InvalidInput(format!(
                "z_threshold must be positive, got {}",
                self.z_threshold
            )));
        }
        validate_contamination(self.contamination)
    }
}

pub(crate) fn validate_contamination(contamination: f64) -> Result<()> {
    if contamination > 0.0 && contamination <= 0.5 {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "contamination must be in (0, 0.5], got {}",
            contamination
        )))
    }
}

/// 異常検知済みの1日分
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedPoint {
    pub date: NaiveDate,
    pub value: f64,
    /// 未定義の場合は None（ウィンドウ未充足）
    pub rolling_mean: Option<f64>,
    pub rolling_std: Option<f64>,
    /// 標準偏差が 0 または未定義の場合は None
    pub z_score: Option<f64>,
    pub is_anomaly_z: bool,
    pub is_anomaly_ensemble: bool,
    /// `is_anomaly_z || is_anomaly_ensemble`
    pub is_anomaly: bool,
}

/// 異常検知済み時系列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzedSeries {
    /// 統計計算に使ったウィンドウ
    pub window: usize,
    pub points: Vec<AnalyzedPoint>,
}

impl AnalyzedSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// 異常と判定された点
    pub fn anomalies(&self) -> impl Iterator<Item = &AnalyzedPoint> {
        self.points.iter().filter(|p| p.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }
}
