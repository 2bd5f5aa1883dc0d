//! Z-Score Detector
//!
//! ローリング統計に基づく Z-スコア異常検知

use super::rolling::RollingStats;

/// Z-スコア検知結果
#[derive(Debug, Clone, PartialEq)]
pub struct ZScoreResult {
    pub z_scores: Vec<Option<f64>>,
    pub flags: Vec<bool>,
}

/// Z-スコア検知器
#[derive(Debug, Clone)]
pub struct ZScoreDetector {
    /// |z| がこの値を超えると異常
    threshold: f64,
}

impl ZScoreDetector {
    /// 新しい検知器を作成
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// 各点の Z-スコアと異常フラグを計算
    ///
    /// A point whose rolling std is undefined or numerically zero gets no
    /// z-score and is never flagged. Overflowing statistics count as undefined.
    pub fn detect(&self, values: &[f64], stats: &RollingStats) -> ZScoreResult {
        let z_scores: Vec<Option<f64>> = values
            .iter()
            .zip(stats.mean.iter().zip(stats.std.iter()))
            .map(|(value, (mean, std))| z_score(*value, *mean, *std))
            .collect();

        let flags = z_scores
            .iter()
            .map(|z| z.is_some_and(|z| z.abs() > self.threshold))
            .collect();

        ZScoreResult { z_scores, flags }
    }
}

fn z_score(value: f64, mean: Option<f64>, std: Option<f64>) -> Option<f64> {
    let (mean, std) = (mean?, std?);
    if !(std > f64::EPSILON * mean.abs().max(1.0)) {
        return None;
    }
    Some((value - mean) / std).filter(|z| z.is_finite())
}
