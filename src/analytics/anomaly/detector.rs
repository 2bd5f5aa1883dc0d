//! Anomaly Detector Implementation
//!
//! 異常検知器の実装（Z-スコア ∨ アンサンブル外れ値検知）

use super::impute::impute_mean;
use super::isolation::{IsolationForest, OutlierStrategy};
use super::rolling::RollingStats;
use super::types::{AnalyzedPoint, AnalyzedSeries, DetectionParams};
use super::zscore::ZScoreDetector;
use crate::analytics::series::Series;
use crate::error::{Error, Result};
use ndarray::Array2;

/// 異常検知器
pub struct AnomalyDetector {
    /// 検知パラメータ
    params: DetectionParams,
    /// アンサンブル外れ値ストラテジー
    strategy: Box<dyn OutlierStrategy>,
}

impl AnomalyDetector {
    /// Isolation Forest（seed = 42）を使う検知器を作成
    pub fn new(params: DetectionParams) -> Self {
        let strategy = IsolationForest::new(params.contamination);
        Self {
            params,
            strategy: Box::new(strategy),
        }
    }

    /// 任意の外れ値ストラテジーで検知器を作成
    pub fn with_strategy(params: DetectionParams, strategy: Box<dyn OutlierStrategy>) -> Self {
        Self { params, strategy }
    }

    /// 時系列の異常を検知
    pub fn detect(&self, series: &Series) -> Result<AnalyzedSeries> {
        self.params.validate()?;
        if series.len() < 2 {
            return Err(Error::insufficient(2, series.len()));
        }

        let values = series.values();
        let stats = RollingStats::compute(&values, self.params.window);

        let z = ZScoreDetector::new(self.params.z_threshold).detect(&values, &stats);

        let features = feature_matrix(&values, &stats);
        let imputed = impute_mean(features.view())?;
        let ensemble = self.strategy.fit_flag(imputed.view())?;
        if ensemble.len() != values.len() {
            return Err(Error::InvalidInput(format!(
                "{} returned {} flags for {} points",
                self.strategy.name(),
                ensemble.len(),
                values.len()
            )));
        }

        let is_anomaly = combine_or(&z.flags, &ensemble);

        let points: Vec<AnalyzedPoint> = series
            .points()
            .iter()
            .enumerate()
            .map(|(i, p)| AnalyzedPoint {
                date: p.date,
                value: p.value,
                rolling_mean: stats.mean[i],
                rolling_std: stats.std[i],
                z_score: z.z_scores[i],
                is_anomaly_z: z.flags[i],
                is_anomaly_ensemble: ensemble[i],
                is_anomaly: is_anomaly[i],
            })
            .collect();

        let analyzed = AnalyzedSeries {
            window: self.params.window,
            points,
        };

        tracing::info!(
            points = analyzed.len(),
            z_flags = z.flags.iter().filter(|f| **f).count(),
            ensemble_flags = ensemble.iter().filter(|f| **f).count(),
            anomalies = analyzed.anomaly_count(),
            strategy = self.strategy.name(),
            "anomaly detection complete"
        );

        Ok(analyzed)
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(DetectionParams::default())
    }
}

/// 既定ストラテジーで異常を検知
pub fn detect(
    series: &Series,
    window: usize,
    z_threshold: f64,
    contamination: f64,
) -> Result<AnalyzedSeries> {
    AnomalyDetector::new(DetectionParams {
        window,
        z_threshold,
        contamination,
    })
    .detect(series)
}

/// 2つのフラグ列の論理和
pub fn combine_or(a: &[bool], b: &[bool]) -> Vec<bool> {
    a.iter().zip(b).map(|(x, y)| *x || *y).collect()
}

/// (value, rolling_mean, rolling_std)。未定義セルは NaN
fn feature_matrix(values: &[f64], stats: &RollingStats) -> Array2<f64> {
    Array2::from_shape_fn((values.len(), 3), |(r, c)| match c {
        0 => values[r],
        1 => stats.mean[r].unwrap_or(f64::NAN),
        _ => stats.std[r].unwrap_or(f64::NAN),
    })
}
