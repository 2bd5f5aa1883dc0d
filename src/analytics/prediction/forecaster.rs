//! Forecaster
//!
//! 末尾の移動統計から短期予測を生成し、将来の異常を推定する

use super::types::{ForecastParams, ForecastPoint, ForecastSeries};
use crate::analytics::anomaly::{AnalyzedSeries, IsolationForest, OutlierStrategy};
use crate::error::{Error, Result};
use chrono::Days;
use ndarray::Array2;
use rand::distributions::Distribution;
use rand::Rng;
use statrs::distribution::Normal;
use statrs::statistics::Statistics;

/// 予測器
pub struct Forecaster {
    params: ForecastParams,
    strategy: Box<dyn OutlierStrategy>,
}

impl Forecaster {
    /// Isolation Forest（seed = 42）で将来異常を判定する予測器を作成
    pub fn new(params: ForecastParams) -> Self {
        let strategy = IsolationForest::new(params.contamination);
        Self {
            params,
            strategy: Box::new(strategy),
        }
    }

    pub fn with_strategy(params: ForecastParams, strategy: Box<dyn OutlierStrategy>) -> Self {
        Self { params, strategy }
    }

    /// 予測系列を生成
    ///
    /// Values are drawn independently from N(mu, sigma) using `rng`; pass a
    /// seeded generator for reproducible output. The outlier pass is refitted
    /// on the synthetic values alone.
    pub fn forecast<R: Rng + ?Sized>(
        &self,
        series: &AnalyzedSeries,
        rng: &mut R,
    ) -> Result<ForecastSeries> {
        if self.params.window == 0 || self.params.horizon_days == 0 {
            return Err(Error::InvalidInput(
                "forecast window and horizon must be at least 1".to_string(),
            ));
        }
        let last_date = series
            .last_date()
            .ok_or_else(|| Error::insufficient(1, 0))?;

        let (mu, sigma) = tail_statistics(series, self.params.window);
        let values = draw(mu, sigma, self.params.horizon_days, rng)?;

        let matrix = Array2::from_shape_vec((values.len(), 1), values.clone())
            .map_err(|e| Error::InvalidInput(e.to_string()))?;
        let flags = self.strategy.fit_flag(matrix.view())?;

        let points = values
            .iter()
            .zip(flags)
            .enumerate()
            .map(|(i, (value, is_anomaly))| {
                let date = last_date
                    .checked_add_days(Days::new(i as u64 + 1))
                    .ok_or_else(|| Error::InvalidInput("forecast date out of range".to_string()))?;
                Ok(ForecastPoint {
                    date,
                    value: *value,
                    is_anomaly,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let forecast = ForecastSeries { mu, sigma, points };
        tracing::info!(
            horizon = forecast.len(),
            mu,
            sigma,
            future_anomalies = forecast.points.iter().filter(|p| p.is_anomaly).count(),
            "forecast generated"
        );

        Ok(forecast)
    }
}

impl Default for Forecaster {
    fn default() -> Self {
        Self::new(ForecastParams::default())
    }
}

/// 既定設定で予測（window = 30, contamination = 0.05）
pub fn forecast<R: Rng + ?Sized>(
    series: &AnalyzedSeries,
    horizon_days: usize,
    rng: &mut R,
) -> Result<ForecastSeries> {
    Forecaster::new(ForecastParams {
        horizon_days,
        ..ForecastParams::default()
    })
    .forecast(series, rng)
}

/// 末尾 `window` 点の移動平均・移動標準偏差の平均
///
/// Undefined rolling values are skipped. Without any defined rolling
/// statistic the raw tail values are used instead.
fn tail_statistics(series: &AnalyzedSeries, window: usize) -> (f64, f64) {
    let start = series.points.len().saturating_sub(window);
    let tail = &series.points[start..];

    let means: Vec<f64> = tail.iter().filter_map(|p| p.rolling_mean).collect();
    let stds: Vec<f64> = tail.iter().filter_map(|p| p.rolling_std).collect();
    let values: Vec<f64> = tail.iter().map(|p| p.value).collect();

    let mu = if means.is_empty() {
        tracing::warn!("no rolling mean in forecast tail; using raw values");
        values.iter().mean()
    } else {
        means.iter().mean()
    };

    let sigma = if !stds.is_empty() {
        stds.iter().mean()
    } else if values.len() >= 2 {
        values.iter().std_dev()
    } else {
        0.0
    };

    (mu, sigma)
}

fn draw<R: Rng + ?Sized>(mu: f64, sigma: f64, n: usize, rng: &mut R) -> Result<Vec<f64>> {
    if !mu.is_finite() {
        return Err(Error::InvalidInput(format!("non-finite forecast mean {}", mu)));
    }
    if !(sigma > 0.0) || !sigma.is_finite() {
        return Ok(vec![mu; n]);
    }

    let normal = Normal::new(mu, sigma).map_err(|e| Error::InvalidInput(e.to_string()))?;
    Ok((0..n).map(|_| normal.sample(&mut *rng)).collect())
}
