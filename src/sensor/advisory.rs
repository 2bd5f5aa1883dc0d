//! Irrigation & Fertilizer Advisory
//!
//! 学習済みモデル（ブラックボックス）による灌漑量・施肥量の推定

use super::simulator::{round_to, SensorReading};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 回帰モデル（predict のみ）
pub trait RegressionModel: Send + Sync {
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// 前処理パイプライン
pub trait FeaturePipeline: Send + Sync {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// 線形回帰モデル
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

impl RegressionModel for LinearModel {
    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_dimension("linear model", self.weights.len(), features.len())?;
        Ok(self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept)
    }
}

/// 標準化（(x - mean) / scale）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl FeaturePipeline for StandardScaler {
    fn transform(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_dimension("scaler mean", self.mean.len(), features.len())?;
        check_dimension("scaler scale", self.scale.len(), features.len())?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| if *s == 0.0 { x - m } else { (x - m) / s })
            .collect())
    }
}

fn check_dimension(what: &str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::Model(format!(
            "{} expects {} features, got {}",
            what, expected, actual
        )))
    }
}

/// センサー値に対するアドバイス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorAdvice {
    #[serde(flatten)]
    pub reading: SensorReading,
    #[serde(rename = "Water_Needed_liters_ha_day")]
    pub water_needed: f64,
    #[serde(rename = "Fertilizer_Needed_kg_ha")]
    pub fertilizer_needed: f64,
}

/// 灌漑・施肥アドバイザー
pub struct Advisor {
    pipeline: Box<dyn FeaturePipeline>,
    water_model: Box<dyn RegressionModel>,
    fertilizer_model: Box<dyn RegressionModel>,
}

impl Advisor {
    pub fn new(
        pipeline: Box<dyn FeaturePipeline>,
        water_model: Box<dyn RegressionModel>,
        fertilizer_model: Box<dyn RegressionModel>,
    ) -> Self {
        Self {
            pipeline,
            water_model,
            fertilizer_model,
        }
    }

    /// センサー値から必要水量・施肥量を推定（小数第2位で丸め）
    pub fn advise(&self, reading: SensorReading) -> Result<SensorAdvice> {
        let processed = self.pipeline.transform(&reading.features())?;
        let water_needed = round_to(self.water_model.predict(&processed)?, 2);
        let fertilizer_needed = round_to(self.fertilizer_model.predict(&processed)?, 2);

        tracing::debug!(water_needed, fertilizer_needed, "sensor advice computed");
        Ok(SensorAdvice {
            reading,
            water_needed,
            fertilizer_needed,
        })
    }
}

/// JSON で保存されたモデル一式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisoryModels {
    pub pipeline: StandardScaler,
    pub water: LinearModel,
    pub fertilizer: LinearModel,
}

impl AdvisoryModels {
    /// ファイルから読み込み
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn into_advisor(self) -> Advisor {
        Advisor::new(
            Box::new(self.pipeline),
            Box::new(self.water),
            Box::new(self.fertilizer),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading() -> SensorReading {
        SensorReading {
            year: 2004,
            month: 2,
            temperature_c: 21.0,
            rainfall_mm: 95.0,
            humidity_pct: 61.0,
            soil_moisture_pct: 70.0,
            ndvi_mean: 0.7,
            soil_ph: 6.3,
            soil_ec_ds_m: 0.3,
            timestamp: "2026-10-16 00:00:00".to_string(),
        }
    }

    fn identity_scaler() -> StandardScaler {
        StandardScaler {
            mean: vec![0.0; 9],
            scale: vec![1.0; 9],
        }
    }

    fn pick(index: usize, weight: f64, intercept: f64) -> LinearModel {
        let mut weights = vec![0.0; 9];
        weights[index] = weight;
        LinearModel { weights, intercept }
    }

    #[test]
    fn test_linear_model_dimension_mismatch() {
        let model = LinearModel {
            weights: vec![1.0, 2.0],
            intercept: 0.0,
        };
        assert!(matches!(model.predict(&[1.0]), Err(Error::Model(_))));
    }

    #[test]
    fn test_scaler_transform() {
        let scaler = StandardScaler {
            mean: vec![1.0, 2.0],
            scale: vec![2.0, 0.0],
        };
        assert_eq!(scaler.transform(&[3.0, 5.0]).unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_advice_is_rounded() {
        let advisor = AdvisoryModels {
            pipeline: identity_scaler(),
            // 降水量 × 1/3 + 10
            water: pick(3, 1.0 / 3.0, 10.0),
            fertilizer: pick(5, 0.5, 0.004),
        }
        .into_advisor();

        let advice = advisor.advise(reading()).unwrap();
        assert_eq!(advice.water_needed, 41.67);
        assert_eq!(advice.fertilizer_needed, 35.0);
    }

    #[test]
    fn test_advice_json_keeps_reading_fields() {
        let advisor = AdvisoryModels {
            pipeline: identity_scaler(),
            water: pick(0, 0.0, 1.0),
            fertilizer: pick(0, 0.0, 2.0),
        }
        .into_advisor();

        let json = serde_json::to_value(advisor.advise(reading()).unwrap()).unwrap();
        assert_eq!(json["Month"], 2);
        assert_eq!(json["Water_Needed_liters_ha_day"], 1.0);
        assert_eq!(json["Fertilizer_Needed_kg_ha"], 2.0);
    }
}
