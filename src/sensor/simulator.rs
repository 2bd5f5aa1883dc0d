//! Sensor Simulator
//!
//! 気候トレンドを持つ IoT センサー値のシミュレーション

use crate::error::{Error, Result};
use chrono::NaiveDateTime;
use rand::distributions::Distribution;
use rand::Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::Normal;

/// シミュレーション状態（年・月）
///
/// Owned by the caller and threaded through [`SensorSimulator::step`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    pub year: i32,
    pub month: u32,
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            year: 2004,
            month: 1,
        }
    }
}

impl SimulationState {
    /// 1か月進める（12月の次は翌年1月）
    pub fn advance(&mut self) {
        self.month += 1;
        if self.month > 12 {
            self.month = 1;
            self.year += 1;
        }
    }
}

/// 気候トレンド
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClimateTrend {
    /// 基準年
    pub base_year: i32,
    /// 年あたりの気温上昇（℃）
    pub temp_increase_per_year: f64,
    /// 年あたりの降水量係数
    pub rainfall_variability: f64,
}

impl Default for ClimateTrend {
    fn default() -> Self {
        Self {
            base_year: 2004,
            temp_increase_per_year: 0.02,
            rainfall_variability: 0.97,
        }
    }
}

/// センサー値
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Month")]
    pub month: u32,
    #[serde(rename = "Temperature_C")]
    pub temperature_c: f64,
    #[serde(rename = "Rainfall_mm")]
    pub rainfall_mm: f64,
    #[serde(rename = "Humidity_pct")]
    pub humidity_pct: f64,
    #[serde(rename = "Soil_Moisture_pct")]
    pub soil_moisture_pct: f64,
    #[serde(rename = "NDVI_Mean")]
    pub ndvi_mean: f64,
    #[serde(rename = "Soil_pH")]
    pub soil_ph: f64,
    #[serde(rename = "Soil_EC_dS_m")]
    pub soil_ec_ds_m: f64,
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

impl SensorReading {
    /// モデル入力の特徴量ベクトル
    pub fn features(&self) -> [f64; 9] {
        [
            f64::from(self.year),
            f64::from(self.month),
            self.temperature_c,
            self.rainfall_mm,
            self.humidity_pct,
            self.soil_moisture_pct,
            self.ndvi_mean,
            self.soil_ph,
            self.soil_ec_ds_m,
        ]
    }
}

/// センサーシミュレーター
#[derive(Debug, Clone, Default)]
pub struct SensorSimulator {
    trend: ClimateTrend,
}

impl SensorSimulator {
    pub fn new(trend: ClimateTrend) -> Self {
        Self { trend }
    }

    /// 1ステップ分のセンサー値を生成し、状態を1か月進める
    pub fn step<R: Rng + ?Sized>(
        &self,
        state: &mut SimulationState,
        rng: &mut R,
        now: NaiveDateTime,
    ) -> Result<SensorReading> {
        let elapsed = f64::from(state.year - self.trend.base_year);

        let temperature = draw(rng, 20.0 + elapsed * self.trend.temp_increase_per_year, 3.0)?;
        let rainfall = draw(
            rng,
            100.0 * self.trend.rainfall_variability.powf(elapsed),
            30.0,
        )?;
        let humidity = draw(rng, 60.0, 10.0)?;
        let soil_moisture =
            draw(rng, 50.0 + 0.3 * rainfall - 0.1 * temperature, 10.0)?.clamp(10.0, 90.0);
        let ndvi = draw(rng, 0.4 + 0.005 * soil_moisture - 0.002 * temperature, 0.1)?.clamp(0.0, 1.0);
        let soil_ph =
            draw(rng, 6.5 - 0.02 * rainfall + 0.01 * soil_moisture, 0.2)?.clamp(5.5, 7.5);
        let soil_ec =
            draw(rng, 0.5 + 0.01 * temperature - 0.02 * soil_moisture, 0.1)?.clamp(0.1, 1.5);

        state.advance();

        Ok(SensorReading {
            year: state.year,
            month: state.month,
            temperature_c: round_to(temperature, 2),
            rainfall_mm: round_to(rainfall, 2),
            humidity_pct: round_to(humidity, 2),
            soil_moisture_pct: round_to(soil_moisture, 2),
            ndvi_mean: round_to(ndvi, 4),
            soil_ph: round_to(soil_ph, 2),
            soil_ec_ds_m: round_to(soil_ec, 2),
            timestamp: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        })
    }
}

fn draw<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> Result<f64> {
    let normal = Normal::new(mean, std_dev).map_err(|e| Error::InvalidInput(e.to_string()))?;
    Ok(normal.sample(rng))
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
