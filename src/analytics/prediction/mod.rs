//! Prediction Analytics Module
//!
//! 短期予測と将来異常の推定

mod forecaster;
mod types;

pub use forecaster::{forecast, Forecaster};
pub use types::{ForecastParams, ForecastPoint, ForecastSeries};
