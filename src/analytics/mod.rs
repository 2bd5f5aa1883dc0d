//! Analytics Module
//!
//! 時系列取り込み・異常検知・予測

pub mod anomaly;
pub mod prediction;
pub mod series;

pub use anomaly::{AnalyzedPoint, AnalyzedSeries, AnomalyDetector, DetectionParams, OutlierStrategy};
pub use prediction::{ForecastParams, ForecastPoint, ForecastSeries, Forecaster};
pub use series::{ingest, Observation, Series, SeriesPoint};
