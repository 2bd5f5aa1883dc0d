//! Anomaly Detection Module
//!
//! 異常検知システム

mod detector;
mod impute;
mod isolation;
mod rolling;
mod types;
mod zscore;

pub use detector::{combine_or, detect, AnomalyDetector};
pub use impute::impute_mean;
pub use isolation::{IsolationForest, OutlierStrategy};
pub use rolling::RollingStats;
pub use types::{AnalyzedPoint, AnalyzedSeries, DetectionParams};
pub use zscore::{ZScoreDetector, ZScoreResult};
