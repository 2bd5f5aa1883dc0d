//! # agrisense
//!
//! Agronomic analysis core: NDVI time-series ingestion, anomaly detection and
//! short-horizon forecasting, plus satellite stress classification and
//! sensor-driven irrigation/fertilizer advice.
//!
//! Every analysis call is synchronous and self-contained; collaborators
//! (data providers, chart renderers, trained models) are plugged in through
//! traits.

pub mod analytics;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod report;
pub mod satellite;
pub mod sensor;

pub use analytics::{
    ingest, AnalyzedSeries, AnomalyDetector, DetectionParams, ForecastSeries, Forecaster,
    Observation, Series,
};
pub use config::AgriConfig;
pub use error::{Error, Result};
pub use pipeline::{Analysis, AnalysisRequest, SatelliteAnalyzer};
pub use report::Report;
