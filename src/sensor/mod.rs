//! Sensor Module
//!
//! IoT センサーのシミュレーションと営農アドバイス

pub mod advisory;
pub mod simulator;

pub use advisory::{
    AdvisoryModels, Advisor, FeaturePipeline, LinearModel, RegressionModel, SensorAdvice,
    StandardScaler,
};
pub use simulator::{ClimateTrend, SensorReading, SensorSimulator, SimulationState};
