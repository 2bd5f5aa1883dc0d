//! Series Module
//!
//! 観測値の取り込みと日次時系列

mod ingest;
mod types;

pub use ingest::ingest;
pub use types::{Observation, Series, SeriesPoint};
