//! Satellite Module
//!
//! 衛星データの取得・ストレス分類・アドバイス生成

pub mod aoi;
pub mod provider;
pub mod recommend;
pub mod stress;

pub use aoi::{AreaOfInterest, DateRange, GeoPoint, DEFAULT_AREA};
pub use provider::{
    sample_points, BandSample, InMemoryProvider, InMemoryRasterProvider, JsonFileProvider,
    JsonFileRasterProvider, RasterProvider, TimeSeriesProvider,
};
pub use recommend::{Recommendation, RecommendationEngine, StressRecommendationEngine};
pub use stress::{classify_samples, CropStress, SpectralIndices, StressSample};
