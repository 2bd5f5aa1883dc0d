//! Stress Classification
//!
//! バンド反射率から作物ストレス・水ストレスを分類

use super::aoi::GeoPoint;
use super::provider::BandSample;
use serde::{Deserialize, Serialize};

/// 作物ストレス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CropStress {
    None,
    Moderate,
    Severe,
}

impl CropStress {
    /// NDVI と MSI の閾値で分類
    pub fn classify(ndvi: Option<f64>, msi: Option<f64>) -> Self {
        let (Some(ndvi), Some(msi)) = (ndvi, msi) else {
            return CropStress::None;
        };
        if ndvi < 0.5 && msi > 1.8 {
            CropStress::Severe
        } else if ndvi < 0.7 && msi > 1.0 {
            CropStress::Moderate
        } else {
            CropStress::None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CropStress::None => "none",
            CropStress::Moderate => "moderate",
            CropStress::Severe => "severe",
        }
    }
}

/// 植生・水分指標
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralIndices {
    /// (NIR - Red) / (NIR + Red)
    pub ndvi: Option<f64>,
    /// SWIR1 / NIR
    pub msi: Option<f64>,
    /// (Green - NIR) / (Green + NIR)
    pub ndwi: Option<f64>,
}

impl SpectralIndices {
    pub fn from_bands(sample: &BandSample) -> Self {
        Self {
            ndvi: normalized_difference(sample.nir, sample.red),
            msi: ratio(sample.swir1, sample.nir),
            ndwi: normalized_difference(sample.green, sample.nir),
        }
    }
}

/// 地点ごとの分類結果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressSample {
    pub point: GeoPoint,
    pub indices: SpectralIndices,
    pub crop_stress: CropStress,
    pub water_stress: bool,
}

impl StressSample {
    pub fn classify(sample: &BandSample) -> Self {
        let indices = SpectralIndices::from_bands(sample);
        Self {
            point: sample.point,
            indices,
            crop_stress: CropStress::classify(indices.ndvi, indices.msi),
            water_stress: indices.ndwi.is_some_and(|ndwi| ndwi < -0.1),
        }
    }
}

/// 全標本を分類
pub fn classify_samples(samples: &[BandSample]) -> Vec<StressSample> {
    let classified: Vec<StressSample> = samples.iter().map(StressSample::classify).collect();
    tracing::debug!(
        samples = classified.len(),
        crop_stressed = classified
            .iter()
            .filter(|s| s.crop_stress != CropStress::None)
            .count(),
        water_stressed = classified.iter().filter(|s| s.water_stress).count(),
        "stress classification complete"
    );
    classified
}

fn normalized_difference(a: f64, b: f64) -> Option<f64> {
    ratio(a - b, a + b)
}

fn ratio(num: f64, den: f64) -> Option<f64> {
    if den == 0.0 {
        None
    } else {
        Some(num / den).filter(|v| v.is_finite())
    }
}
