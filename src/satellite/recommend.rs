//! Recommendation Engine
//!
//! ストレス分類から営農アドバイスを生成

use super::stress::{CropStress, StressSample};
use serde::{Deserialize, Serialize};

/// 地点ごとのアドバイス
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    pub recommendation: String,
}

/// アドバイス生成インターフェース
pub trait RecommendationEngine: Send + Sync {
    fn recommend(&self, samples: &[StressSample]) -> Vec<Recommendation>;
}

/// 閾値分類に基づく既定エンジン
#[derive(Debug, Clone, Default)]
pub struct StressRecommendationEngine;

impl RecommendationEngine for StressRecommendationEngine {
    fn recommend(&self, samples: &[StressSample]) -> Vec<Recommendation> {
        let mut out = Vec::new();
        for sample in samples {
            let (lat, lon) = (sample.point.latitude, sample.point.longitude);

            if sample.crop_stress != CropStress::None {
                out.push(Recommendation {
                    kind: format!("Crop Stress ({})", sample.crop_stress.label()),
                    latitude: lat,
                    longitude: lon,
                    recommendation: "Apply irrigation and fertilizers to improve crop health."
                        .to_string(),
                });
            }

            if sample.water_stress {
                out.push(Recommendation {
                    kind: "Water Stress".to_string(),
                    latitude: lat,
                    longitude: lon,
                    recommendation: "Increase irrigation and monitor soil moisture levels."
                        .to_string(),
                });
            }
        }
        out
    }
}
