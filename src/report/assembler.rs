//! Report Assembly
//!
//! 解析結果をレスポンスにまとめる

use crate::analytics::anomaly::AnalyzedSeries;
use crate::analytics::prediction::ForecastSeries;
use crate::satellite::Recommendation;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 解析レポート
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// 描画済みチャート（JSON では base64 文字列）
    #[serde(rename = "ndvi_plot", with = "base64_bytes")]
    pub chart: Vec<u8>,
    /// 予測で異常と判定された日付（昇順）
    pub future_anomalies: Vec<NaiveDate>,
    pub recommendations: Vec<Recommendation>,
}

impl Report {
    /// チャートの base64 表現
    pub fn chart_base64(&self) -> String {
        STANDARD.encode(&self.chart)
    }
}

/// レポートを組み立てる
///
/// Only the forecast's anomaly dates are carried over; `series` is used for
/// logging the historical anomaly count.
pub fn assemble(
    series: &AnalyzedSeries,
    forecast: &ForecastSeries,
    chart: Vec<u8>,
    recommendations: Vec<Recommendation>,
) -> Report {
    let future_anomalies = forecast.anomaly_dates();
    tracing::info!(
        historical_anomalies = series.anomaly_count(),
        future_anomalies = future_anomalies.len(),
        recommendations = recommendations.len(),
        chart_bytes = chart.len(),
        "report assembled"
    );

    Report {
        chart,
        future_anomalies,
        recommendations,
    }
}

mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::prediction::ForecastPoint;

    fn forecast() -> ForecastSeries {
        let d = |day| NaiveDate::from_ymd_opt(2024, 7, day).unwrap();
        ForecastSeries {
            mu: 0.5,
            sigma: 0.05,
            points: vec![
                ForecastPoint {
                    date: d(1),
                    value: 0.5,
                    is_anomaly: false,
                },
                ForecastPoint {
                    date: d(2),
                    value: 0.7,
                    is_anomaly: true,
                },
                ForecastPoint {
                    date: d(3),
                    value: 0.2,
                    is_anomaly: true,
                },
            ],
        }
    }

    fn empty_series() -> AnalyzedSeries {
        AnalyzedSeries {
            window: 30,
            points: vec![],
        }
    }

    #[test]
    fn test_only_anomalous_dates_are_reported() {
        let report = assemble(&empty_series(), &forecast(), b"chart".to_vec(), vec![]);
        assert_eq!(
            report.future_anomalies,
            vec![
                NaiveDate::from_ymd_opt(2024, 7, 2).unwrap(),
                NaiveDate::from_ymd_opt(2024, 7, 3).unwrap()
            ]
        );
    }

    #[test]
    fn test_report_json_shape() {
        let report = assemble(&empty_series(), &forecast(), b"chart".to_vec(), vec![]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["ndvi_plot"], "Y2hhcnQ=");
        assert_eq!(json["future_anomalies"][0], "2024-07-02");
        assert!(json["recommendations"].as_array().unwrap().is_empty());

        let back: Report = serde_json::from_value(json).unwrap();
        assert_eq!(back, report);
    }
}
