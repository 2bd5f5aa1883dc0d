//! Chart Rendering
//!
//! 解析結果をチャートとして出力するインターフェース

use crate::analytics::anomaly::AnalyzedSeries;
use crate::analytics::prediction::ForecastSeries;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// チャート描画インターフェース
///
/// The output is opaque to the core (an encoded image, a JSON document, ...).
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &AnalyzedSeries, forecast: &ForecastSeries) -> Result<Vec<u8>>;

    /// 出力の MIME タイプ
    fn content_type(&self) -> &'static str;
}

/// 描画スタイル
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceStyle {
    Line,
    DashedLine,
    Scatter,
}

/// チャートの1系列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartTrace {
    pub label: String,
    pub color: String,
    pub style: TraceStyle,
    pub points: Vec<(NaiveDate, f64)>,
}

/// チャート文書
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartDocument {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub traces: Vec<ChartTrace>,
}

impl ChartDocument {
    /// 履歴・異常・予測・将来異常の4系列を組み立てる
    pub fn build(series: &AnalyzedSeries, forecast: &ForecastSeries) -> Self {
        let mut traces = vec![
            trace(
                "NDVI",
                "green",
                TraceStyle::Line,
                series.points.iter().map(|p| (p.date, p.value)).collect(),
            ),
            trace(
                "Anomalies",
                "red",
                TraceStyle::Scatter,
                series.anomalies().map(|p| (p.date, p.value)).collect(),
            ),
        ];

        if !forecast.is_empty() {
            traces.push(trace(
                "Future NDVI",
                "blue",
                TraceStyle::DashedLine,
                forecast.points.iter().map(|p| (p.date, p.value)).collect(),
            ));
            traces.push(trace(
                "Future Anomalies",
                "orange",
                TraceStyle::Scatter,
                forecast
                    .points
                    .iter()
                    .filter(|p| p.is_anomaly)
                    .map(|p| (p.date, p.value))
                    .collect(),
            ));
        }

        Self {
            title: "NDVI Time Series with Anomalies".to_string(),
            x_label: "Date".to_string(),
            y_label: "NDVI".to_string(),
            traces,
        }
    }
}

fn trace(label: &str, color: &str, style: TraceStyle, points: Vec<(NaiveDate, f64)>) -> ChartTrace {
    ChartTrace {
        label: label.to_string(),
        color: color.to_string(),
        style,
        points,
    }
}

/// JSON チャート文書を出力するレンダラー
#[derive(Debug, Clone, Default)]
pub struct JsonChartRenderer;

impl JsonChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartRenderer for JsonChartRenderer {
    fn render(&self, series: &AnalyzedSeries, forecast: &ForecastSeries) -> Result<Vec<u8>> {
        let doc = ChartDocument::build(series, forecast);
        serde_json::to_vec(&doc).map_err(|e| Error::Render(e.to_string()))
    }

    fn content_type(&self) -> &'static str {
        "application/json"
    }
}
