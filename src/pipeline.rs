//! Satellite Analysis Pipeline
//!
//! 取得 → 整形 → 異常検知 → 予測 → ストレス分類 → 描画 → レポート

use crate::analytics::anomaly::{AnalyzedSeries, AnomalyDetector};
use crate::analytics::prediction::{ForecastSeries, Forecaster};
use crate::analytics::series::ingest;
use crate::config::{AnalysisConfig, SatelliteConfig};
use crate::error::Result;
use crate::report::{assemble, ChartRenderer, JsonChartRenderer, Report};
use crate::satellite::{
    classify_samples, sample_points, AreaOfInterest, DateRange, RasterProvider, Recommendation,
    RecommendationEngine, StressRecommendationEngine, TimeSeriesProvider,
};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// 解析リクエスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// "min_lon,min_lat,max_lon,max_lat"
    pub coords: Option<String>,
    /// ストレス分類の期間（省略時は設定値）
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    /// 基準日（NDVI 履歴はここから遡る）
    pub today: NaiveDate,
}

impl AnalysisRequest {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            coords: None,
            start_date: None,
            end_date: None,
            today,
        }
    }
}

/// 解析結果一式
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub area: AreaOfInterest,
    pub series: AnalyzedSeries,
    pub forecast: ForecastSeries,
    pub report: Report,
}

/// 衛星データ解析器
///
/// Holds no per-request state; every call to [`SatelliteAnalyzer::analyze`]
/// builds its own series and forecast.
pub struct SatelliteAnalyzer {
    analysis: AnalysisConfig,
    satellite: SatelliteConfig,
    series_provider: Box<dyn TimeSeriesProvider>,
    raster_provider: Option<Box<dyn RasterProvider>>,
    renderer: Box<dyn ChartRenderer>,
    engine: Box<dyn RecommendationEngine>,
}

impl SatelliteAnalyzer {
    pub fn new(
        analysis: AnalysisConfig,
        satellite: SatelliteConfig,
        series_provider: Box<dyn TimeSeriesProvider>,
    ) -> Self {
        Self {
            analysis,
            satellite,
            series_provider,
            raster_provider: None,
            renderer: Box::new(JsonChartRenderer::new()),
            engine: Box::new(StressRecommendationEngine),
        }
    }

    pub fn with_raster_provider(mut self, provider: Box<dyn RasterProvider>) -> Self {
        self.raster_provider = Some(provider);
        self
    }

    pub fn with_renderer(mut self, renderer: Box<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_recommendation_engine(mut self, engine: Box<dyn RecommendationEngine>) -> Self {
        self.engine = engine;
        self
    }

    /// 設定のシード（あれば）で解析
    ///
    /// Without `analysis.forecast_seed` the forecast draws from the thread
    /// RNG and differs between calls.
    pub fn analyze_default(&self, request: &AnalysisRequest) -> Result<Analysis> {
        match self.analysis.forecast_seed {
            Some(seed) => self.analyze(request, &mut StdRng::seed_from_u64(seed)),
            None => self.analyze(request, &mut rand::thread_rng()),
        }
    }

    /// 解析を実行
    pub fn analyze<R: Rng + ?Sized>(
        &self,
        request: &AnalysisRequest,
        rng: &mut R,
    ) -> Result<Analysis> {
        self.analysis.validate()?;

        let coords = request
            .coords
            .as_deref()
            .or(self.satellite.default_coords.as_deref());
        let area = AreaOfInterest::resolve(coords);
        let _span = tracing::info_span!("satellite_analysis", area = %area).entered();

        let history = DateRange::trailing_years(request.today, self.satellite.history_years);
        let observations = self.series_provider.fetch(&area, &history)?;
        if observations.is_empty() {
            tracing::warn!(start = %history.start, end = %history.end, "provider returned no observations");
        }

        let series = ingest(&observations)?;
        let detector = AnomalyDetector::with_strategy(
            self.analysis.detection_params(),
            Box::new(self.analysis.isolation_forest()),
        );
        let analyzed = detector.detect(&series)?;

        let forecaster = Forecaster::with_strategy(
            self.analysis.forecast_params(),
            Box::new(self.analysis.isolation_forest()),
        );
        let forecast = forecaster.forecast(&analyzed, rng)?;

        let recommendations = self.recommendations(&area, request)?;
        let chart = self.renderer.render(&analyzed, &forecast)?;
        tracing::debug!(
            content_type = self.renderer.content_type(),
            bytes = chart.len(),
            "chart rendered"
        );
        let report = assemble(&analyzed, &forecast, chart, recommendations);

        Ok(Analysis {
            area,
            series: analyzed,
            forecast,
            report,
        })
    }

    fn recommendations(
        &self,
        area: &AreaOfInterest,
        request: &AnalysisRequest,
    ) -> Result<Vec<Recommendation>> {
        let Some(raster) = &self.raster_provider else {
            tracing::debug!("no raster provider configured; skipping stress classification");
            return Ok(Vec::new());
        };

        let range = DateRange::new(
            request.start_date.unwrap_or(self.satellite.start_date),
            request.end_date.unwrap_or(self.satellite.end_date),
        )?;
        let points = sample_points(area, self.satellite.sample_points, self.satellite.sample_seed);
        let samples = raster.sample_bands(area, &range, &points)?;
        let stress = classify_samples(&samples);

        Ok(self.engine.recommend(&stress))
    }
}
