//! Satellite Data Providers
//!
//! 衛星データ取得インターフェースと実装

use super::aoi::{AreaOfInterest, DateRange, GeoPoint};
use crate::analytics::series::Observation;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 植生指標の時系列を提供する
///
/// May return an empty sequence; callers decide how to treat that.
pub trait TimeSeriesProvider: Send + Sync {
    fn fetch(&self, area: &AreaOfInterest, range: &DateRange) -> Result<Vec<Observation>>;
}

/// 地点ごとのバンド反射率を提供する
pub trait RasterProvider: Send + Sync {
    fn sample_bands(
        &self,
        area: &AreaOfInterest,
        range: &DateRange,
        points: &[GeoPoint],
    ) -> Result<Vec<BandSample>>;
}

/// 地点のバンド反射率（Sentinel-2 B3/B4/B8/B11）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandSample {
    pub point: GeoPoint,
    /// B3
    pub green: f64,
    /// B4
    pub red: f64,
    /// B8
    pub nir: f64,
    /// B11
    pub swir1: f64,
}

/// 領域内のランダム地点を生成（シード固定で再現可能）
pub fn sample_points(area: &AreaOfInterest, count: usize, seed: u64) -> Vec<GeoPoint> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| GeoPoint {
            longitude: rng.gen_range(area.min_lon..=area.max_lon),
            latitude: rng.gen_range(area.min_lat..=area.max_lat),
        })
        .collect()
}

/// メモリ上の観測値を返すプロバイダー
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    observations: Vec<Observation>,
}

impl InMemoryProvider {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }
}

impl TimeSeriesProvider for InMemoryProvider {
    fn fetch(&self, _area: &AreaOfInterest, range: &DateRange) -> Result<Vec<Observation>> {
        Ok(self
            .observations
            .iter()
            .filter(|o| range.contains(o.date))
            .copied()
            .collect())
    }
}

/// JSON ファイル（`[{"date": "YYYY-MM-DD", "value": 0.42}, ...]`）から読み込むプロバイダー
#[derive(Debug, Clone)]
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl TimeSeriesProvider for JsonFileProvider {
    fn fetch(&self, area: &AreaOfInterest, range: &DateRange) -> Result<Vec<Observation>> {
        let observations: Vec<Observation> = read_json(&self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            count = observations.len(),
            "observations loaded"
        );
        InMemoryProvider::new(observations).fetch(area, range)
    }
}

/// メモリ上のバンド標本を返すプロバイダー
///
/// Requested points are ignored; every stored sample inside the area is returned.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRasterProvider {
    samples: Vec<BandSample>,
}

impl InMemoryRasterProvider {
    pub fn new(samples: Vec<BandSample>) -> Self {
        Self { samples }
    }
}

impl RasterProvider for InMemoryRasterProvider {
    fn sample_bands(
        &self,
        area: &AreaOfInterest,
        range: &DateRange,
        _points: &[GeoPoint],
    ) -> Result<Vec<BandSample>> {
        let samples: Vec<BandSample> = self
            .samples
            .iter()
            .filter(|s| area.contains(&s.point))
            .copied()
            .collect();

        if samples.is_empty() {
            return Err(Error::Provider(format!(
                "no imagery found for area {} between {} and {}",
                area, range.start, range.end
            )));
        }
        Ok(samples)
    }
}

/// JSON ファイルからバンド標本を読み込むプロバイダー
#[derive(Debug, Clone)]
pub struct JsonFileRasterProvider {
    path: PathBuf,
}

impl JsonFileRasterProvider {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl RasterProvider for JsonFileRasterProvider {
    fn sample_bands(
        &self,
        area: &AreaOfInterest,
        range: &DateRange,
        points: &[GeoPoint],
    ) -> Result<Vec<BandSample>> {
        let samples: Vec<BandSample> = read_json(&self.path)?;
        InMemoryRasterProvider::new(samples).sample_bands(area, range, points)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Provider(format!("cannot read {}: {}", path.display(), e)))?;
    serde_json::from_str(&content)
        .map_err(|e| Error::Provider(format!("malformed data in {}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    #[test]
    fn test_sample_points_are_inside_area_and_seeded() {
        let area = AreaOfInterest::default();
        let a = sample_points(&area, 10, 123);
        let b = sample_points(&area, 10, 123);

        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
        assert!(a.iter().all(|p| area.contains(p)));
    }

    #[test]
    fn test_in_memory_provider_filters_range() {
        let provider = InMemoryProvider::new(vec![
            Observation::new(date(1, 1), 0.3),
            Observation::new(date(2, 1), 0.4),
            Observation::new(date(3, 1), 0.5),
        ]);
        let range = DateRange::new(date(1, 15), date(3, 1)).unwrap();

        let obs = provider.fetch(&AreaOfInterest::default(), &range).unwrap();
        assert_eq!(obs.len(), 2);
        assert_eq!(obs[0].date, date(2, 1));
    }

    #[test]
    fn test_empty_raster_is_provider_error() {
        let provider = InMemoryRasterProvider::default();
        let range = DateRange::new(date(1, 1), date(2, 1)).unwrap();
        let result = provider.sample_bands(&AreaOfInterest::default(), &range, &[]);
        assert!(matches!(result, Err(Error::Provider(_))));
    }

    #[test]
    fn test_missing_file_is_provider_error() {
        let provider = JsonFileProvider::new("/nonexistent/ndvi.json");
        let range = DateRange::new(date(1, 1), date(2, 1)).unwrap();
        let result = provider.fetch(&AreaOfInterest::default(), &range);
        assert!(matches!(result, Err(Error::Provider(_))));
    }
}
