//! Area of Interest
//!
//! 解析対象領域と期間

use crate::error::{Error, Result};
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 既定領域（インド・カルナータカ州トゥムクル）
pub const DEFAULT_AREA: AreaOfInterest = AreaOfInterest {
    min_lon: 76.5,
    min_lat: 13.2,
    max_lon: 77.5,
    max_lat: 14.0,
};

/// 矩形の解析対象領域（経度・緯度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaOfInterest {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl AreaOfInterest {
    /// `"min_lon,min_lat,max_lon,max_lat"` を解析
    pub fn parse(coords: &str) -> Result<Self> {
        let parts = coords
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| Error::InvalidInput(format!("invalid coordinate '{}': {}", coords, e)))?;

        let [min_lon, min_lat, max_lon, max_lat] = parts[..] else {
            return Err(Error::InvalidInput(format!(
                "expected min_lon,min_lat,max_lon,max_lat, got {} values",
                parts.len()
            )));
        };

        if !(min_lon < max_lon && min_lat < max_lat) {
            return Err(Error::InvalidInput(format!(
                "empty or inverted bounding box: {}",
                coords
            )));
        }
        if min_lon < -180.0 || max_lon > 180.0 || min_lat < -90.0 || max_lat > 90.0 {
            return Err(Error::InvalidInput(format!(
                "bounding box outside WGS84 range: {}",
                coords
            )));
        }

        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// 入力があれば解析し、無い・不正なら既定領域を返す
    pub fn resolve(coords: Option<&str>) -> Self {
        match coords.map(str::trim).filter(|c| !c.is_empty()) {
            Some(coords) => Self::parse(coords).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to default area of interest");
                DEFAULT_AREA
            }),
            None => DEFAULT_AREA,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.min_lon..=self.max_lon).contains(&point.longitude)
            && (self.min_lat..=self.max_lat).contains(&point.latitude)
    }
}

impl Default for AreaOfInterest {
    fn default() -> Self {
        DEFAULT_AREA
    }
}

impl fmt::Display for AreaOfInterest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}

/// 地点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
}

/// 日付範囲（両端を含む）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(Error::InvalidInput(format!(
                "start date {} is after end date {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// `today` までの直近 `years` 年（1年 = 365日）
    pub fn trailing_years(today: NaiveDate, years: u32) -> Self {
        let start = today
            .checked_sub_days(Days::new(u64::from(years) * 365))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end: today }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        (self.start..=self.end).contains(&date)
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}
