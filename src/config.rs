use crate::analytics::anomaly::{DetectionParams, IsolationForest};
use crate::analytics::prediction::ForecastParams;
use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定ファイルの探索パス
const CONFIG_PATHS: [&str; 2] = ["agrisense.toml", "config/agrisense.toml"];

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AgriConfig {
    pub analysis: AnalysisConfig,
    pub satellite: SatelliteConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AnalysisConfig {
    pub window: usize,
    pub z_threshold: f64,
    pub contamination: f64,
    pub horizon_days: usize,
    /// 予測乱数のシード（未設定なら非決定的）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forecast_seed: Option<u64>,
    pub forest: ForestConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_samples: usize,
    pub random_state: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SatelliteConfig {
    /// "min_lon,min_lat,max_lon,max_lat"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_coords: Option<String>,
    pub history_years: u32,
    pub sample_points: usize,
    pub sample_seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub console_enabled: bool,
    pub file_enabled: bool,
    /// daily / hourly / never
    pub rotation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    /// text / json
    pub format: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: 30,
            z_threshold: 2.5,
            contamination: 0.05,
            horizon_days: 30,
            forecast_seed: None,
            forest: ForestConfig::default(),
        }
    }
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_samples: 256,
            random_state: 42,
        }
    }
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            default_coords: None,
            history_years: 3,
            sample_points: 10,
            sample_seed: 123,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or(NaiveDate::MIN),
            end_date: NaiveDate::from_ymd_opt(2023, 10, 1).unwrap_or(NaiveDate::MIN),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_enabled: true,
            file_enabled: false,
            rotation: "daily".to_string(),
            log_dir: None,
            format: "text".to_string(),
        }
    }
}

impl AnalysisConfig {
    pub fn detection_params(&self) -> DetectionParams {
        DetectionParams {
            window: self.window,
            z_threshold: self.z_threshold,
            contamination: self.contamination,
        }
    }

    pub fn forecast_params(&self) -> ForecastParams {
        ForecastParams {
            window: self.window,
            horizon_days: self.horizon_days,
            contamination: self.contamination,
        }
    }

    /// 設定に従った Isolation Forest
    pub fn isolation_forest(&self) -> IsolationForest {
        IsolationForest::new(self.contamination)
            .with_estimators(self.forest.n_estimators)
            .with_max_samples(self.forest.max_samples)
            .with_random_state(self.forest.random_state)
    }

    pub fn validate(&self) -> Result<()> {
        self.detection_params().validate()?;
        if self.horizon_days == 0 {
            return Err(Error::InvalidInput(
                "analysis.horizon_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl AgriConfig {
    /// 既定の探索パスから読み込み、環境変数で上書き
    pub fn load() -> Result<Self> {
        let path = CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists());
        Self::load_from(path)
    }

    /// 指定ファイル（任意）から読み込み、環境変数で上書き
    ///
    /// Environment variables use the `AGRISENSE_` prefix and `__` between
    /// nested keys, e.g. `AGRISENSE_ANALYSIS__WINDOW=14`.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        // デフォルト値を設定
        settings = settings.add_source(config::Config::try_from(&AgriConfig::default())?);

        if let Some(path) = path {
            tracing::debug!("設定ファイルを読み込み: {}", path.display());
            settings = settings.add_source(config::File::from(path));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("AGRISENSE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AgriConfig = settings.build()?.try_deserialize()?;
        config.analysis.validate()?;
        Ok(config)
    }

    /// サンプル設定ファイルを生成
    pub fn generate_sample_config(path: &Path) -> Result<()> {
        let mut sample = AgriConfig::default();
        sample.satellite.default_coords = Some("76.5,13.2,77.5,14.0".to_string());

        let toml_content = toml::to_string_pretty(&sample)
            .map_err(|e| Error::InvalidInput(format!("cannot serialize sample config: {}", e)))?;

        let sample_content = format!(
            r#"# agrisense configuration
#
# このファイルを agrisense.toml として保存してください
# 環境変数での上書きも可能です (例: AGRISENSE_ANALYSIS__WINDOW=14)

{}
# [analysis]
# window        = ローリング統計のウィンドウ（日）
# z_threshold   = Z-スコア閾値
# contamination = 想定外れ値比率 (0, 0.5]
# horizon_days  = 予測日数
# forecast_seed = 予測乱数のシード（省略時は毎回異なる予測）
#
# [satellite]
# default_coords = 既定領域 min_lon,min_lat,max_lon,max_lat
# history_years  = NDVI 履歴の取得年数
#
# [logging]
# format   = text / json
# rotation = daily / hourly / never
"#,
            toml_content
        );

        std::fs::write(path, sample_content)?;
        tracing::info!("サンプル設定ファイルを生成しました: {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = AgriConfig::default();
        assert_eq!(config.analysis.window, 30);
        assert_eq!(config.analysis.z_threshold, 2.5);
        assert_eq!(config.analysis.forest.random_state, 42);
        assert_eq!(config.satellite.sample_seed, 123);
        assert!(config.analysis.forecast_seed.is_none());
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agrisense.toml");
        std::fs::write(
            &path,
            "[analysis]\nwindow = 14\nforecast_seed = 7\n\n[logging]\nlevel = \"debug\"\n",
        )
        .unwrap();

        let config = AgriConfig::load_from(Some(&path)).unwrap();
        assert_eq!(config.analysis.window, 14);
        assert_eq!(config.analysis.forecast_seed, Some(7));
        assert_eq!(config.analysis.contamination, 0.05);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_invalid_contamination_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agrisense.toml");
        std::fs::write(&path, "[analysis]\ncontamination = 0.9\n").unwrap();

        assert!(AgriConfig::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_sample_config_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("agrisense.toml.example");
        AgriConfig::generate_sample_config(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let parsed: AgriConfig = toml::from_str(&content).unwrap();
        assert_eq!(
            parsed.satellite.default_coords.as_deref(),
            Some("76.5,13.2,77.5,14.0")
        );
    }
}
