use agrisense::logging::{init_logging, LogConfig};
use agrisense::satellite::{JsonFileProvider, JsonFileRasterProvider};
use agrisense::sensor::{AdvisoryModels, SensorSimulator, SimulationState};
use agrisense::{AgriConfig, AnalysisRequest, SatelliteAnalyzer};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "agrisense", version, about = "NDVI anomaly detection and farm advisory")]
struct Cli {
    /// 設定ファイル（省略時は agrisense.toml を探索）
    #[arg(short, long, global = true, env = "AGRISENSE_CONFIG")]
    config: Option<PathBuf>,

    /// ログレベル（設定ファイルより優先）
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// ログファイルの出力先（指定するとファイル出力を有効化）
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// NDVI 時系列を解析してレポートを出力
    Analyze {
        /// 観測値 JSON（[{"date": "YYYY-MM-DD", "value": 0.42}, ...]）
        #[arg(long)]
        observations: PathBuf,
        /// バンド標本 JSON（省略時はアドバイスなし）
        #[arg(long)]
        raster: Option<PathBuf>,
        /// min_lon,min_lat,max_lon,max_lat
        #[arg(long)]
        coords: Option<String>,
        #[arg(long)]
        start_date: Option<NaiveDate>,
        #[arg(long)]
        end_date: Option<NaiveDate>,
        /// 基準日（省略時は今日）
        #[arg(long)]
        today: Option<NaiveDate>,
        /// 予測日数
        #[arg(long)]
        horizon: Option<usize>,
        /// 予測乱数のシード
        #[arg(long)]
        seed: Option<u64>,
        /// レポートの出力先（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// センサー値をシミュレーションして JSON Lines で出力
    Simulate {
        #[arg(short, long, default_value_t = 12)]
        steps: usize,
        /// モデル JSON（pipeline / water / fertilizer）
        #[arg(long)]
        models: Option<PathBuf>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// サンプル設定ファイルを生成
    InitConfig {
        #[arg(default_value = "agrisense.toml.example")]
        path: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AgriConfig::load_from(Some(path.as_path())),
        None => AgriConfig::load(),
    }
    .context("failed to load configuration")?;

    let mut log_config = LogConfig::from_config(&config.logging);
    if let Some(level) = &cli.log_level {
        log_config = log_config.with_level(level.clone());
    }
    if let Some(dir) = &cli.log_dir {
        log_config = log_config.with_log_dir(dir.clone()).with_file(true);
    }
    let _guard = init_logging(&log_config)?;

    match cli.command {
        Command::Analyze {
            observations,
            raster,
            coords,
            start_date,
            end_date,
            today,
            horizon,
            seed,
            output,
        } => {
            let mut analysis = config.analysis.clone();
            if let Some(horizon) = horizon {
                analysis.horizon_days = horizon;
            }
            if seed.is_some() {
                analysis.forecast_seed = seed;
            }

            let mut analyzer = SatelliteAnalyzer::new(
                analysis,
                config.satellite.clone(),
                Box::new(JsonFileProvider::new(observations)),
            );
            if let Some(raster) = raster {
                analyzer = analyzer.with_raster_provider(Box::new(JsonFileRasterProvider::new(raster)));
            }

            let request = AnalysisRequest {
                coords,
                start_date,
                end_date,
                today: today.unwrap_or_else(|| Local::now().date_naive()),
            };
            let result = analyzer
                .analyze_default(&request)
                .context("error during satellite analysis")?;

            tracing::info!(
                days = result.series.len(),
                anomalies = result.series.anomaly_count(),
                future_anomalies = result.report.future_anomalies.len(),
                "analysis finished"
            );

            let json = serde_json::to_string_pretty(&result.report)?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("cannot write {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Command::Simulate {
            steps,
            models,
            seed,
        } => {
            let advisor = models
                .map(|path| {
                    AdvisoryModels::load(&path)
                        .with_context(|| format!("cannot load models from {}", path.display()))
                })
                .transpose()?
                .map(AdvisoryModels::into_advisor);

            let simulator = SensorSimulator::default();
            let mut state = SimulationState::default();
            let mut rng = StdRng::seed_from_u64(seed.unwrap_or_else(|| rand::thread_rng().next_u64()));

            for _ in 0..steps {
                let reading = simulator.step(&mut state, &mut rng, Local::now().naive_local())?;
                let line = match &advisor {
                    Some(advisor) => serde_json::to_string(&advisor.advise(reading)?)?,
                    None => serde_json::to_string(&reading)?,
                };
                println!("{}", line);
            }
        }
        Command::InitConfig { path } => {
            AgriConfig::generate_sample_config(&path)?;
            eprintln!("サンプル設定ファイルを生成しました: {}", path.display());
        }
    }

    Ok(())
}
