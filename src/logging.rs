use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::registry::Registry;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// ログファイル名
const LOG_FILE_NAME: &str = "agrisense.log";

/// ログ設定
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル (trace, debug, info, warn, error) または EnvFilter 書式
    pub level: String,
    /// ログディレクトリ
    pub log_dir: PathBuf,
    /// ファイルローテーション設定
    pub rotation: LogRotation,
    /// コンソール出力有効（stderr）
    pub console_enabled: bool,
    /// ファイル出力有効
    pub file_enabled: bool,
    /// 出力形式
    pub format: LogFormat,
}

/// ログ出力形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 人間向けテキスト
    Text,
    /// 1行1イベントの JSON
    Json,
}

impl LogFormat {
    /// 設定文字列から解析（不明な値はテキスト）
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogRotation {
    /// 日次ローテーション
    Daily,
    /// 時間毎ローテーション
    Hourly,
    /// ローテーションなし
    Never,
}

impl LogRotation {
    /// 設定文字列から解析（不明な値は日次）
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "hourly" => LogRotation::Hourly,
            "never" => LogRotation::Never,
            _ => LogRotation::Daily,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            rotation: LogRotation::Daily,
            console_enabled: true,
            file_enabled: false,
            format: LogFormat::Text,
        }
    }
}

impl LogConfig {
    /// 設定からログ設定を作成
    pub fn from_config(config: &crate::config::LoggingConfig) -> Self {
        Self {
            level: config.level.clone(),
            log_dir: config.log_dir.clone().unwrap_or_else(get_default_log_dir),
            rotation: LogRotation::parse(&config.rotation),
            console_enabled: config.console_enabled,
            file_enabled: config.file_enabled,
            format: LogFormat::parse(&config.format),
        }
    }

    /// ログレベルを上書き
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// カスタムログディレクトリを設定
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.log_dir = dir.into();
        self
    }

    /// ファイル出力制御
    pub fn with_file(mut self, enabled: bool) -> Self {
        self.file_enabled = enabled;
        self
    }
}

/// デフォルトログディレクトリを取得
/// 優先順位：
/// 1. カレントディレクトリの logs フォルダ
/// 2. システムテンプディレクトリの agrisense フォルダ
fn get_default_log_dir() -> PathBuf {
    let current_log_dir = PathBuf::from("logs");
    if ensure_log_dir(&current_log_dir).is_ok() {
        return current_log_dir;
    }

    std::env::temp_dir().join("agrisense").join("logs")
}

/// ログディレクトリを確保
fn ensure_log_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 書式付きレイヤーを作成
///
/// ANSI colouring is only enabled for terminal output; file layers must pass
/// `ansi = false`.
fn format_layer<W>(writer: W, format: LogFormat, ansi: bool) -> BoxedLayer
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(ansi)
        .with_target(true);
    match format {
        LogFormat::Text => layer.boxed(),
        LogFormat::Json => layer.json().boxed(),
    }
}

/// ログシステムを初期化
///
/// The returned guard flushes the file writer on drop and must be held for
/// the lifetime of the process.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let env_filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut guard = None;

    if config.console_enabled {
        layers.push(format_layer(std::io::stderr, config.format, true));
    }

    if config.file_enabled {
        ensure_log_dir(&config.log_dir)?;
        let file_appender = match config.rotation {
            LogRotation::Daily => rolling::daily(&config.log_dir, LOG_FILE_NAME),
            LogRotation::Hourly => rolling::hourly(&config.log_dir, LOG_FILE_NAME),
            LogRotation::Never => rolling::never(&config.log_dir, LOG_FILE_NAME),
        };
        let (file_writer, file_guard) = non_blocking(file_appender);
        layers.push(format_layer(file_writer, config.format, false));
        guard = Some(file_guard);
    }

    if layers.is_empty() {
        // 最低限のコンソール出力
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| anyhow::anyhow!(e))?;
        return Ok(None);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(env_filter)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;

    tracing::debug!(
        level = %config.level,
        console = config.console_enabled,
        file = config.file_enabled,
        format = ?config.format,
        log_dir = %config.log_dir.display(),
        "ログシステム初期化完了"
    );

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    #[test]
    fn test_log_config_default() {
        let config = LogConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.console_enabled);
        assert!(!config.file_enabled);
    }

    #[test]
    fn test_log_config_from_config() {
        let logging = crate::config::LoggingConfig {
            level: "debug".to_string(),
            console_enabled: false,
            file_enabled: true,
            rotation: "hourly".to_string(),
            log_dir: Some(PathBuf::from("/var/log/agrisense")),
            format: "JSON".to_string(),
        };

        let log_config = LogConfig::from_config(&logging);
        assert_eq!(log_config.level, "debug");
        assert_eq!(log_config.rotation, LogRotation::Hourly);
        assert_eq!(log_config.log_dir, PathBuf::from("/var/log/agrisense"));
        assert_eq!(log_config.format, LogFormat::Json);
    }

    #[test]
    fn test_rotation_parse() {
        assert_eq!(LogRotation::parse("NEVER"), LogRotation::Never);
        assert_eq!(LogRotation::parse("weekly"), LogRotation::Daily);
    }

    #[test]
    fn test_builder_overrides() {
        let config = LogConfig::default()
            .with_level("trace")
            .with_log_dir("/tmp/agrisense-logs")
            .with_file(true);

        assert_eq!(config.level, "trace");
        assert_eq!(config.log_dir, PathBuf::from("/tmp/agrisense-logs"));
        assert!(config.file_enabled);
    }

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn capture(format: LogFormat, ansi: bool) -> String {
        let sink = Capture::default();
        let writer = sink.clone();
        let layer = format_layer(move || writer.clone(), format, ansi);

        let subscriber = tracing_subscriber::registry().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(days = 90, "series ingested");
        });

        let bytes = sink.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_file_layer_has_no_ansi_escapes() {
        let output = capture(LogFormat::Text, false);
        assert!(output.contains("series ingested"));
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_console_layer_keeps_colours() {
        let output = capture(LogFormat::Text, true);
        assert!(output.contains('\u{1b}'));
    }

    #[test]
    fn test_json_format_emits_json_lines() {
        let output = capture(LogFormat::Json, false);
        let line = output.lines().next().unwrap();
        let value: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["fields"]["message"], "series ingested");
        assert_eq!(value["fields"]["days"], 90);
    }

    #[test]
    fn test_ensure_log_dir() {
        let temp_dir = tempdir().unwrap();
        let log_dir = temp_dir.path().join("test_logs");

        assert!(ensure_log_dir(&log_dir).is_ok());
        assert!(log_dir.exists());
    }
}
