//! 日志初始化：按天滚动的文件日志 + stderr 告警
//!
//! stdout 留给播放进度输出，日志只进文件；warn 及以上额外打到 stderr。

use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

pub const DEFAULT_FILTER: &str = "warn,local_player=info";
const FILE_PREFIX: &str = "local-player";
const KEEP_LOG_FILES: usize = 7;

/// 持有非阻塞写入线程；drop 时把缓冲刷进文件
pub struct LogGuard(#[allow(dead_code)] Option<WorkerGuard>);

#[derive(Debug, Clone)]
pub struct LogConfig {
    /// 默认 `{data_dir}/logs`
    pub dir: Option<PathBuf>,
    /// 语法同 RUST_LOG；为空时读环境变量，再退回 [`DEFAULT_FILTER`]
    pub filter: Option<String>,
    /// stderr 输出的最低级别，`None` 关闭
    pub stderr: Option<LevelFilter>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            dir: None,
            filter: None,
            stderr: Some(LevelFilter::WARN),
        }
    }
}

pub fn init(data_dir: &Path, cfg: LogConfig) -> LogGuard {
    let log_dir = resolve_log_dir(data_dir, cfg.dir);

    let (file_layer, guard) = match file_appender(&log_dir) {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(true)
                .with_writer(writer);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("无法创建日志文件（{}）: {e}", log_dir.display());
            (None, None)
        }
    };

    let stderr_layer = cfg.stderr.map(|level| {
        fmt::layer()
            .with_target(false)
            .without_time()
            .with_writer(std::io::stderr)
            .with_filter(level)
    });

    let _ = tracing_subscriber::registry()
        .with(build_filter(cfg.filter))
        .with(file_layer)
        .with(stderr_layer)
        .try_init();
    tracing::info!(log_dir = %log_dir.display(), "日志已初始化");

    LogGuard(guard)
}

/// 创建日志目录；失败时退回系统临时目录
pub fn resolve_log_dir(data_dir: &Path, dir: Option<PathBuf>) -> PathBuf {
    let log_dir = dir.unwrap_or_else(|| data_dir.join("logs"));
    if fs::create_dir_all(&log_dir).is_ok() {
        return log_dir;
    }
    let fallback = std::env::temp_dir().join("local-player-logs");
    let _ = fs::create_dir_all(&fallback);
    fallback
}

fn build_filter(filter: Option<String>) -> EnvFilter {
    match filter {
        Some(s) if !s.trim().is_empty() => EnvFilter::new(s),
        _ => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

fn file_appender(log_dir: &Path) -> Result<RollingFileAppender, tracing_appender::rolling::InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(KEEP_LOG_FILES)
        .build(log_dir)
}
