//! 日志初始化和配置模块
//!
//! 这个模块提供了统一的日志初始化功能，使用 tracing 库。
//! 输出到控制台（可关闭）和日志目录，日志文件按天滚动。
//!
//! 库代码本身只通过 `tracing` 宏发出事件，不依赖这里的初始化；
//! 解析流水线通过 [`crate::pipeline::PipelineContext`] 携带的 span 把 worker
//! 线程中的事件归属到同一次运行。

use crate::config::LogConfig;
use std::io;
use std::sync::Once;
use tracing_subscriber::{
    EnvFilter, Registry,
    fmt::{self, time::SystemTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// 日志初始化只执行一次
static INIT_LOGGER: Once = Once::new();

#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("IO错误: {0}")]
    Io(#[from] io::Error),
    #[error("日志配置错误: {0}")]
    Config(String),
}

/// 日志初始化结果
pub type LogResult<T> = Result<T, LogError>;

/// 初始化日志系统
///
/// - 控制台输出（`enable_stdout` 为 false 时关闭）
/// - `log_dir` 目录下按天滚动的 `fwlog.*` 文件
/// - 级别取自配置，`RUST_LOG` 环境变量优先
///
/// 重复调用是安全的，只有第一次调用生效。
///
/// # Examples
///
/// ```no_run
/// use fwlog_parser::config::LogConfig;
/// use fwlog_parser::logging::init_logging;
///
/// init_logging(&LogConfig::default()).unwrap();
/// ```
pub fn init_logging(config: &LogConfig) -> LogResult<()> {
    let mut outcome = Ok(());
    INIT_LOGGER.call_once(|| {
        outcome = install(config);
    });
    outcome
}

fn install(config: &LogConfig) -> LogResult<()> {
    if config.log_dir.trim().is_empty() {
        return Err(LogError::Config("日志目录不能为空".to_string()));
    }
    std::fs::create_dir_all(&config.log_dir)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.level));

    let console_layer = config.enable_stdout.then(|| {
        fmt::layer()
            .with_timer(SystemTime)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_ansi(true)
    });

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "fwlog");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_timer(SystemTime)
        .with_target(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_ansi(false);

    // 已被其他订阅者初始化时视为成功
    if Registry::default()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .is_ok()
    {
        // appender 需要存活到进程结束
        std::mem::forget(guard);
        tracing::info!(
            "日志系统初始化完成 - 级别: {}, 目录: {}",
            config.level,
            config.log_dir
        );
    }
    Ok(())
}

/// 使用默认配置初始化日志系统
pub fn init_default_logging() -> LogResult<()> {
    init_logging(&LogConfig::default())
}
