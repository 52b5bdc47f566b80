//! 配置管理模块
//!
//! 提供统一的配置文件读取和管理功能

use crate::concurrent::FailurePolicy;
use crate::error::{FwlogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 默认分块大小（约 1 GB）
pub const DEFAULT_CHUNK_SIZE: u64 = 1_000_000_000;

/// 日志格式中缺失年份时使用的默认年份
pub const DEFAULT_FALLBACK_YEAR: i32 = 2020;

/// 主配置结构体
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 解析流水线配置
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// 是否启用控制台输出
    pub enable_stdout: bool,
    /// 日志输出目录
    pub log_dir: String,
    /// 日志级别 (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enable_stdout: true,
            log_dir: "logs".to_string(),
            level: "info".to_string(),
        }
    }
}

/// 解析流水线配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// 分块目标字节数（向后对齐到行尾）
    pub chunk_size: u64,
    /// 外层并发 worker 数
    pub max_workers: usize,
    /// 每个 worker 内部的线程数
    pub max_threads: usize,
    /// 是否保留中间产物目录
    pub preserve_intermediate: bool,
    /// 任务失败策略
    pub failure_policy: FailurePolicy,
    /// 日志缺失年份时使用的年份
    pub fallback_year: i32,
    /// 解析变体优先级列表（按顺序尝试）
    pub variants: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_workers: default_max_workers(),
            max_threads: 1,
            preserve_intermediate: false,
            failure_policy: FailurePolicy::FailFast,
            fallback_year: DEFAULT_FALLBACK_YEAR,
            variants: vec!["hw".to_string(), "cp".to_string()],
        }
    }
}

/// 默认 worker 数：逻辑 CPU 数减一，至少为 1
pub fn default_max_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get().saturating_sub(1))
        .unwrap_or(1)
        .max(1)
}

impl PipelineConfig {
    /// 验证流水线配置
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(FwlogError::config_error("分块大小不能为0"));
        }
        if self.max_workers == 0 {
            return Err(FwlogError::config_error("worker 数不能为0"));
        }
        if self.max_threads == 0 {
            return Err(FwlogError::config_error("每个 worker 的线程数不能为0"));
        }
        if !(1..=9999).contains(&self.fallback_year) {
            return Err(FwlogError::config_error(format!(
                "无效的默认年份: {}",
                self.fallback_year
            )));
        }
        if self.variants.is_empty() {
            return Err(FwlogError::config_error("至少需要一个解析变体"));
        }
        Ok(())
    }
}

impl Config {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// 从字符串加载配置
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置的有效性
    pub fn validate(&self) -> Result<()> {
        match self.log.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(FwlogError::config_error(format!(
                    "无效的日志级别: {}",
                    self.log.level
                )));
            }
        }

        self.pipeline.validate()
    }
}
