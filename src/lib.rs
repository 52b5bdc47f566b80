//! 防火墙日志分块并行解析库
//!
//! 把体量很大的、按行组织的防火墙日志（华为 / CheckPoint 两种语法）
//! 转换为每个变体一张的 TSV 表格，外加一份未解析行文件。
//!
//! ```no_run
//! use fwlog_parser::config::PipelineConfig;
//! use fwlog_parser::pipeline::FileParser;
//! use std::path::Path;
//!
//! let parser = FileParser::from_config(PipelineConfig::default())?;
//! let summary = parser.parse_file(Path::new("central.log"), None)?;
//! println!("{} 行，{} 条记录", summary.lines, summary.total_records());
//! # Ok::<(), fwlog_parser::error::FwlogError>(())
//! ```

// 核心模块 - 始终可用
pub mod concurrent;
pub mod config;
pub mod error;
pub mod fwlog;
pub mod pipeline;
pub mod utils;

// 日志初始化模块 - 需要 logging 功能
#[cfg(feature = "logging")]
pub mod logging;

pub use error::{FwlogError, Result};
