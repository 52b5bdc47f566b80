//! 分块并行解析流水线
//!
//! 阶段依次为：拆分 → 分块解析（并行）→ 表头聚合（屏障）→ 表格化（并行）
//! → 表格合并 → 未解析行合并。每个阶段结束时其 worker 全部 join 完毕，
//! 下一阶段才读取其产物。

pub mod artifact;
pub mod chunk_parser;
pub mod file_parser;
pub mod layout;
pub mod merger;
pub mod schema;
pub mod splitter;
pub mod tabularizer;

use crate::concurrent::{ParallelExecutor, TaskFailure, TaskResult};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::fwlog::VariantRegistry;
use tracing::Span;

// 重新导出主要类型和接口
pub use chunk_parser::{ChunkExtraction, ParsedChunk, classify_lines, parse_chunk};
pub use file_parser::{FileParser, RunSummary};
pub use layout::OutputLayout;
pub use merger::{merge_leftovers, merge_tables};
pub use schema::{CanonicalHeader, aggregate_headers, canonical_order};
pub use splitter::{ChunkFile, ChunkSpan, plan_chunks, split_file, write_chunk};
pub use tabularizer::{Table, read_table, render_table, tabularize_chunk};

/// 一次运行的上下文：配置、解析变体注册表以及日志 span
///
/// 构造一次，按引用传给每个阶段；worker 线程中重新进入同一个 span，
/// 使所有事件都归属于本次运行。
#[derive(Debug)]
pub struct PipelineContext {
    config: PipelineConfig,
    registry: VariantRegistry,
    span: Span,
}

impl PipelineContext {
    /// 校验配置并按配置中的变体列表构造注册表
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        let registry = VariantRegistry::from_names(config.variants.as_slice(), config.fallback_year)?;
        Ok(Self::with_registry(config, registry))
    }

    /// 使用自定义注册表构造（忽略配置中的变体列表）
    pub fn with_registry(config: PipelineConfig, registry: VariantRegistry) -> Self {
        let span = tracing::info_span!("fwlog", variants = ?registry.names());
        Self { config, registry, span }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// 为某个阶段创建并行执行器
    pub fn executor(&self, stage: &str) -> ParallelExecutor {
        ParallelExecutor::from_config(stage, &self.config).with_span(self.span.clone())
    }
}

/// 拆分结果槽为成功值和失败信息
pub(crate) fn split_outcomes<T>(results: Vec<TaskResult<T>>) -> (Vec<T>, Vec<TaskFailure>) {
    let mut values = Vec::with_capacity(results.len());
    let mut failures = Vec::new();
    for result in results {
        match result.outcome {
            Ok(value) => values.push(value),
            Err(failure) => failures.push(failure),
        }
    }
    (values, failures)
}
