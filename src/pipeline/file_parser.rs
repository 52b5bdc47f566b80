//! 文件解析主流程
//!
//! 1. 拆分源文件为分块
//! 2. 并行解析分块，写出记录 / 字段名 / 未解析行
//! 3. 聚合每个变体的表头
//! 4. 并行把记录渲染为分块表格
//! 5. 按分块顺序合并表格
//! 6. 按分块顺序合并未解析行

use super::chunk_parser::{ParsedChunk, parse_chunk};
use super::layout::OutputLayout;
use super::merger::{merge_leftovers, merge_tables};
use super::schema::aggregate_headers;
use super::splitter::split_file;
use super::tabularizer::tabularize_chunk;
use super::{PipelineContext, split_outcomes};
use crate::concurrent::{TaskFailure, TaskResult};
use crate::config::PipelineConfig;
use crate::error::{FwlogError, Result};
use crate::utils::format_wall_time;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// 一次运行的统计信息
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub output_dir: PathBuf,
    /// 规划并成功拆分的分块数
    pub chunks: usize,
    /// 成功解析的分块中的总行数
    pub lines: usize,
    /// 每个变体在成功解析的分块中解析出的记录数
    pub records: BTreeMap<String, usize>,
    /// 每个变体最终表格中的数据行数；表格化失败的分块不计入，因此可能小于 `records`
    pub rows: BTreeMap<String, usize>,
    pub leftovers: usize,
    /// best-effort 策略下失败的任务
    pub failures: Vec<TaskFailure>,
    /// 每个变体的最终表格路径
    pub tables: BTreeMap<String, PathBuf>,
    pub leftover_path: PathBuf,
    pub elapsed: Duration,
}

impl RunSummary {
    pub fn total_records(&self) -> usize {
        self.records.values().sum()
    }

    /// 所有任务都成功
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// 表格化任务参数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TabularizeTask {
    variant: usize,
    chunk_id: usize,
}

/// 成功表格化的分块表
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ChunkTable {
    task: TabularizeTask,
    rows: usize,
}

/// 某个变体成功表格化的分块表，按分块编号排序；失败的槽对该变体视为不存在
fn surviving_tables(results: &[TaskResult<ChunkTable>], variant: usize) -> Vec<ChunkTable> {
    let mut tables: Vec<ChunkTable> = results
        .iter()
        .filter_map(|result| result.value())
        .filter(|table| table.task.variant == variant)
        .copied()
        .collect();
    tables.sort_by_key(|table| table.task.chunk_id);
    tables
}

/// 文件解析器
#[derive(Debug)]
pub struct FileParser {
    ctx: PipelineContext,
}

impl FileParser {
    pub fn new(ctx: PipelineContext) -> Self {
        Self { ctx }
    }

    /// 由流水线配置构造（校验配置并构造变体注册表）
    pub fn from_config(config: PipelineConfig) -> Result<Self> {
        Ok(Self::new(PipelineContext::new(config)?))
    }

    pub fn context(&self) -> &PipelineContext {
        &self.ctx
    }

    /// 解析一个日志文件
    ///
    /// 源文件不存在或输出目录已存在时，在创建任何文件之前返回
    /// [`FwlogError::InvalidPipelineState`]。
    pub fn parse_file(&self, source: &Path, out_dir: Option<&Path>) -> Result<RunSummary> {
        if !source.is_file() {
            return Err(FwlogError::pipeline_state(format!(
                "源文件不存在: {}",
                source.display()
            )));
        }
        let layout = OutputLayout::new(source, out_dir)?;
        if layout.root().exists() {
            return Err(FwlogError::pipeline_state(format!(
                "输出目录已存在: {}",
                layout.root().display()
            )));
        }

        let _enter = self.ctx.span().enter();
        let start = Instant::now();
        tracing::info!("开始解析: {}", source.display());
        tracing::info!("初始化输出目录: {}", layout.root().display());
        fs::create_dir_all(layout.root())?;

        let mut summary = self.run_stages(source, &layout)?;
        summary.elapsed = start.elapsed();

        self.cleanup(&layout, &summary)?;

        tracing::info!(
            "解析完成: {} 行，记录 {:?}，未解析 {} 行，失败任务 {} 个，耗时 {}",
            summary.lines,
            summary.records,
            summary.leftovers,
            summary.failures.len(),
            format_wall_time(summary.elapsed)
        );
        Ok(summary)
    }

    fn run_stages(&self, source: &Path, layout: &OutputLayout) -> Result<RunSummary> {
        let registry = self.ctx.registry();
        let mut failures = Vec::new();

        tracing::info!("STAGE_1: 拆分源文件...");
        let (chunks, split_failures) = split_file(&self.ctx, source, layout)?;
        failures.extend(split_failures);
        tracing::info!("STAGE_1: 拆分完成，{} 个分块", chunks.len());

        tracing::info!("STAGE_2: 解析分块...");
        for variant in registry.iter() {
            fs::create_dir_all(layout.parsed_variant_dir(variant.name()))?;
        }
        fs::create_dir_all(layout.leftover_dir())?;
        let results = self.ctx.executor("parse").execute(chunks.clone(), |chunk| {
            parse_chunk(registry, layout, &chunk).map_err(|e| e.in_chunk(chunk.id))
        })?;
        let (parsed, parse_failures): (Vec<ParsedChunk>, _) = split_outcomes(results);
        failures.extend(parse_failures);
        tracing::info!("STAGE_2: 分块解析完成");

        tracing::info!("STAGE_3: 聚合字段名...");
        let chunk_ids: Vec<usize> = parsed.iter().map(|p| p.chunk_id).collect();
        let headers = aggregate_headers(registry, layout, &chunk_ids)?;
        tracing::info!("STAGE_3: 字段名聚合完成");

        tracing::info!("STAGE_4: 表格化分块...");
        let mut tasks = Vec::with_capacity(registry.len() * chunk_ids.len());
        for (variant, entry) in registry.iter().enumerate() {
            fs::create_dir_all(layout.table_dir(entry.name()))?;
            tasks.extend(chunk_ids.iter().map(|&chunk_id| TabularizeTask { variant, chunk_id }));
        }
        let results = self.ctx.executor("tabularize").execute(tasks, |task| {
            let header = &headers[task.variant];
            tabularize_chunk(
                header,
                &layout.records_path(header.variant(), task.chunk_id),
                &layout.table_chunk_path(header.variant(), task.chunk_id),
            )
            .map(|rows| ChunkTable { task, rows })
            .map_err(|e| e.in_chunk(task.chunk_id))
        })?;
        failures.extend(results.iter().filter_map(|r| r.failure()).cloned());
        tracing::info!("STAGE_4: 表格化完成");

        tracing::info!("STAGE_5: 合并表格...");
        let mut tables = BTreeMap::new();
        let mut rows = BTreeMap::new();
        for (variant, header) in headers.iter().enumerate() {
            let chunk_tables = surviving_tables(&results, variant);
            let paths: Vec<PathBuf> = chunk_tables
                .iter()
                .map(|table| layout.table_chunk_path(header.variant(), table.task.chunk_id))
                .collect();

            tracing::info!(
                "（文件 {}/{}）变体 {}: 合并 {} 个分块表格",
                variant + 1,
                headers.len(),
                header.variant(),
                paths.len()
            );
            let dest = layout.final_table_path(header.variant());
            merge_tables(&paths, header, &dest)?;
            tables.insert(header.variant().to_string(), dest);
            rows.insert(
                header.variant().to_string(),
                chunk_tables.iter().map(|table| table.rows).sum::<usize>(),
            );
        }
        tracing::info!("STAGE_5: 表格合并完成");

        tracing::info!("STAGE_6: 合并未解析行...");
        let leftover_chunks: Vec<PathBuf> =
            chunk_ids.iter().map(|&id| layout.leftover_chunk_path(id)).collect();
        let leftover_path = layout.final_leftover_path();
        merge_leftovers(&leftover_chunks, &leftover_path)?;
        tracing::info!("STAGE_6: 未解析行合并完成: {}", leftover_path.display());

        let mut records = BTreeMap::new();
        for (index, variant) in registry.iter().enumerate() {
            let count: usize = parsed.iter().map(|p| p.record_counts[index]).sum();
            records.insert(variant.name().to_string(), count);
        }

        Ok(RunSummary {
            output_dir: layout.root().to_path_buf(),
            chunks: chunks.len(),
            lines: parsed.iter().map(|p| p.lines).sum(),
            records,
            rows,
            leftovers: parsed.iter().map(|p| p.leftovers).sum(),
            failures,
            tables,
            leftover_path,
            elapsed: Duration::ZERO,
        })
    }

    /// 成功运行后删除中间产物目录；有任务失败或要求保留时不删除
    fn cleanup(&self, layout: &OutputLayout, summary: &RunSummary) -> Result<()> {
        if self.ctx.config().preserve_intermediate {
            tracing::info!("保留中间产物目录");
            return Ok(());
        }
        if !summary.is_complete() {
            tracing::warn!(
                "{} 个任务失败，保留中间产物目录以便排查",
                summary.failures.len()
            );
            return Ok(());
        }

        for dir in layout.intermediate_dirs() {
            if dir.exists() {
                tracing::debug!("删除中间产物目录: {}", dir.display());
                fs::remove_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
