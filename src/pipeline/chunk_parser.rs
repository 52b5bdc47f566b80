//! 分块解析：对分块的每一行按优先级尝试全部变体
//!
//! 每个变体写出记录和字段名两个产物，未解析行写入 leftover 产物，
//! 全部路径按 (分块编号, 变体) 定址。

use super::artifact::{write_json_lines, write_lines};
use super::layout::OutputLayout;
use super::splitter::ChunkFile;
use crate::error::Result;
use crate::fwlog::{Classified, FieldKeySet, ParsedRecord, VariantRegistry, strip_line_ending};
use crate::utils::format_wall_time;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::time::Instant;

/// 单个分块在内存中的解析结果，按变体在注册表中的下标索引
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkExtraction {
    pub records: Vec<Vec<ParsedRecord>>,
    pub keys: Vec<FieldKeySet>,
    pub leftovers: Vec<String>,
    pub lines: usize,
}

impl ChunkExtraction {
    fn with_variants(count: usize) -> Self {
        Self {
            records: vec![Vec::new(); count],
            keys: vec![FieldKeySet::new(); count],
            leftovers: Vec::new(),
            lines: 0,
        }
    }
}

/// 分块解析任务的返回值（产物已写盘，仅保留计数）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedChunk {
    pub chunk_id: usize,
    pub lines: usize,
    /// 每个变体解析出的记录数，顺序同注册表
    pub record_counts: Vec<usize>,
    pub leftovers: usize,
}

/// 逐行分类
///
/// 行按字节读取并做有损 UTF-8 解码，去掉行尾换行符后交给注册表；
/// 每一行要么恰好被一个变体解析，要么成为 leftover。
pub fn classify_lines<R: BufRead>(registry: &VariantRegistry, mut reader: R) -> Result<ChunkExtraction> {
    let mut extraction = ChunkExtraction::with_variants(registry.len());
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        extraction.lines += 1;

        let raw = String::from_utf8_lossy(&buf);
        match registry.classify(strip_line_ending(&raw)) {
            Classified::Matched { variant, record } => {
                extraction.keys[variant].extend(record.keys().map(str::to_string));
                extraction.records[variant].push(record);
            }
            Classified::Leftover(line) => extraction.leftovers.push(line),
        }
    }

    Ok(extraction)
}

/// 解析一个分块文件并写出其产物
pub fn parse_chunk(
    registry: &VariantRegistry,
    layout: &OutputLayout,
    chunk: &ChunkFile,
) -> Result<ParsedChunk> {
    let start = Instant::now();
    let reader = BufReader::new(File::open(&chunk.path)?);
    let extraction = classify_lines(registry, reader)?;

    let mut record_counts = Vec::with_capacity(registry.len());
    for (index, variant) in registry.iter().enumerate() {
        let name = variant.name();
        let records = &extraction.records[index];
        write_json_lines(&layout.records_path(name, chunk.id), records)?;
        write_json_lines(&layout.keys_path(name, chunk.id), &extraction.keys[index])?;
        record_counts.push(records.len());
    }
    write_lines(&layout.leftover_chunk_path(chunk.id), &extraction.leftovers)?;

    tracing::debug!(
        "分块 {}: {} 行，记录 {:?}，未解析 {} 行，耗时 {}",
        chunk.id,
        extraction.lines,
        record_counts,
        extraction.leftovers.len(),
        format_wall_time(start.elapsed())
    );

    Ok(ParsedChunk {
        chunk_id: chunk.id,
        lines: extraction.lines,
        record_counts,
        leftovers: extraction.leftovers.len(),
    })
}
