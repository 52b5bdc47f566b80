//! 源文件拆分
//!
//! 先按字节数规划对齐到行尾的分块区间，再把各区间并行拷贝为分块文件。
//! 分块编号从 1 开始按文件顺序分配，按编号顺序拼接全部分块即可逐字节还原源文件。

use super::layout::OutputLayout;
use super::{PipelineContext, split_outcomes};
use crate::concurrent::TaskFailure;
use crate::error::{FwlogError, Result};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// 源文件中一个对齐到行尾的字节区间 `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpan {
    pub id: usize,
    pub start: u64,
    pub end: u64,
}

impl ChunkSpan {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// 已写出的分块文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkFile {
    pub id: usize,
    pub path: PathBuf,
    pub bytes: u64,
}

/// 规划分块区间
///
/// 第 k 个分块从上一个分块末尾开始，结束于位置 `start + chunk_size - 1`
/// 处或之后的第一个 `\n`（含），找不到时结束于文件末尾。空文件没有分块。
pub fn plan_chunks(path: &Path, chunk_size: u64) -> Result<Vec<ChunkSpan>> {
    if chunk_size == 0 {
        return Err(FwlogError::config_error("分块大小不能为0"));
    }

    let file = File::open(path)?;
    let file_len = file.metadata()?.len();
    let mut reader = BufReader::new(file);
    let mut spans = Vec::new();
    let mut start = 0u64;
    let mut scratch = Vec::new();

    while start < file_len {
        let target = start.saturating_add(chunk_size - 1);
        let end = if target >= file_len - 1 {
            file_len
        } else {
            reader.seek(SeekFrom::Start(target))?;
            scratch.clear();
            let read = reader.read_until(b'\n', &mut scratch)? as u64;
            if read == 0 { file_len } else { target + read }
        };

        spans.push(ChunkSpan { id: spans.len() + 1, start, end });
        start = end;
    }

    tracing::debug!(
        "文件 {} 共 {} 字节，规划 {} 个分块",
        path.display(),
        file_len,
        spans.len()
    );
    Ok(spans)
}

/// 把源文件的一个区间拷贝到目标文件
pub fn write_chunk(source: &Path, span: &ChunkSpan, dest: &Path) -> Result<u64> {
    let mut input = File::open(source)?;
    input.seek(SeekFrom::Start(span.start))?;

    let mut output = BufWriter::new(File::create(dest)?);
    let copied = io::copy(&mut input.take(span.len()), &mut output)?;
    output.flush()?;

    if copied != span.len() {
        return Err(FwlogError::other(format!(
            "分块 {} 只拷贝了 {}/{} 字节，源文件可能在拆分期间被修改",
            span.id,
            copied,
            span.len()
        )));
    }
    Ok(copied)
}

/// 拆分源文件，返回按编号排序的分块文件以及失败的任务
pub fn split_file(
    ctx: &PipelineContext,
    source: &Path,
    layout: &OutputLayout,
) -> Result<(Vec<ChunkFile>, Vec<TaskFailure>)> {
    let spans = plan_chunks(source, ctx.config().chunk_size)?;
    fs::create_dir_all(layout.split_dir())?;

    let results = ctx.executor("split").execute(spans, |span| {
        let path = layout.chunk_path(span.id);
        write_chunk(source, &span, &path)
            .map(|bytes| ChunkFile { id: span.id, path, bytes })
            .map_err(|e| e.in_chunk(span.id))
    })?;

    Ok(split_outcomes(results))
}
