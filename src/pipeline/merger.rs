//! 合并阶段：按分块编号顺序拼接分块产物
//!
//! 表格只保留第一个分块的表头行；未解析行直接拼接。调用方传入的路径
//! 必须已按分块编号升序排列，这里不依赖目录列举顺序。

use super::schema::CanonicalHeader;
use super::tabularizer::render_table;
use crate::error::Result;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// 合并分块表格；没有任何分块表时写出只有表头的表格
pub fn merge_tables(
    chunk_tables: &[PathBuf],
    header: &CanonicalHeader,
    dest: &Path,
) -> Result<()> {
    let mut output = BufWriter::new(File::create(dest)?);

    if chunk_tables.is_empty() {
        tracing::warn!("变体 {} 没有可合并的分块表格，只写出表头", header.variant());
        render_table(&mut output, header, &[])?;
        output.flush()?;
        return Ok(());
    }

    let mut skipped = Vec::new();
    for (index, path) in chunk_tables.iter().enumerate() {
        tracing::info!(
            "变体 {}: 合并分块表格 {}/{}",
            header.variant(),
            index + 1,
            chunk_tables.len()
        );
        let mut input = BufReader::new(File::open(path)?);
        if index > 0 {
            skipped.clear();
            input.read_until(b'\n', &mut skipped)?;
        }
        io::copy(&mut input, &mut output)?;
    }

    output.flush()?;
    Ok(())
}

/// 拼接各分块的未解析行文件
pub fn merge_leftovers(chunk_files: &[PathBuf], dest: &Path) -> Result<()> {
    let mut output = BufWriter::new(File::create(dest)?);

    for (index, path) in chunk_files.iter().enumerate() {
        tracing::info!("合并未解析行分块 {}/{}", index + 1, chunk_files.len());
        let mut input = File::open(path)?;
        io::copy(&mut input, &mut output)?;
    }

    output.flush()?;
    Ok(())
}
