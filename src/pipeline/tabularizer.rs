//! 表格化：按最终表头把分块记录渲染为 TSV
//!
//! 制表符分隔，每个字段都加双引号（内部的 `"` 双写），行尾为 `\n`。

use super::artifact::read_json_lines;
use super::schema::CanonicalHeader;
use crate::error::Result;
use crate::fwlog::ParsedRecord;
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// 读回的表格
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// 把第 `index` 行按表头还原为记录（包含所有列，缺失值为空字符串）
    pub fn row_record(&self, index: usize) -> Option<ParsedRecord> {
        let row = self.rows.get(index)?;
        Some(self.header.iter().zip(row).collect())
    }
}

fn writer_builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder
        .delimiter(b'\t')
        .quote(b'"')
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'));
    builder
}

/// 渲染表格：表头一行，之后每条记录一行，顺序与输入一致
///
/// # Panics
///
/// 记录中出现表头之外的字段时 panic：表头按构造是所有字段的超集。
pub fn render_table<W: Write>(
    writer: W,
    header: &CanonicalHeader,
    records: &[ParsedRecord],
) -> Result<()> {
    let mut writer = writer_builder().from_writer(writer);
    writer.write_record(header.columns())?;

    for record in records {
        if let Some(stray) = record.keys().find(|key| !header.contains(key)) {
            panic!(
                "变体 {} 的记录包含表头之外的字段 `{}`",
                header.variant(),
                stray
            );
        }
        writer.write_record(
            header.columns().iter().map(|column| record.get(column).unwrap_or("")),
        )?;
    }

    writer.flush()?;
    Ok(())
}

/// 把一个分块的记录产物渲染为表格文件，返回行数
pub fn tabularize_chunk(
    header: &CanonicalHeader,
    records_path: &Path,
    table_path: &Path,
) -> Result<usize> {
    let records: Vec<ParsedRecord> = read_json_lines(records_path)?;
    render_table(File::create(table_path)?, header, &records)?;
    Ok(records.len())
}

/// 读回一个表格文件（分块表或最终表）
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .quote(b'"')
        .has_headers(true)
        .from_path(path)?;

    let header = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for row in reader.records() {
        rows.push(row?.iter().map(str::to_string).collect());
    }

    Ok(Table { header, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn header() -> CanonicalHeader {
        CanonicalHeader::new(
            "hw",
            vec!["_timestamp".to_string(), "Protocol".to_string(), "X".to_string()],
        )
    }

    #[test]
    fn test_render_quotes_every_field() {
        let record: ParsedRecord =
            [("_timestamp", "20200909115641"), ("X", "say \"hi\"")].into_iter().collect();
        let mut out = Vec::new();
        render_table(&mut out, &header(), &[record]).unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "\"_timestamp\"\t\"Protocol\"\t\"X\"\n\"20200909115641\"\t\"\"\t\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_header_only_table() {
        let mut out = Vec::new();
        render_table(&mut out, &header(), &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "\"_timestamp\"\t\"Protocol\"\t\"X\"\n");
    }

    #[test]
    #[should_panic(expected = "表头之外的字段")]
    fn test_stray_field_is_invariant_violation() {
        let record: ParsedRecord = [("unknown", "1")].into_iter().collect();
        let _ = render_table(Vec::new(), &header(), &[record]);
    }

    #[test]
    fn test_read_table_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("chunk_1.hw.tsv");
        let record: ParsedRecord =
            [("_timestamp", "1"), ("Protocol", "udp\tx")].into_iter().collect();
        render_table(File::create(&path).unwrap(), &header(), &[record]).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, vec!["_timestamp", "Protocol", "X"]);
        assert_eq!(table.rows, vec![vec!["1", "udp\tx", ""]]);
        assert_eq!(table.row_record(0).unwrap().get("Protocol"), Some("udp\tx"));
        assert!(table.row_record(1).is_none());
    }
}
