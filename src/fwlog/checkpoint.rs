//! CheckPoint 防火墙日志变体（`cp`）
//!
//! ```text
//! Sep  9 11:56:41 10.1.1.1 +02:00 10.2.2.2 time="1599645401" action="Accept" service:="443"
//! ```
//!
//! 信封依次为接收时间、来源地址、时区偏移、目标地址；参数尾部由空格分隔的
//! `key="value"` / `key:="value"` 组成。缺少时区偏移的行不匹配本变体。

use super::types::{LogVariant, ParsedRecord, UnparsableLine};
use super::utils::{normalize_timestamp, scan_pairs};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENVELOPE_RE: Regex = Regex::new(
        r"^(\w+ [ ]?\d+ \d\d:\d\d:\d\d) ([\d.]+) ([+-]\d\d:\d\d) ([\d.]+) (.*)$"
    )
    .unwrap();
    static ref QUOTED_PAIR_RE: Regex = Regex::new(r#"^(.*?):?="(.*?)""#).unwrap();
}

/// CheckPoint 变体的系统字段（固定表头顺序）
pub const CHECKPOINT_SYSTEM_FIELDS: &[&str] = &[
    "_timestamp",
    "_datetime",
    "_timezone",
    "_interface_1",
    "_interface_2",
];

/// CheckPoint 防火墙日志解析变体
#[derive(Debug, Clone)]
pub struct CheckPointVariant {
    fallback_year: i32,
}

impl CheckPointVariant {
    pub const NAME: &'static str = "cp";

    pub fn new(fallback_year: i32) -> Self {
        Self { fallback_year }
    }
}

impl LogVariant for CheckPointVariant {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn system_fields(&self) -> &'static [&'static str] {
        CHECKPOINT_SYSTEM_FIELDS
    }

    fn parse(&self, line: &str) -> Result<ParsedRecord, UnparsableLine> {
        let unparsable = UnparsableLine { variant: Self::NAME };
        let caps = ENVELOPE_RE.captures(line).ok_or(unparsable.clone())?;
        let group = |idx: usize| caps.get(idx).map_or("", |m| m.as_str());

        let (timestamp, datetime) =
            normalize_timestamp(group(1), self.fallback_year).ok_or(unparsable)?;

        let mut record = ParsedRecord::new();
        record.insert("_timestamp", timestamp);
        record.insert("_datetime", datetime);
        record.insert("_timezone", group(3));
        record.insert("_interface_1", group(2));
        record.insert("_interface_2", group(4));

        let tail = format!("\" {}", group(5).trim());
        for (key, value) in
            scan_pairs(&tail, &QUOTED_PAIR_RE, |p| p.ends_with("\" "))
        {
            record.insert(key, value);
        }

        Ok(record)
    }
}
