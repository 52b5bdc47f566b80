//! 华为防火墙日志变体（`hw`）
//!
//! 行格式示例：
//!
//! ```text
//! Sep  9 11:56:41 10.123.169.1 2020-09-09 10:05:11 FW-OUT-01 %%01SECLOG/6/SESSION_TEARDOWN(l):IPVer=4,Protocol=udp,...,CloseReason=aged-out.
//! ```
//!
//! 信封提取接收时间、可选的来源地址、可选的设备时间（不入表）、设备名、
//! 事件名（按 `/` 拆为模块 / 级别 / 名称）以及圆括号、方括号中的事件标记。
//! 参数尾部做两遍扫描：逗号分隔的 `key=value`，再是分号分隔的 `key:value`，
//! 后一遍覆盖前一遍的同名字段。

use super::types::{LogVariant, ParsedRecord, UnparsableLine};
use super::utils::{normalize_timestamp, scan_pairs};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ENVELOPE_RE: Regex = Regex::new(
        r"^(?P<timestamp_1>\w+ [ ]?\d+ \d\d:\d\d:\d\d) (?:(?P<interface_1>[\d.]+) )?(?:(?P<timestamp_2>\d\d\d\d-\d\d-\d\d \d\d:\d\d:\d\d) )?(?P<interface_2>\S+) %%(?P<event_name>[^\s()\[\]]+?)(?:\((?P<event_brace_round>\S+)\))?(?:\[(?P<event_brace_square>\S+)\])?:(?P<params>.*)$"
    )
    .unwrap();
    static ref COMMA_PAIR_RE: Regex =
        Regex::new(r#"^([^\s()&,]+?)="?(.*?)"?(?:,|\.$|\)$)"#).unwrap();
    static ref SEMICOLON_PAIR_RE: Regex =
        Regex::new(r#"^(?:\[.*\])?([^()&,]+?):"?(.*?)"?;"#).unwrap();
}

/// 华为变体的系统字段（固定表头顺序）
pub const HUAWEI_SYSTEM_FIELDS: &[&str] = &[
    "_timestamp",
    "_datetime",
    "_interface_1",
    "_interface_2",
    "_event_module",
    "_event_severity",
    "_event_name",
    "_event_brace_round",
    "_event_brace_square",
];

/// 华为防火墙日志解析变体
#[derive(Debug, Clone)]
pub struct HuaweiVariant {
    fallback_year: i32,
}

impl HuaweiVariant {
    pub const NAME: &'static str = "hw";

    pub fn new(fallback_year: i32) -> Self {
        Self { fallback_year }
    }

    /// 拆分 `01SECLOG/6/SESSION_TEARDOWN` 形式的事件标记为 (模块, 级别, 名称)
    fn split_event(token: &str) -> (&str, &str, &str) {
        let parts: Vec<&str> = token.splitn(3, '/').collect();
        match parts.as_slice() {
            [module, severity, name] => (*module, *severity, *name),
            [module, name] => (*module, "", *name),
            _ => ("", "", token),
        }
    }

    fn parse_params(params: &str, record: &mut ParsedRecord) {
        let params = params.trim();

        let comma_tail = format!(",{params}");
        for (key, value) in scan_pairs(&comma_tail, &COMMA_PAIR_RE, |p| {
            p.ends_with(',') || p.ends_with(", ") || p.ends_with('(')
        }) {
            record.insert(key, value);
        }

        let semicolon_tail = format!(";{params}");
        for (key, value) in scan_pairs(&semicolon_tail, &SEMICOLON_PAIR_RE, |p| {
            p.ends_with(';') || p.ends_with("; ") || p.ends_with('(')
        }) {
            record.insert(key, value);
        }
    }
}

impl LogVariant for HuaweiVariant {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn system_fields(&self) -> &'static [&'static str] {
        HUAWEI_SYSTEM_FIELDS
    }

    fn parse(&self, line: &str) -> Result<ParsedRecord, UnparsableLine> {
        let unparsable = UnparsableLine { variant: Self::NAME };
        let caps = ENVELOPE_RE.captures(line).ok_or(unparsable.clone())?;
        let group = |name: &str| caps.name(name).map_or("", |m| m.as_str());

        let (timestamp, datetime) =
            normalize_timestamp(group("timestamp_1"), self.fallback_year)
                .ok_or(unparsable)?;
        let (module, severity, event) = Self::split_event(group("event_name"));

        let mut record = ParsedRecord::new();
        record.insert("_timestamp", timestamp);
        record.insert("_datetime", datetime);
        record.insert("_interface_1", group("interface_1"));
        record.insert("_interface_2", group("interface_2"));
        record.insert("_event_module", module);
        record.insert("_event_severity", severity);
        record.insert("_event_name", event);
        record.insert("_event_brace_round", group("event_brace_round"));
        record.insert("_event_brace_square", group("event_brace_square"));

        Self::parse_params(group("params"), &mut record);

        Ok(record)
    }
}
