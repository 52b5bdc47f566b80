use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// 某个变体在某个范围（分块 / 整个文件）内出现过的字段名集合
pub type FieldKeySet = BTreeSet<String>;

/// 未匹配任何变体的行归入的保留名称
pub const LEFTOVER_NAME: &str = "na";

/// 行未匹配变体信封格式
///
/// 不是致命错误：调用方据此尝试下一个变体，或将行归为 leftover。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("行不匹配 {variant} 信封格式")]
pub struct UnparsableLine {
    /// 尝试解析的变体名称
    pub variant: &'static str,
}

/// 单行日志解析出的记录：字段名 → 字符串值，字段名唯一
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParsedRecord {
    fields: BTreeMap<String, String>,
}

impl ParsedRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入字段，键和值均去除首尾空白；同名字段后写入者覆盖
    pub fn insert<K: AsRef<str>, V: AsRef<str>>(&mut self, key: K, value: V) {
        self.fields.insert(
            key.as_ref().trim().to_string(),
            value.as_ref().trim().to_string(),
        );
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for ParsedRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = ParsedRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// 单个厂商日志语法的解析能力
///
/// 实现必须是纯函数：不保存跨行状态，不重试。
pub trait LogVariant: Send + Sync {
    /// 变体短名称，用于产物路径与最终表名
    fn name(&self) -> &'static str;

    /// 固定在表头最前面的系统字段，按此顺序排列；每条记录都包含这些字段
    fn system_fields(&self) -> &'static [&'static str];

    /// 解析一行日志（不含换行符）
    fn parse(&self, line: &str) -> Result<ParsedRecord, UnparsableLine>;
}
