//! 表头聚合（屏障阶段）
//!
//! 合并全部分块的字段名集合，得到每个变体唯一、确定顺序的表头：
//! 变体的系统字段按固定顺序在前，其余字段按不区分大小写的字典序在后。

use super::artifact::read_json_lines;
use super::layout::OutputLayout;
use crate::error::Result;
use crate::fwlog::{FieldKeySet, LogVariant, VariantRegistry};
use std::collections::HashSet;

/// 某个变体的最终表头，计算后只读
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalHeader {
    variant: String,
    columns: Vec<String>,
    lookup: HashSet<String>,
}

impl CanonicalHeader {
    pub fn new(variant: impl Into<String>, columns: Vec<String>) -> Self {
        let lookup = columns.iter().cloned().collect();
        Self { variant: variant.into(), columns, lookup }
    }

    /// 由变体的系统字段和观察到的字段集合构造
    pub fn for_variant(variant: &dyn LogVariant, keys: &FieldKeySet) -> Self {
        Self::new(variant.name(), canonical_order(variant.system_fields(), keys))
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn contains(&self, column: &str) -> bool {
        self.lookup.contains(column)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// 计算确定的列顺序
///
/// 系统字段总在最前（即使没有出现在 `keys` 中），其余字段按
/// `(小写形式, 原文)` 升序，大小写不同的同名字段也有稳定顺序。
pub fn canonical_order(system_fields: &[&str], keys: &FieldKeySet) -> Vec<String> {
    let mut others: Vec<&String> = keys
        .iter()
        .filter(|key| !system_fields.contains(&key.as_str()))
        .collect();
    others.sort_by_cached_key(|key| (key.to_lowercase(), (*key).clone()));

    system_fields
        .iter()
        .map(|field| field.to_string())
        .chain(others.into_iter().cloned())
        .collect()
}

/// 读取各分块的字段名产物并为每个变体生成表头，顺序同注册表
pub fn aggregate_headers(
    registry: &VariantRegistry,
    layout: &OutputLayout,
    chunk_ids: &[usize],
) -> Result<Vec<CanonicalHeader>> {
    let mut headers = Vec::with_capacity(registry.len());

    for variant in registry.iter() {
        let mut keys = FieldKeySet::new();
        for &chunk_id in chunk_ids {
            let chunk_keys: Vec<String> =
                read_json_lines(&layout.keys_path(variant.name(), chunk_id))?;
            keys.extend(chunk_keys);
        }

        let header = CanonicalHeader::for_variant(variant, &keys);
        tracing::info!(
            "变体 {}: {} 个分块共发现 {} 个字段，表头 {} 列",
            variant.name(),
            chunk_ids.len(),
            keys.len(),
            header.len()
        );
        headers.push(header);
    }

    Ok(headers)
}
