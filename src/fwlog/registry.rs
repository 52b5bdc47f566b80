use super::checkpoint::CheckPointVariant;
use super::huawei::HuaweiVariant;
use super::types::{LEFTOVER_NAME, LogVariant, ParsedRecord};
use crate::error::{FwlogError, Result};
use std::collections::HashSet;
use std::fmt;

/// 单行日志的分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified {
    /// 被优先级列表中第 `variant` 个变体解析
    Matched { variant: usize, record: ParsedRecord },
    /// 未匹配任何变体，保留去除首尾空白后的原文
    Leftover(String),
}

/// 按优先级排列的解析变体列表
///
/// 第一个信封匹配成功的变体胜出，其余变体不再尝试。
pub struct VariantRegistry {
    variants: Vec<Box<dyn LogVariant>>,
}

impl fmt::Debug for VariantRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl VariantRegistry {
    /// 内置变体的短名称
    pub const KNOWN: &'static [&'static str] =
        &[HuaweiVariant::NAME, CheckPointVariant::NAME];

    /// 由变体实例构造，校验名称唯一且不与 leftover 名称冲突
    pub fn new(variants: Vec<Box<dyn LogVariant>>) -> Result<Self> {
        if variants.is_empty() {
            return Err(FwlogError::config_error("至少需要一个解析变体"));
        }
        let mut seen = HashSet::new();
        for variant in &variants {
            let name = variant.name();
            if name == LEFTOVER_NAME {
                return Err(FwlogError::config_error(format!(
                    "变体名称 `{name}` 为保留名称"
                )));
            }
            if !seen.insert(name) {
                return Err(FwlogError::config_error(format!(
                    "变体名称重复: {name}"
                )));
            }
        }
        Ok(Self { variants })
    }

    /// 按名称列表（即优先级顺序）构造内置变体
    pub fn from_names<S: AsRef<str>>(names: &[S], fallback_year: i32) -> Result<Self> {
        let variants = names
            .iter()
            .map(|name| -> Result<Box<dyn LogVariant>> {
                match name.as_ref() {
                    HuaweiVariant::NAME => Ok(Box::new(HuaweiVariant::new(fallback_year))),
                    CheckPointVariant::NAME => {
                        Ok(Box::new(CheckPointVariant::new(fallback_year)))
                    }
                    other => Err(FwlogError::config_error(format!(
                        "未知的解析变体: {other}（可用: {}）",
                        Self::KNOWN.join(", ")
                    ))),
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(variants)
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn LogVariant> {
        self.variants.get(index).map(|v| v.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn LogVariant> {
        self.variants.iter().map(|v| v.as_ref())
    }

    /// 按优先级顺序列出变体名称
    pub fn names(&self) -> Vec<&'static str> {
        self.variants.iter().map(|v| v.name()).collect()
    }

    /// 对一行日志（不含换行符）依次尝试各变体
    pub fn classify(&self, line: &str) -> Classified {
        for (index, variant) in self.variants.iter().enumerate() {
            if let Ok(record) = variant.parse(line) {
                return Classified::Matched { variant: index, record };
            }
        }
        Classified::Leftover(line.trim().to_string())
    }
}
