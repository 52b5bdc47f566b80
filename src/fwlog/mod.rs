//! 防火墙日志解析模块
//!
//! 提供单行日志的字段提取：解析变体（每个厂商语法一个实现）、
//! 按优先级尝试变体的注册表，以及共享的扫描与时间规范化工具。

pub mod checkpoint;
pub mod huawei;
pub mod registry;
pub mod types;
pub mod utils;

// 重新导出核心类型
pub use checkpoint::CheckPointVariant;
pub use huawei::HuaweiVariant;
pub use registry::{Classified, VariantRegistry};
pub use types::{FieldKeySet, LEFTOVER_NAME, LogVariant, ParsedRecord, UnparsableLine};
pub use utils::strip_line_ending;
