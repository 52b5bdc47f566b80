//! 并发处理模块
//!
//! 提供通用的两级并行执行器，供分块拆分、分块解析和表格化阶段使用

pub mod executor;
pub mod types;

// 重新导出主要类型和接口
pub use executor::ParallelExecutor;
pub use types::{FailurePolicy, TaskFailure, TaskResult};
