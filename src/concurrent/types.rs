//! 并发执行相关的数据类型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 任务失败策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// 第一个失败的任务中止整个批次，错误返回给调用方
    #[default]
    FailFast,
    /// 失败记录在对应任务的结果槽中，其余任务照常完成
    BestEffort,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailurePolicy::FailFast => "fail-fast",
            FailurePolicy::BestEffort => "best-effort",
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个任务的失败信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskFailure {
    /// 所属阶段
    pub stage: String,
    /// 任务编号（从 1 开始，与提交顺序一致）
    pub task_id: usize,
    /// 错误或 panic 信息
    pub message: String,
}

impl fmt::Display for TaskFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}#{}] {}", self.stage, self.task_id, self.message)
    }
}

/// 单个任务的结果槽
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult<T> {
    /// 任务编号，仅用于恢复提交顺序
    pub task_id: usize,
    pub outcome: Result<T, TaskFailure>,
}

impl<T> TaskResult<T> {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn value(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    pub fn failure(&self) -> Option<&TaskFailure> {
        self.outcome.as_ref().err()
    }

    pub fn into_value(self) -> Option<T> {
        self.outcome.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        policy: FailurePolicy,
    }

    #[test]
    fn test_failure_policy_serde_names() {
        let holder: Holder = toml::from_str(r#"policy = "best-effort""#).unwrap();
        assert_eq!(holder.policy, FailurePolicy::BestEffort);
        assert_eq!(FailurePolicy::default().to_string(), "fail-fast");
        assert!(toml::from_str::<Holder>(r#"policy = "never""#).is_err());
    }

    #[test]
    fn test_task_result_accessors() {
        let ok = TaskResult { task_id: 1, outcome: Ok(5) };
        assert!(ok.is_ok());
        assert_eq!(ok.value(), Some(&5));

        let failed: TaskResult<i32> = TaskResult {
            task_id: 2,
            outcome: Err(TaskFailure {
                stage: "parse".to_string(),
                task_id: 2,
                message: "boom".to_string(),
            }),
        };
        assert_eq!(failed.failure().map(|f| f.to_string()).as_deref(), Some("[parse#2] boom"));
        assert_eq!(failed.into_value(), None);
    }
}
