//! 错误类型定义
//!
//! 这个模块定义了库中使用的所有错误类型，使用 thiserror 提供丰富的错误信息。
//! 单行无法解析（`UnparsableLine`）不属于这里：它是解析变体的正常返回分支，
//! 见 [`crate::fwlog::UnparsableLine`]。

/// 防火墙日志解析流水线的结果类型
pub type Result<T> = std::result::Result<T, FwlogError>;

/// 防火墙日志解析流水线错误类型
#[derive(Debug, thiserror::Error)]
pub enum FwlogError {
    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// 中间产物（JSON Lines）序列化/反序列化错误
    #[error("中间产物序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 表格（TSV）读写错误
    #[error("表格读写错误: {0}")]
    Csv(#[from] csv::Error),

    /// 配置文件解析错误
    #[error("配置文件解析错误: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// 配置文件序列化错误
    #[error("配置文件序列化错误: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 流水线前置条件不满足（源文件不存在、输出目录已存在等），在任何阶段开始前报告
    #[error("流水线状态无效: {message}")]
    InvalidPipelineState { message: String },

    /// 并行任务失败
    #[error("阶段 {stage} 的任务 {task_id} 失败: {message}")]
    WorkerTaskFailure { stage: String, task_id: usize, message: String },

    /// 与某个分块相关的错误
    #[error("分块 {chunk_id}: {source}")]
    Chunk {
        chunk_id: usize,
        #[source]
        source: Box<FwlogError>,
    },

    /// 其他错误
    #[error("未知错误: {0}")]
    Other(String),
}

impl FwlogError {
    /// 创建一个配置错误
    pub fn config_error<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        tracing::error!("配置错误: {}", message);
        Self::Config(message)
    }

    /// 创建一个流水线前置条件错误
    pub fn pipeline_state<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        tracing::error!("流水线状态无效: {}", message);
        Self::InvalidPipelineState { message }
    }

    /// 创建一个并行任务失败错误
    pub fn worker_failure<S: Into<String>, M: Into<String>>(
        stage: S,
        task_id: usize,
        message: M,
    ) -> Self {
        let stage = stage.into();
        let message = message.into();
        tracing::error!("阶段 {} 的任务 {} 失败: {}", stage, task_id, message);
        Self::WorkerTaskFailure { stage, task_id, message }
    }

    /// 为错误附加分块编号
    pub fn in_chunk(self, chunk_id: usize) -> Self {
        Self::Chunk { chunk_id, source: Box::new(self) }
    }

    /// 创建一个其他类型错误
    pub fn other<S: Into<String>>(message: S) -> Self {
        let message = message.into();
        tracing::error!("未知错误: {}", message);
        Self::Other(message)
    }

    /// 检查是否为 IO 错误（会穿透分块包装）
    pub fn is_io_error(&self) -> bool {
        match self {
            FwlogError::Io(_) => true,
            FwlogError::Chunk { source, .. } => source.is_io_error(),
            _ => false,
        }
    }

    /// 检查是否为配置错误
    pub fn is_config_error(&self) -> bool {
        matches!(self, FwlogError::Config(_))
    }

    /// 检查是否为流水线前置条件错误
    pub fn is_pipeline_state_error(&self) -> bool {
        matches!(self, FwlogError::InvalidPipelineState { .. })
    }

    /// 检查是否为并行任务失败
    pub fn is_worker_failure(&self) -> bool {
        matches!(self, FwlogError::WorkerTaskFailure { .. })
    }

    /// 返回错误所属的分块编号（如有）
    pub fn chunk_id(&self) -> Option<usize> {
        match self {
            FwlogError::Chunk { chunk_id, .. } => Some(*chunk_id),
            _ => None,
        }
    }
}
