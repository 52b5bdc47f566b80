//! 两级扇出 / 扇入并行执行器
//!
//! 外层按轮询把任务分配给至多 `max_workers` 个 worker 线程，每个 worker
//! 再按轮询分配给至多 `max_threads` 个内层线程。全部任务结束后按任务编号
//! 重新排序，保证结果顺序与提交顺序一致，与实际完成顺序无关。

use super::types::{FailurePolicy, TaskFailure, TaskResult};
use crate::config::PipelineConfig;
use crate::error::{FwlogError, Result};
use crate::utils::format_wall_time;
use std::any::Any;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Instant;
use tracing::Span;

/// 并行执行器
#[derive(Debug, Clone)]
pub struct ParallelExecutor {
    stage: String,
    max_workers: usize,
    max_threads: usize,
    policy: FailurePolicy,
    span: Span,
}

/// 一个 worker / 内层线程分到的任务
type Bucket<P> = Vec<(usize, P)>;

impl ParallelExecutor {
    /// 创建执行器，`max_workers` / `max_threads` 至少为 1
    pub fn new(
        stage: impl Into<String>,
        max_workers: usize,
        max_threads: usize,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            stage: stage.into(),
            max_workers: max_workers.max(1),
            max_threads: max_threads.max(1),
            policy,
            span: Span::current(),
        }
    }

    /// 使用流水线配置创建执行器
    pub fn from_config(stage: impl Into<String>, config: &PipelineConfig) -> Self {
        Self::new(stage, config.max_workers, config.max_threads, config.failure_policy)
    }

    /// 指定 worker 线程中重新进入的 span
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn stage(&self) -> &str {
        &self.stage
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// 并行执行 `task(param)`，返回按任务编号排序的结果槽
    ///
    /// 任务编号从 1 开始，按 `params` 顺序分配。fail-fast 策略下只要有任务失败
    /// （返回错误或 panic）就返回 [`FwlogError::WorkerTaskFailure`]，报告编号最小的
    /// 失败；best-effort 策略下失败保存在各自的结果槽中。
    pub fn execute<P, T, E, F>(&self, params: Vec<P>, task: F) -> Result<Vec<TaskResult<T>>>
    where
        P: Send,
        T: Send,
        E: Display,
        F: Fn(P) -> std::result::Result<T, E> + Sync,
    {
        if params.is_empty() {
            tracing::debug!("阶段 {}: 没有任务", self.stage);
            return Ok(Vec::new());
        }

        let start = Instant::now();
        let total = params.len();
        let numbered = params.into_iter().enumerate().map(|(i, p)| (i + 1, p));
        let buckets = distribute(numbered, self.max_workers);

        tracing::info!(
            "阶段 {}: 开始执行 {} 个任务（{} 个 worker × {} 个线程，策略 {}）",
            self.stage,
            total,
            buckets.len(),
            self.max_threads,
            self.policy
        );

        let abort = AtomicBool::new(false);
        let mut results = self.run_buckets(buckets, &task, &abort)?;
        results.sort_by_key(|r| r.task_id);

        let failures: Vec<&TaskFailure> = results.iter().filter_map(|r| r.failure()).collect();

        tracing::info!(
            "阶段 {}: 完成 {}/{} 个任务，失败 {} 个，耗时 {}",
            self.stage,
            results.len() - failures.len(),
            total,
            failures.len(),
            format_wall_time(start.elapsed())
        );

        if self.policy == FailurePolicy::FailFast {
            if let Some(first) = failures.first() {
                return Err(FwlogError::worker_failure(
                    self.stage.clone(),
                    first.task_id,
                    first.message.clone(),
                ));
            }
        }

        Ok(results)
    }

    fn run_buckets<P, T, E, F>(
        &self,
        buckets: Vec<Bucket<P>>,
        task: &F,
        abort: &AtomicBool,
    ) -> Result<Vec<TaskResult<T>>>
    where
        P: Send,
        T: Send,
        E: Display,
        F: Fn(P) -> std::result::Result<T, E> + Sync,
    {
        thread::scope(|scope| -> Result<Vec<TaskResult<T>>> {
            let mut handles = Vec::with_capacity(buckets.len());
            for (worker_idx, bucket) in buckets.into_iter().enumerate() {
                let name = format!("{}-w{}", self.stage, worker_idx);
                let handle = thread::Builder::new()
                    .name(name)
                    .spawn_scoped(scope, move || self.run_worker(worker_idx, bucket, task, abort))?;
                handles.push(handle);
            }

            let mut results = Vec::new();
            for (worker_idx, handle) in handles.into_iter().enumerate() {
                let worker_results = handle.join().map_err(|payload| {
                    FwlogError::other(format!(
                        "阶段 {} 的 worker {} 异常退出: {}",
                        self.stage,
                        worker_idx,
                        panic_message(payload.as_ref())
                    ))
                })??;
                results.extend(worker_results);
            }
            Ok(results)
        })
    }

    fn run_worker<P, T, E, F>(
        &self,
        worker_idx: usize,
        bucket: Bucket<P>,
        task: &F,
        abort: &AtomicBool,
    ) -> Result<Vec<TaskResult<T>>>
    where
        P: Send,
        T: Send,
        E: Display,
        F: Fn(P) -> std::result::Result<T, E> + Sync,
    {
        let _enter = self.span.enter();
        tracing::debug!("worker {} 分到 {} 个任务", worker_idx, bucket.len());

        if self.max_threads == 1 || bucket.len() <= 1 {
            return Ok(self.run_sequential(bucket, task, abort));
        }

        let inner = distribute(bucket, self.max_threads);
        thread::scope(|scope| -> Result<Vec<TaskResult<T>>> {
            let mut handles = Vec::with_capacity(inner.len());
            for (thread_idx, items) in inner.into_iter().enumerate() {
                let name = format!("{}-w{}-t{}", self.stage, worker_idx, thread_idx);
                let handle = thread::Builder::new().name(name).spawn_scoped(scope, move || {
                    let _enter = self.span.enter();
                    self.run_sequential(items, task, abort)
                })?;
                handles.push(handle);
            }

            let mut results = Vec::new();
            for handle in handles {
                let thread_results = handle.join().map_err(|payload| {
                    FwlogError::other(format!(
                        "阶段 {} 的内层线程异常退出: {}",
                        self.stage,
                        panic_message(payload.as_ref())
                    ))
                })?;
                results.extend(thread_results);
            }
            Ok(results)
        })
    }

    fn run_sequential<P, T, E, F>(
        &self,
        items: Bucket<P>,
        task: &F,
        abort: &AtomicBool,
    ) -> Vec<TaskResult<T>>
    where
        E: Display,
        F: Fn(P) -> std::result::Result<T, E>,
    {
        let mut results = Vec::with_capacity(items.len());
        for (task_id, param) in items {
            if self.policy == FailurePolicy::FailFast && abort.load(Ordering::Acquire) {
                tracing::debug!("阶段 {}: 已有任务失败，跳过任务 {}", self.stage, task_id);
                continue;
            }

            let start = Instant::now();
            let outcome = match panic::catch_unwind(AssertUnwindSafe(|| task(param))) {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(err.to_string()),
                Err(payload) => Err(format!("任务 panic: {}", panic_message(payload.as_ref()))),
            };

            let outcome = match outcome {
                Ok(value) => {
                    tracing::debug!(
                        "阶段 {}: 任务 {} 完成，耗时 {}",
                        self.stage,
                        task_id,
                        format_wall_time(start.elapsed())
                    );
                    Ok(value)
                }
                Err(message) => {
                    tracing::warn!("阶段 {}: 任务 {} 失败: {}", self.stage, task_id, message);
                    if self.policy == FailurePolicy::FailFast {
                        abort.store(true, Ordering::Release);
                    }
                    Err(TaskFailure { stage: self.stage.clone(), task_id, message })
                }
            };
            results.push(TaskResult { task_id, outcome });
        }
        results
    }
}

/// 按下标轮询把条目分配到至多 `slots` 个桶中，不产生空桶
fn distribute<I, P>(items: I, slots: usize) -> Vec<Bucket<P>>
where
    I: IntoIterator<Item = (usize, P)>,
    I::IntoIter: ExactSizeIterator,
{
    let items = items.into_iter();
    let count = slots.max(1).min(items.len());
    let mut buckets: Vec<Bucket<P>> = (0..count).map(|_| Vec::new()).collect();
    for (index, item) in items.enumerate() {
        buckets[index % count].push(item);
    }
    buckets
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
