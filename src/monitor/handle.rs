//! 监控句柄
//!
//! `monitor` 返回给调用方的唯一控制对象

use crate::monitor::scheduler::{ScheduleEntry, ScheduleState};
use crate::probe::Target;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// 一次 `monitor` 调用创建的全部调度条目
///
/// 句柄被丢弃时自动停止监控。
#[must_use = "丢弃 MonitorHandle 会立即停止监控"]
pub struct MonitorHandle {
    entries: Vec<ScheduleEntry>,
    stopped: AtomicBool,
}

impl MonitorHandle {
    pub(crate) fn new(entries: Vec<ScheduleEntry>) -> Self {
        Self {
            entries,
            stopped: AtomicBool::new(false),
        }
    }

    /// 停止所有目标的监控
    ///
    /// 清除所有等待中的计时器，此后不会再开始新的探测。进行中的探测允许跑完，
    /// 但其结果不会交付给回调，也不会再次调度。可以重复调用，
    /// 只有第一次调用返回 `true`。
    pub fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            debug!("监控已经停止，忽略重复的 stop 调用");
            return false;
        }

        for entry in &self.entries {
            entry.terminate();
        }

        info!("已停止监控，目标数量: {}", self.entries.len());
        true
    }

    /// 是否已经停止
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// 目标数量
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否没有任何目标
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 所有被监控的目标
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.entries.iter().map(ScheduleEntry::target)
    }

    /// 每个目标当前的调度状态
    pub fn states(&self) -> Vec<(String, ScheduleState)> {
        self.entries
            .iter()
            .map(|entry| (entry.target().identifier.clone(), entry.state()))
            .collect()
    }

    /// 指定端点的调度状态
    pub fn state_of(&self, identifier: &str) -> Option<ScheduleState> {
        self.entries
            .iter()
            .find(|entry| entry.target().identifier == identifier)
            .map(ScheduleEntry::state)
    }

    /// 订阅指定端点的状态变化
    pub fn subscribe(&self, identifier: &str) -> Option<watch::Receiver<ScheduleState>> {
        self.entries
            .iter()
            .find(|entry| entry.target().identifier == identifier)
            .map(ScheduleEntry::subscribe)
    }

    /// 停止监控并等待所有调度循环自然退出
    ///
    /// 进行中的探测会跑完，其结果按 [`stop`](Self::stop) 的语义被丢弃。
    pub async fn join(mut self) {
        self.stop();
        Self::await_tasks(self.take_tasks()).await;
    }

    /// 停止监控，中止仍在进行中的探测并等待所有调度任务退出
    pub async fn shutdown(mut self) {
        self.stop();

        let tasks = self.take_tasks();
        for task in &tasks {
            task.abort();
        }
        Self::await_tasks(tasks).await;
    }

    fn take_tasks(&mut self) -> Vec<JoinHandle<()>> {
        self.entries
            .iter_mut()
            .filter_map(ScheduleEntry::take_task)
            .collect()
    }

    async fn await_tasks(tasks: Vec<JoinHandle<()>>) {
        for result in futures::future::join_all(tasks).await {
            if let Err(e) = result {
                if !e.is_cancelled() {
                    debug!("调度任务异常退出: {}", e);
                }
            }
        }
    }
}

impl std::fmt::Debug for MonitorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorHandle")
            .field("targets", &self.states())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
