//! 单目标调度循环
//!
//! 每个目标一个 tokio 任务：探测、交付结果、等待间隔，然后重复。
//! 无论结果是否健康都以固定间隔重新探测，没有退避。

use crate::probe::{Probe, ProbeOutcome, Target};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// 探测结果回调函数类型，参数为结果和端点标识
pub type ProbeCallback = Arc<dyn Fn(ProbeOutcome, &str) + Send + Sync>;

/// 调度状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    /// 已创建，尚未开始探测
    Idle,
    /// 探测进行中
    Probing,
    /// 等待下一次探测
    Waiting {
        /// 下一次探测的计划时间
        next_fire: Instant,
    },
    /// 已停止，不再发生任何状态变化
    Terminated,
}

impl ScheduleState {
    /// 是否已停止
    pub fn is_terminated(&self) -> bool {
        matches!(self, ScheduleState::Terminated)
    }
}

/// 状态迁移，`Terminated` 之后的迁移一律被拒绝
pub(crate) fn transition(state: &watch::Sender<ScheduleState>, next: ScheduleState) -> bool {
    state.send_if_modified(|current| {
        if current.is_terminated() {
            return false;
        }
        *current = next;
        true
    })
}

/// 单个目标的调度条目，由 [`super::MonitorHandle`] 独占持有
pub(crate) struct ScheduleEntry {
    target: Target,
    token: CancellationToken,
    state: Arc<watch::Sender<ScheduleState>>,
    task: Option<JoinHandle<()>>,
}

impl ScheduleEntry {
    /// 在指定运行时上启动目标的调度循环
    pub(crate) fn spawn(
        runtime: &tokio::runtime::Handle,
        probe: Probe,
        interval: Duration,
        callback: ProbeCallback,
    ) -> Self {
        let target = probe.target().clone();
        let token = CancellationToken::new();
        let (state, _) = watch::channel(ScheduleState::Idle);
        let state = Arc::new(state);

        let task = runtime.spawn(run_schedule(
            probe,
            interval,
            token.clone(),
            Arc::clone(&state),
            callback,
        ));

        Self {
            target,
            token,
            state,
            task: Some(task),
        }
    }

    pub(crate) fn target(&self) -> &Target {
        &self.target
    }

    pub(crate) fn state(&self) -> ScheduleState {
        *self.state.borrow()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ScheduleState> {
        self.state.subscribe()
    }

    /// 取消等待中的计时器并标记为已停止；进行中的探测不会被强制中断
    pub(crate) fn terminate(&self) {
        self.token.cancel();
        transition(&self.state, ScheduleState::Terminated);
    }

    pub(crate) fn take_task(&mut self) -> Option<JoinHandle<()>> {
        self.task.take()
    }
}

/// 调度循环：Idle → Probing → Waiting → Probing ...，任意状态 → Terminated
async fn run_schedule(
    probe: Probe,
    interval: Duration,
    token: CancellationToken,
    state: Arc<watch::Sender<ScheduleState>>,
    callback: ProbeCallback,
) {
    let identifier = probe.target().identifier.clone();
    debug!("启动调度循环: {}", identifier);

    loop {
        if token.is_cancelled() || !transition(&state, ScheduleState::Probing) {
            break;
        }

        let outcome = probe.run().await;

        // stop() 之后到达的结果既不交付也不重新调度
        if token.is_cancelled() {
            debug!("丢弃停止后到达的探测结果: {} ({})", identifier, outcome);
            break;
        }

        callback(outcome, &identifier);

        let next_fire = Instant::now() + interval;
        if !transition(&state, ScheduleState::Waiting { next_fire }) {
            break;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = sleep_until(next_fire) => {}
        }
    }

    transition(&state, ScheduleState::Terminated);
    debug!("调度循环已结束: {}", identifier);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_transition_after_terminated() {
        let (state, rx) = watch::channel(ScheduleState::Idle);

        assert!(transition(&state, ScheduleState::Probing));
        assert_eq!(*rx.borrow(), ScheduleState::Probing);

        assert!(transition(&state, ScheduleState::Terminated));
        assert!(!transition(&state, ScheduleState::Probing));
        assert!(!transition(&state, ScheduleState::Idle));
        assert!(!transition(&state, ScheduleState::Terminated));
        assert_eq!(*rx.borrow(), ScheduleState::Terminated);
    }

    #[test]
    fn test_is_terminated() {
        assert!(ScheduleState::Terminated.is_terminated());
        assert!(!ScheduleState::Idle.is_terminated());
        assert!(!ScheduleState::Waiting {
            next_fire: Instant::now()
        }
        .is_terminated());
    }
}
