//! 监控调度模块
//!
//! 为每个端点启动独立的探测循环，并通过 [`MonitorHandle`] 统一停止

pub mod handle;
pub mod options;
pub mod scheduler;

// 重新导出主要类型
pub use handle::MonitorHandle;
pub use options::{Endpoints, MonitorOptions, DEFAULT_INTERVAL};
pub use scheduler::{ProbeCallback, ScheduleState};

use crate::error::MonitorError;
use crate::probe::{Probe, ProbeOutcome, Target};
use scheduler::ScheduleEntry;
use std::sync::Arc;
use tracing::info;

/// 开始周期性地探测一组端点
///
/// 所有端点先全部解析，任何一个无效都会立即返回错误且不启动任何探测。
/// 之后每个端点在当前 tokio 运行时上拥有一个独立任务，互不等待。
///
/// # 参数
/// * `endpoints` - 单个端点或端点列表
/// * `options` - 监控选项
/// * `callback` - 每次探测完成后调用，参数为结果和端点原始字符串
///
/// # 返回
/// * `Result<MonitorHandle, MonitorError>` - 用于停止监控的句柄
pub fn monitor<E, F>(
    endpoints: E,
    options: MonitorOptions,
    callback: F,
) -> Result<MonitorHandle, MonitorError>
where
    E: Into<Endpoints>,
    F: Fn(ProbeOutcome, &str) + Send + Sync + 'static,
{
    let endpoints = endpoints.into();
    let runtime = tokio::runtime::Handle::try_current().map_err(|_| MonitorError::NoRuntime)?;

    let probe_config = options.probe_config();
    let probes = endpoints
        .iter()
        .map(|endpoint| {
            let target = Target::parse(endpoint, options.path.as_deref())?;
            Probe::for_target(target, probe_config.clone())
        })
        .collect::<Result<Vec<_>, _>>()?;

    let callback: ProbeCallback = Arc::new(callback);
    let entries = probes
        .into_iter()
        .map(|probe| {
            ScheduleEntry::spawn(&runtime, probe, options.interval, Arc::clone(&callback))
        })
        .collect::<Vec<_>>();

    info!(
        "开始监控，目标数量: {}，间隔: {:?}，超时: {:?}",
        entries.len(),
        options.interval,
        options.timeout
    );

    Ok(MonitorHandle::new(entries))
}
