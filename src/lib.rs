//! Service Pulse - 端点存活监控工具
//!
//! 周期性地探测一组网络端点并把每次探测的结果交给回调：
//! - HTTP探测（状态码必须为200）
//! - TCP连接探测
//! - 每个端点独立调度，固定间隔重新探测
//! - 通过 [`MonitorHandle::stop`] 统一停止
//!
//! ```no_run
//! use service_pulse::{monitor, MonitorOptions};
//!
//! # async fn example() -> Result<(), service_pulse::error::MonitorError> {
//! let handle = monitor(
//!     ["http://localhost:8080", "tcp://localhost:5432"],
//!     MonitorOptions::default().with_path("/health"),
//!     |outcome, endpoint| println!("{endpoint}: {outcome}"),
//! )?;
//!
//! tokio::time::sleep(std::time::Duration::from_secs(10)).await;
//! handle.stop();
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitor;
pub mod probe;

// 重新导出主要类型
pub use error::{MonitorError, PulseError};
pub use monitor::{monitor, Endpoints, MonitorHandle, MonitorOptions, ScheduleState};
pub use probe::{check_http, check_tcp, ProbeConfig, ProbeError, ProbeOutcome, Target};

/// 应用程序版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 应用程序名称
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");

/// 应用程序描述
pub const APP_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
