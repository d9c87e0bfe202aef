//! 存活探测模块
//!
//! 提供HTTP和TCP两种探测方式，每次调用恰好产生一个结果

pub mod http;
pub mod outcome;
pub mod target;
pub mod tcp;

#[cfg(test)]
pub(crate) mod testing;

// 重新导出主要类型
pub use http::{check_http, HttpProber};
pub use outcome::{ProbeError, ProbeOutcome, ProbeReport};
pub use target::{Scheme, Target};
pub use tcp::{check_tcp, check_tcp_with, Connector, TokioConnector};

use crate::error::MonitorError;
use std::time::{Duration, Instant};

/// 默认连接超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

/// 默认HTTP请求方法
pub const DEFAULT_METHOD: &str = "HEAD";

/// 探测配置，对同一目标的所有探测保持不变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// 连接建立超时
    pub timeout: Duration,
    /// HTTP请求方法，TCP探测忽略
    pub method: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            method: DEFAULT_METHOD.to_string(),
        }
    }
}

impl ProbeConfig {
    /// 设置超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置HTTP请求方法
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }
}

/// 按协议选定的探测器
#[derive(Debug, Clone)]
enum ProbeKind {
    Http(HttpProber),
    Tcp,
}

/// 绑定到单个目标的探测器
#[derive(Debug, Clone)]
pub struct Probe {
    target: Target,
    config: ProbeConfig,
    kind: ProbeKind,
}

impl Probe {
    /// 根据目标协议选择探测方式：`tcp` 使用TCP探测，其余使用HTTP探测
    ///
    /// # 参数
    /// * `target` - 探测目标
    /// * `config` - 探测配置
    ///
    /// # 返回
    /// * `Result<Self, MonitorError>` - 探测器实例
    pub fn for_target(target: Target, config: ProbeConfig) -> Result<Self, MonitorError> {
        let kind = if target.scheme.is_http() {
            ProbeKind::Http(HttpProber::new(&config)?)
        } else {
            ProbeKind::Tcp
        };

        Ok(Self {
            target,
            config,
            kind,
        })
    }

    /// 探测目标
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// 执行一次探测
    pub async fn run(&self) -> ProbeOutcome {
        match &self.kind {
            ProbeKind::Http(prober) => prober.check(&self.target).await,
            ProbeKind::Tcp => check_tcp(&self.target, &self.config).await,
        }
    }

    /// 执行一次探测并生成报告
    pub async fn run_report(&self) -> (ProbeOutcome, ProbeReport) {
        let start = Instant::now();
        let outcome = self.run().await;
        let report =
            ProbeReport::new(&self.target.identifier, &outcome).with_elapsed(start.elapsed());
        (outcome, report)
    }
}
