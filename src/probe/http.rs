//! HTTP存活探测
//!
//! 超时只约束连接建立阶段：客户端使用 `connect_timeout`，不设置整体请求超时，
//! 已连接但响应缓慢的服务不会被判定为超时。

use crate::error::MonitorError;
use crate::probe::outcome::{ProbeError, ProbeOutcome};
use crate::probe::target::Target;
use crate::probe::ProbeConfig;
use reqwest::{redirect, Client, Method, StatusCode};
use std::error::Error as StdError;
use std::io;
use std::str::FromStr;
use tracing::debug;

/// HTTP探测器，每个目标持有一个
#[derive(Debug, Clone)]
pub struct HttpProber {
    /// HTTP客户端
    client: Client,
    /// 请求方法
    method: Method,
}

impl HttpProber {
    /// 创建新的HTTP探测器
    ///
    /// # 参数
    /// * `config` - 探测配置
    ///
    /// # 返回
    /// * `Result<Self, MonitorError>` - 探测器实例
    pub fn new(config: &ProbeConfig) -> Result<Self, MonitorError> {
        let method = Method::from_str(&config.method.to_uppercase()).map_err(|_| {
            MonitorError::InvalidMethod {
                method: config.method.clone(),
            }
        })?;

        // 不复用空闲连接，响应被丢弃时连接随之关闭
        let client = Client::builder()
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .redirect(redirect::Policy::none())
            .no_proxy()
            .user_agent(format!("{}/{}", crate::APP_NAME, crate::VERSION))
            .build()
            .map_err(|e| MonitorError::ClientBuild(e.to_string()))?;

        Ok(Self { client, method })
    }

    /// 对目标执行一次探测
    pub async fn check(&self, target: &Target) -> ProbeOutcome {
        let url = target.url();
        debug!("HTTP 探测开始: {} {}", self.method, url);

        match self.client.request(self.method.clone(), &url).send().await {
            Ok(response) => {
                let status = response.status();
                drop(response);

                if status == StatusCode::OK {
                    debug!("HTTP 探测成功: {}", url);
                    ProbeOutcome::Healthy
                } else {
                    debug!("HTTP 探测状态码异常 {}: {}", url, status);
                    ProbeOutcome::Unhealthy(ProbeError::UnexpectedStatus(status.as_u16()))
                }
            }
            Err(e) if e.is_timeout() => {
                debug!("HTTP 探测连接超时 {}", url);
                ProbeOutcome::Unhealthy(ProbeError::ConnectTimeout)
            }
            Err(e) => {
                debug!("HTTP 探测失败 {}: {}", url, e);
                ProbeOutcome::Unhealthy(transport_error(&e))
            }
        }
    }
}

/// 执行一次HTTP探测
///
/// 探测器无法构建（例如非法的请求方法）时返回传输错误。
pub async fn check_http(target: &Target, config: &ProbeConfig) -> ProbeOutcome {
    match HttpProber::new(config) {
        Ok(prober) => prober.check(target).await,
        Err(e) => ProbeOutcome::Unhealthy(ProbeError::Transport {
            kind: None,
            detail: e.to_string(),
        }),
    }
}

/// 从请求错误的来源链中取出底层IO错误
fn transport_error(error: &reqwest::Error) -> ProbeError {
    let mut source = error.source();
    while let Some(err) = source {
        if let Some(io_error) = err.downcast_ref::<io::Error>() {
            return ProbeError::from_io(io_error);
        }
        source = err.source();
    }

    ProbeError::Transport {
        kind: None,
        detail: error.to_string(),
    }
}
