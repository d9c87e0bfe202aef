//! 探测结果数据结构
//!
//! 每次探测恰好产生一个 [`ProbeOutcome`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

/// 探测失败原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// 收到了HTTP响应但状态码不是200
    #[error("Unexpected HTTP status code {0}")]
    UnexpectedStatus(u16),

    /// 在超时时间内没有建立连接
    #[error("Connect timeout")]
    ConnectTimeout,

    /// 超时判定之前发生的底层网络错误（DNS、拒绝连接、重置等）
    #[error("Transport error: {detail}")]
    Transport {
        /// 底层IO错误类型（如果能取到）
        kind: Option<io::ErrorKind>,
        /// 错误描述
        detail: String,
    },
}

impl ProbeError {
    /// 稳定的错误代码，用于机器可读输出
    pub fn code(&self) -> &'static str {
        match self {
            ProbeError::UnexpectedStatus(_) => "INVALIDSTATUSCODE",
            ProbeError::ConnectTimeout => "CONNECTTIMEOUT",
            ProbeError::Transport { .. } => "TRANSPORT",
        }
    }

    /// 从IO错误构造传输错误
    pub fn from_io(error: &io::Error) -> Self {
        ProbeError::Transport {
            kind: Some(error.kind()),
            detail: error.to_string(),
        }
    }

    /// 是否为连接被拒绝
    pub fn is_connection_refused(&self) -> bool {
        matches!(
            self,
            ProbeError::Transport {
                kind: Some(io::ErrorKind::ConnectionRefused),
                ..
            }
        )
    }

    /// HTTP状态码（仅 UnexpectedStatus）
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ProbeError::UnexpectedStatus(code) => Some(*code),
            _ => None,
        }
    }
}

/// 单次探测的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// 端点存活
    Healthy,
    /// 端点不可用
    Unhealthy(ProbeError),
}

impl ProbeOutcome {
    /// 判断是否健康
    pub fn is_healthy(&self) -> bool {
        matches!(self, ProbeOutcome::Healthy)
    }

    /// 失败原因
    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            ProbeOutcome::Healthy => None,
            ProbeOutcome::Unhealthy(err) => Some(err),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Healthy => write!(f, "healthy"),
            ProbeOutcome::Unhealthy(err) => write!(f, "unhealthy: {err}"),
        }
    }
}

/// 可序列化的探测报告，用于命令行和JSON输出
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// 端点标识
    pub endpoint: String,
    /// 是否健康
    pub healthy: bool,
    /// 错误代码
    pub code: Option<String>,
    /// HTTP状态码（仅状态码不匹配时）
    pub status_code: Option<u16>,
    /// 错误描述
    pub error_message: Option<String>,
    /// 探测耗时，调度循环交付的结果不计时
    #[serde(default, skip_serializing_if = "Option::is_none", with = "duration_serde")]
    pub elapsed: Option<Duration>,
    /// 探测完成时间
    pub timestamp: DateTime<Utc>,
}

impl ProbeReport {
    /// 根据探测结果创建报告
    pub fn new(endpoint: &str, outcome: &ProbeOutcome) -> Self {
        let error = outcome.error();
        Self {
            endpoint: endpoint.to_string(),
            healthy: outcome.is_healthy(),
            code: error.map(|e| e.code().to_string()),
            status_code: error.and_then(ProbeError::status_code),
            error_message: error.map(|e| e.to_string()),
            elapsed: None,
            timestamp: Utc::now(),
        }
    }

    /// 设置探测耗时
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    /// 探测耗时（毫秒）
    pub fn elapsed_ms(&self) -> Option<u64> {
        self.elapsed.map(|elapsed| elapsed.as_millis() as u64)
    }

    /// 转换为单行JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// 以毫秒数序列化可选的 Duration
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration
            .map(|d| d.as_millis() as u64)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = Option::<u64>::deserialize(deserializer)?;
        Ok(millis.map(Duration::from_millis))
    }
}
