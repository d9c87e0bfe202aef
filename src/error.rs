//! 错误处理模块
//!
//! 定义应用程序的统一错误类型。探测失败不属于错误，
//! 它们以 [`crate::probe::ProbeOutcome::Unhealthy`] 的形式交给回调。

use thiserror::Error;

/// Service Pulse 应用程序的主要错误类型
#[derive(Error, Debug)]
pub enum PulseError {
    /// 配置相关错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 监控调度相关错误
    #[error("监控错误: {0}")]
    Monitor(#[from] MonitorError),

    /// IO错误
    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    /// JSON序列化/反序列化错误
    #[error("JSON错误: {0}")]
    Json(#[from] serde_json::Error),

    /// 其他错误
    #[error("其他错误: {0}")]
    Other(#[from] anyhow::Error),
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    /// 配置文件解析错误
    #[error("配置文件解析失败: {0}")]
    ParseError(String),

    /// 配置验证错误
    #[error("配置验证失败: {0}")]
    ValidationError(String),

    /// 配置文件不存在
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    /// 环境变量替换错误
    #[error("环境变量替换失败: {var}")]
    EnvVarError { var: String },
}

/// 监控调度错误类型
///
/// 这些都是调用方的编程错误，在调度开始时立即返回，不会被重试。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MonitorError {
    /// 端点字符串无法解析
    #[error("无效的端点 {endpoint}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    /// 端点缺少主机名
    #[error("端点缺少主机名: {endpoint}")]
    MissingHost { endpoint: String },

    /// tcp:// 端点必须显式指定端口
    #[error("tcp 端点必须指定端口: {endpoint}")]
    MissingPort { endpoint: String },

    /// 非法的HTTP请求方法
    #[error("无效的HTTP方法: {method}")]
    InvalidMethod { method: String },

    /// HTTP客户端构建失败
    #[error("HTTP客户端创建失败: {0}")]
    ClientBuild(String),

    /// 不在 tokio 运行时中调用
    #[error("monitor 必须在 tokio 运行时中调用")]
    NoRuntime,
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, PulseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monitor_error_converts_into_pulse_error() {
        let err: PulseError = MonitorError::MissingPort {
            endpoint: "tcp://localhost".to_string(),
        }
        .into();

        assert!(matches!(err, PulseError::Monitor(MonitorError::MissingPort { .. })));
        assert!(err.to_string().contains("tcp://localhost"));
    }

    #[test]
    fn test_config_error_message() {
        let err = ConfigError::EnvVarError {
            var: "API_TOKEN".to_string(),
        };
        assert_eq!(err.to_string(), "环境变量替换失败: API_TOKEN");
    }
}
