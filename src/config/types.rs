//! 配置数据结构定义
//!
//! 定义配置文件结构体和验证逻辑

use crate::monitor::MonitorOptions;
use crate::probe::Target;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 主配置结构，包含监控参数和端点列表
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// 监控参数
    #[serde(default)]
    pub monitor: MonitorConfig,
    /// 需要监控的端点
    #[serde(default)]
    pub endpoints: Vec<String>,
}

/// 监控参数
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MonitorConfig {
    /// 探测间隔（毫秒）
    #[serde(default = "default_interval")]
    pub interval_ms: u64,
    /// 连接超时（毫秒）
    #[serde(default = "default_timeout")]
    pub timeout_ms: u64,
    /// 覆盖HTTP端点的路径
    pub path: Option<String>,
    /// HTTP请求方法
    #[serde(default = "default_method")]
    pub method: String,
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval(),
            timeout_ms: default_timeout(),
            path: None,
            method: default_method(),
            log_level: default_log_level(),
        }
    }
}

// 默认值函数
fn default_interval() -> u64 {
    1000
}
fn default_timeout() -> u64 {
    500
}
fn default_method() -> String {
    "HEAD".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// 转换为监控选项
    pub fn monitor_options(&self) -> MonitorOptions {
        MonitorOptions {
            interval: Duration::from_millis(self.monitor.interval_ms),
            timeout: Duration::from_millis(self.monitor.timeout_ms),
            path: self.monitor.path.clone(),
            method: self.monitor.method.clone(),
        }
    }
}

/// 配置验证函数
///
/// # 参数
/// * `config` - 要验证的配置
///
/// # 返回
/// * `Result<(), String>` - 验证结果，错误时返回错误信息
pub fn validate_config(config: &Config) -> Result<(), String> {
    if config.monitor.interval_ms == 0 {
        return Err("探测间隔不能为0".to_string());
    }

    if config.monitor.timeout_ms == 0 {
        return Err("连接超时时间不能为0".to_string());
    }

    let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_log_levels.contains(&config.monitor.log_level.as_str()) {
        return Err(format!(
            "无效的日志级别: {}，支持的级别: {:?}",
            config.monitor.log_level, valid_log_levels
        ));
    }

    if let Some(ref path) = config.monitor.path {
        if !path.starts_with('/') {
            return Err(format!("HTTP路径必须以 / 开头: {path}"));
        }
    }

    if config.endpoints.is_empty() {
        return Err("至少需要配置一个端点".to_string());
    }

    for endpoint in &config.endpoints {
        Target::parse(endpoint, config.monitor.path.as_deref()).map_err(|e| e.to_string())?;
    }

    Ok(())
}
