//! 探测目标
//!
//! 把 `scheme://host[:port][/path]` 形式的端点字符串解析为不可变的 [`Target`]

use crate::error::MonitorError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 探测协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scheme {
    /// 明文HTTP
    Http,
    /// HTTP over TLS
    Https,
    /// 原始TCP连接
    Tcp,
}

impl Scheme {
    /// 根据URL中的协议名选择探测方式，除 `tcp`/`https` 外一律按HTTP处理
    pub fn from_scheme_str(scheme: &str) -> Self {
        match scheme.to_ascii_lowercase().as_str() {
            "tcp" => Scheme::Tcp,
            "https" => Scheme::Https,
            _ => Scheme::Http,
        }
    }

    /// 协议默认端口，tcp没有默认端口
    pub fn default_port(&self) -> Option<u16> {
        match self {
            Scheme::Http => Some(80),
            Scheme::Https => Some(443),
            Scheme::Tcp => None,
        }
    }

    /// 是否使用HTTP探测
    pub fn is_http(&self) -> bool {
        !matches!(self, Scheme::Tcp)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scheme::Http => write!(f, "http"),
            Scheme::Https => write!(f, "https"),
            Scheme::Tcp => write!(f, "tcp"),
        }
    }
}

/// 单个被监控端点的描述，调度开始时生成，此后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Target {
    /// 探测协议
    pub scheme: Scheme,
    /// 主机名（IPv6地址不带方括号）
    pub host: String,
    /// 端口
    pub port: u16,
    /// HTTP请求路径，TCP探测忽略该字段
    pub path: String,
    /// 调用方传入的原始端点字符串
    pub identifier: String,
}

impl Target {
    /// 解析端点字符串
    ///
    /// # 参数
    /// * `endpoint` - 端点字符串，例如 `http://foo.test/ok` 或 `tcp://localhost:8949`
    /// * `path_override` - 覆盖URL中路径的HTTP路径，必须以 `/` 开头
    ///
    /// # 返回
    /// * `Result<Self, MonitorError>` - 解析结果
    pub fn parse(endpoint: &str, path_override: Option<&str>) -> Result<Self, MonitorError> {
        let url = Url::parse(endpoint).map_err(|e| MonitorError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let scheme = Scheme::from_scheme_str(url.scheme());

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.trim_start_matches('[').trim_end_matches(']'),
            _ => {
                return Err(MonitorError::MissingHost {
                    endpoint: endpoint.to_string(),
                })
            }
        };

        // Url::port 对协议默认端口返回 None
        let port = match url.port().or_else(|| scheme.default_port()) {
            Some(port) => port,
            None => {
                return Err(MonitorError::MissingPort {
                    endpoint: endpoint.to_string(),
                })
            }
        };

        let path = match path_override.filter(|p| !p.is_empty()) {
            Some(path) if !path.starts_with('/') => {
                return Err(MonitorError::InvalidEndpoint {
                    endpoint: endpoint.to_string(),
                    reason: format!("路径必须以 / 开头: {path}"),
                })
            }
            Some(path) => path.to_string(),
            None => Self::path_of(&url),
        };

        Ok(Self {
            scheme,
            host: host.to_string(),
            port,
            path,
            identifier: endpoint.to_string(),
        })
    }

    /// URL中的路径和查询串，为空时返回 `/`
    fn path_of(url: &Url) -> String {
        let mut path = url.path().to_string();
        if path.is_empty() {
            path.push('/');
        }
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }
        path
    }

    /// `host:port` 形式的地址
    pub fn address(&self) -> String {
        format!("{}:{}", self.authority_host(), self.port)
    }

    /// HTTP探测实际请求的URL
    pub fn url(&self) -> String {
        let scheme = match self.scheme {
            Scheme::Https => "https",
            _ => "http",
        };
        format!("{}://{}{}", scheme, self.address(), self.path)
    }

    fn authority_host(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
    }
}
