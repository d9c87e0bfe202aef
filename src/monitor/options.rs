//! 监控选项

use crate::probe::{ProbeConfig, DEFAULT_METHOD, DEFAULT_TIMEOUT};
use std::time::Duration;

/// 默认探测间隔
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(1000);

/// `monitor` 的选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorOptions {
    /// 上一次结果交付后到下一次探测开始的间隔
    pub interval: Duration,
    /// 连接建立超时
    pub timeout: Duration,
    /// 覆盖所有HTTP端点URL中的路径
    pub path: Option<String>,
    /// HTTP请求方法
    pub method: String,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            timeout: DEFAULT_TIMEOUT,
            path: None,
            method: DEFAULT_METHOD.to_string(),
        }
    }
}

impl MonitorOptions {
    /// 设置探测间隔
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// 设置连接超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 设置HTTP路径覆盖
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// 设置HTTP请求方法
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// 每个目标使用的探测配置
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig {
            timeout: self.timeout,
            method: self.method.clone(),
        }
    }
}

/// 需要监控的端点，可以是单个字符串或字符串序列
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoints(Vec<String>);

impl Endpoints {
    /// 端点数量
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// 遍历端点
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<&str> for Endpoints {
    fn from(endpoint: &str) -> Self {
        Self(vec![endpoint.to_string()])
    }
}

impl From<String> for Endpoints {
    fn from(endpoint: String) -> Self {
        Self(vec![endpoint])
    }
}

impl From<Vec<String>> for Endpoints {
    fn from(endpoints: Vec<String>) -> Self {
        Self(endpoints)
    }
}

impl From<Vec<&str>> for Endpoints {
    fn from(endpoints: Vec<&str>) -> Self {
        endpoints.as_slice().into()
    }
}

impl From<&[&str]> for Endpoints {
    fn from(endpoints: &[&str]) -> Self {
        Self(endpoints.iter().map(|e| e.to_string()).collect())
    }
}

impl From<&[String]> for Endpoints {
    fn from(endpoints: &[String]) -> Self {
        Self(endpoints.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Endpoints {
    fn from(endpoints: [&str; N]) -> Self {
        endpoints.as_slice().into()
    }
}

impl FromIterator<String> for Endpoints {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = MonitorOptions::default();
        assert_eq!(options.interval, Duration::from_millis(1000));
        assert_eq!(options.timeout, Duration::from_millis(500));
        assert!(options.path.is_none());

        let probe_config = options.probe_config();
        assert_eq!(probe_config.method, "HEAD");
        assert_eq!(probe_config.timeout, Duration::from_millis(500));
    }

    #[test]
    fn test_single_and_many_endpoints() {
        let single = Endpoints::from("http://foo.test");
        assert_eq!(single.len(), 1);

        let many = Endpoints::from(["http://foo.test", "tcp://localhost:8949"]);
        assert_eq!(
            many.iter().collect::<Vec<_>>(),
            vec!["http://foo.test", "tcp://localhost:8949"]
        );

        assert!(Endpoints::from(Vec::<String>::new()).is_empty());
    }
}
