//! 配置加载
//!
//! 读取TOML配置文件，替换 `${VAR}` 形式的环境变量并校验结果

use crate::config::types::{validate_config, Config};
use crate::error::{ConfigError, Result};
use regex::{Captures, Regex};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// `${VAR_NAME}` 形式的环境变量引用
fn env_var_pattern() -> Result<&'static Regex> {
    static PATTERN: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();

    PATTERN
        .get_or_init(|| Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}"))
        .as_ref()
        .map_err(|e| ConfigError::ParseError(format!("正则表达式错误: {e}")).into())
}

/// TOML配置加载器
#[derive(Debug, Clone)]
pub struct TomlConfigLoader {
    /// 是否启用环境变量替换
    enable_env_substitution: bool,
}

impl Default for TomlConfigLoader {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TomlConfigLoader {
    /// 创建配置加载器
    pub fn new(enable_env_substitution: bool) -> Self {
        Self {
            enable_env_substitution,
        }
    }

    /// 读取、解析并校验配置文件
    pub async fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<Config> {
        let path = path.as_ref();

        let content = tokio::fs::read_to_string(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => ConfigError::ParseError(format!("读取 {} 失败: {e}", path.display())),
        })?;

        let config = self.load_from_string(&content).await?;
        tracing::info!(
            "已加载配置 {}，端点数量: {}",
            path.display(),
            config.endpoints.len()
        );
        Ok(config)
    }

    /// 解析并校验配置内容
    pub async fn load_from_string(&self, content: &str) -> Result<Config> {
        let content = if self.enable_env_substitution {
            substitute_env_vars(content)?
        } else {
            content.to_string()
        };

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(format!("TOML解析失败: {e}")))?;
        validate_config(&config).map_err(ConfigError::ValidationError)?;

        tracing::debug!("配置内容: {:?}", config);
        Ok(config)
    }
}

/// 替换每行注释之前部分中的环境变量，注释原样保留
fn substitute_env_vars(content: &str) -> Result<String> {
    let pattern = env_var_pattern()?;
    let mut output = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        let (code, comment) = line.split_at(comment_start(line));

        let mut missing = None;
        let replaced = pattern.replace_all(code, |caps: &Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| {
                missing.get_or_insert_with(|| caps[1].to_string());
                String::new()
            })
        });

        if let Some(var) = missing {
            return Err(ConfigError::EnvVarError { var }.into());
        }

        output.push_str(&replaced);
        output.push_str(comment);
    }

    Ok(output)
}

/// 行内第一个不在字符串中的 `#` 的位置，没有注释时为行长度
fn comment_start(line: &str) -> usize {
    let mut quote = None;
    let mut escaped = false;

    for (i, c) in line.char_indices() {
        match quote {
            Some('"') if escaped => escaped = false,
            Some('"') if c == '\\' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == '#' => return i,
            None => {}
        }
    }

    line.len()
}

/// 获取默认配置文件路径
///
/// 当前目录下的 `pulse.toml` 优先，否则使用用户配置目录
pub fn get_default_config_path() -> PathBuf {
    if Path::new("pulse.toml").exists() {
        return PathBuf::from("pulse.toml");
    }

    dirs::config_dir()
        .map(|config_dir| config_dir.join("service-pulse").join("pulse.toml"))
        .unwrap_or_else(|| PathBuf::from("pulse.toml"))
}

/// `init` 命令写出的示例配置
pub const SAMPLE_CONFIG: &str = r#"# Service Pulse 配置文件

# http(s):// 端点要求状态码为200，tcp:// 端点必须指定端口
endpoints = [
    "http://localhost:8080/health",
    "tcp://localhost:5432",
]

[monitor]
# 上一次结果交付后到下一次探测的间隔（毫秒）
interval_ms = 1000
# 连接建立超时（毫秒）
timeout_ms = 500
# HTTP请求方法
method = "HEAD"
# 覆盖所有HTTP端点的路径
# path = "/health"
log_level = "info"
"#;
