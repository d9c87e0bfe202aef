//! 命令行参数定义
//!
//! 使用clap定义应用程序的命令行接口

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Service Pulse - 端点存活监控工具
#[derive(Parser, Debug, Clone)]
#[command(
    name = "service-pulse",
    version = crate::VERSION,
    about = crate::APP_DESCRIPTION,
    long_about = None
)]
pub struct Args {
    /// 配置文件路径
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "配置文件路径",
        env = "SERVICE_PULSE_CONFIG",
        global = true
    )]
    pub config: Option<PathBuf>,

    /// 日志级别，未指定时使用配置文件中的 log_level
    #[arg(
        short,
        long,
        value_enum,
        help = "日志级别",
        env = "SERVICE_PULSE_LOG_LEVEL",
        global = true
    )]
    pub log_level: Option<LogLevel>,

    /// 日志文件路径
    #[arg(long, value_name = "FILE", help = "日志写入文件而不是控制台", global = true)]
    pub log_file: Option<PathBuf>,

    /// 以JSON格式输出日志
    #[arg(long, help = "以JSON格式输出日志", global = true)]
    pub json_logs: bool,

    /// 子命令
    #[command(subcommand)]
    pub command: Commands,
}

/// 日志级别枚举
#[derive(ValueEnum, Clone, Debug, PartialEq)]
pub enum LogLevel {
    /// 跟踪级别
    Trace,
    /// 调试级别
    Debug,
    /// 信息级别
    Info,
    /// 警告级别
    Warn,
    /// 错误级别
    Error,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

/// 探测参数，命令行的值覆盖配置文件
#[derive(clap::Args, Debug, Clone, Default, PartialEq)]
pub struct ProbeArgs {
    /// 要探测的端点，不指定时使用配置文件中的端点
    #[arg(value_name = "ENDPOINT", help = "端点，例如 http://localhost:8080 或 tcp://localhost:5432")]
    pub endpoints: Vec<String>,

    /// 探测间隔（毫秒）
    #[arg(short, long, value_name = "MS", help = "探测间隔（毫秒）", env = "SERVICE_PULSE_INTERVAL")]
    pub interval: Option<u64>,

    /// 连接超时（毫秒）
    #[arg(short, long, value_name = "MS", help = "连接超时（毫秒）", env = "SERVICE_PULSE_TIMEOUT")]
    pub timeout: Option<u64>,

    /// 覆盖HTTP端点的路径
    #[arg(short, long, value_name = "PATH", help = "覆盖HTTP端点的路径")]
    pub path: Option<String>,

    /// HTTP请求方法
    #[arg(short, long, value_name = "METHOD", help = "HTTP请求方法")]
    pub method: Option<String>,

    /// 输出格式
    #[arg(short, long, value_enum, default_value = "text", help = "输出格式")]
    pub format: OutputFormat,
}

/// 子命令定义
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// 持续监控端点，直到按下 Ctrl-C
    Watch {
        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// 对每个端点执行一次探测
    Check {
        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// 初始化配置文件
    Init {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径", default_value = "pulse.toml")]
        config_path: PathBuf,

        /// 是否覆盖现有文件
        #[arg(short, long, help = "覆盖现有文件")]
        force: bool,
    },

    /// 验证配置文件
    Validate {
        /// 配置文件路径
        #[arg(value_name = "FILE", help = "配置文件路径")]
        config_path: Option<PathBuf>,

        /// 是否显示详细信息
        #[arg(short, long, help = "显示详细信息")]
        verbose: bool,
    },
}

/// 输出格式枚举
#[derive(ValueEnum, Clone, Debug, Default, PartialEq)]
pub enum OutputFormat {
    /// 文本格式
    #[default]
    Text,
    /// JSON格式（每行一个结果）
    Json,
}

impl Args {
    /// 解析命令行参数
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// 获取配置文件路径
    pub fn get_config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::get_default_config_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_watch_command() {
        let args = Args::try_parse_from([
            "service-pulse",
            "watch",
            "http://foo.test",
            "tcp://localhost:8949",
            "--interval",
            "250",
            "--path",
            "/ok",
        ])
        .unwrap();

        match args.command {
            Commands::Watch { probe } => {
                assert_eq!(probe.endpoints.len(), 2);
                assert_eq!(probe.interval, Some(250));
                assert_eq!(probe.path.as_deref(), Some("/ok"));
                assert_eq!(probe.format, OutputFormat::Text);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_check_with_json_output() {
        let args = Args::try_parse_from([
            "service-pulse",
            "--log-level",
            "debug",
            "check",
            "-f",
            "json",
        ])
        .unwrap();

        assert_eq!(args.log_level, Some(LogLevel::Debug));
        match args.command {
            Commands::Check { probe } => {
                assert!(probe.endpoints.is_empty());
                assert_eq!(probe.format, OutputFormat::Json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_explicit_config_path() {
        let args =
            Args::try_parse_from(["service-pulse", "validate", "--config", "/etc/pulse.toml"])
                .unwrap();
        assert_eq!(args.get_config_path(), PathBuf::from("/etc/pulse.toml"));
        assert_eq!(args.log_file, None);
    }
}
