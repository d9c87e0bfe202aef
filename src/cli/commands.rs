//! 命令处理逻辑
//!
//! 实现各种CLI命令的处理逻辑

use crate::cli::args::{Args, Commands, OutputFormat, ProbeArgs};
use crate::config::{validate_config, Config, TomlConfigLoader, SAMPLE_CONFIG};
use crate::error::{ConfigError, Result};
use crate::logging::{parse_level, LoggingSystem};
use crate::monitor::{monitor, MonitorOptions};
use crate::probe::{Probe, ProbeOutcome, ProbeReport, Target};
use async_trait::async_trait;
use log::LevelFilter;
use std::path::Path;
use tokio::sync::mpsc;
use tracing::info;

/// 命令处理器trait
#[async_trait]
pub trait Command: Send + Sync {
    /// 执行命令
    async fn execute(&self, args: &Args) -> Result<()>;
}

/// 合并配置文件与命令行参数，得到最终的端点和监控选项
///
/// 命令行给出了端点时不读取配置文件。
pub async fn resolve_probe_settings(
    args: &Args,
    probe: &ProbeArgs,
) -> Result<(Vec<String>, MonitorOptions)> {
    let mut config = if probe.endpoints.is_empty() {
        TomlConfigLoader::default()
            .load_from_file(args.get_config_path())
            .await?
    } else {
        Config {
            monitor: Default::default(),
            endpoints: probe.endpoints.clone(),
        }
    };

    if let Some(interval) = probe.interval {
        config.monitor.interval_ms = interval;
    }
    if let Some(timeout) = probe.timeout {
        config.monitor.timeout_ms = timeout;
    }
    if let Some(ref path) = probe.path {
        config.monitor.path = Some(path.clone());
    }
    if let Some(ref method) = probe.method {
        config.monitor.method = method.clone();
    }

    validate_config(&config).map_err(ConfigError::ValidationError)?;

    let options = config.monitor_options();
    Ok((config.endpoints, options))
}

/// 命令行指定的日志级别优先，其次是配置文件中的 log_level，都没有时为 info
pub async fn resolve_log_level(args: &Args) -> LevelFilter {
    if let Some(ref level) = args.log_level {
        return level.clone().into();
    }

    TomlConfigLoader::default()
        .load_from_file(args.get_config_path())
        .await
        .map(|config| parse_level(&config.monitor.log_level))
        .unwrap_or(LevelFilter::Info)
}

/// 按输出格式打印一条探测报告
fn print_report(report: &ProbeReport, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", report.to_json()?),
        OutputFormat::Text => {
            let status_icon = if report.healthy { "✓" } else { "✗" };
            let detail = report.error_message.as_deref().unwrap_or("healthy");
            match report.elapsed_ms() {
                Some(ms) => println!("{} {} - {} ({}ms)", status_icon, report.endpoint, detail, ms),
                None => println!("{} {} - {}", status_icon, report.endpoint, detail),
            }
        }
    }
    Ok(())
}

/// 持续监控命令
pub struct WatchCommand;

#[async_trait]
impl Command for WatchCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Watch { probe } = &args.command {
            self.watch(args, probe).await
        } else {
            Ok(())
        }
    }
}

impl WatchCommand {
    /// 启动监控并打印结果，直到收到 Ctrl-C
    async fn watch(&self, args: &Args, probe: &ProbeArgs) -> Result<()> {
        let (endpoints, options) = resolve_probe_settings(args, probe).await?;

        let (tx, mut rx) = mpsc::unbounded_channel::<ProbeReport>();
        let handle = monitor(endpoints, options, move |outcome: ProbeOutcome, endpoint: &str| {
            let _ = tx.send(ProbeReport::new(endpoint, &outcome));
        })?;

        info!("正在监控 {} 个端点，按 Ctrl-C 停止", handle.len());

        loop {
            tokio::select! {
                report = rx.recv() => match report {
                    Some(report) => {
                        LoggingSystem::probe_log(&report);
                        print_report(&report, &probe.format)?;
                    }
                    None => break,
                },
                signal = tokio::signal::ctrl_c() => {
                    signal?;
                    info!("收到中断信号，停止监控");
                    break;
                }
            }
        }

        handle.shutdown().await;
        Ok(())
    }
}

/// 一次性探测命令
pub struct CheckCommand;

#[async_trait]
impl Command for CheckCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Check { probe } = &args.command {
            let all_healthy = self.check(args, probe).await?;
            if !all_healthy {
                return Err(anyhow::anyhow!("存在不健康的端点").into());
            }
        }
        Ok(())
    }
}

impl CheckCommand {
    /// 并发探测每个端点一次，返回是否全部健康
    pub async fn check(&self, args: &Args, probe: &ProbeArgs) -> Result<bool> {
        let (endpoints, options) = resolve_probe_settings(args, probe).await?;
        let probe_config = options.probe_config();

        let probes = endpoints
            .iter()
            .map(|endpoint| {
                let target = Target::parse(endpoint, options.path.as_deref())?;
                Probe::for_target(target, probe_config.clone())
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let reports =
            futures::future::join_all(probes.iter().map(|probe| probe.run_report())).await;

        let mut all_healthy = true;
        for (outcome, report) in reports {
            all_healthy &= outcome.is_healthy();
            LoggingSystem::probe_log(&report);
            print_report(&report, &probe.format)?;
        }

        Ok(all_healthy)
    }
}

/// 初始化命令
pub struct InitCommand;

#[async_trait]
impl Command for InitCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Init { config_path, force } = &args.command {
            self.create_config_file(config_path, *force).await
        } else {
            Ok(())
        }
    }
}

impl InitCommand {
    /// 创建配置文件
    pub async fn create_config_file(&self, config_path: &Path, force: bool) -> Result<()> {
        if config_path.exists() && !force {
            eprintln!("配置文件已存在: {}", config_path.display());
            eprintln!("使用 --force 参数覆盖现有文件");
            return Ok(());
        }

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        tokio::fs::write(config_path, SAMPLE_CONFIG).await?;

        println!("配置文件已创建: {}", config_path.display());
        println!("请编辑配置文件以添加需要监控的端点");

        Ok(())
    }
}

/// 验证命令
pub struct ValidateCommand;

#[async_trait]
impl Command for ValidateCommand {
    async fn execute(&self, args: &Args) -> Result<()> {
        if let Commands::Validate {
            config_path,
            verbose,
        } = &args.command
        {
            let config_file = config_path
                .clone()
                .unwrap_or_else(|| args.get_config_path());

            self.validate_config_file(&config_file, *verbose).await
        } else {
            Ok(())
        }
    }
}

impl ValidateCommand {
    /// 验证配置文件
    pub async fn validate_config_file(&self, config_path: &Path, verbose: bool) -> Result<()> {
        println!("验证配置文件: {}", config_path.display());

        let loader = TomlConfigLoader::new(true);
        let config = loader.load_from_file(config_path).await?;

        if verbose {
            println!("配置验证通过！");
            println!("监控参数:");
            println!("  探测间隔: {}毫秒", config.monitor.interval_ms);
            println!("  连接超时: {}毫秒", config.monitor.timeout_ms);
            println!("  请求方法: {}", config.monitor.method);
            if let Some(ref path) = config.monitor.path {
                println!("  路径覆盖: {path}");
            }

            println!("端点:");
            for (i, endpoint) in config.endpoints.iter().enumerate() {
                println!("  {}. {}", i + 1, endpoint);
            }
        } else {
            println!("✓ 配置文件验证通过");
            println!("✓ 找到 {} 个端点", config.endpoints.len());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::time::Duration;
    use tempfile::TempDir;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv).unwrap()
    }

    fn probe_args(args: &Args) -> &ProbeArgs {
        match &args.command {
            Commands::Watch { probe } | Commands::Check { probe } => probe,
            _ => panic!("not a probe command"),
        }
    }

    #[tokio::test]
    async fn test_cli_endpoints_skip_config_file() {
        let args = parse(&[
            "service-pulse",
            "--config",
            "/nonexistent/pulse.toml",
            "check",
            "tcp://localhost:8949",
            "--timeout",
            "100",
        ]);

        let (endpoints, options) = resolve_probe_settings(&args, probe_args(&args))
            .await
            .unwrap();

        assert_eq!(endpoints, vec!["tcp://localhost:8949"]);
        assert_eq!(options.timeout, Duration::from_millis(100));
        assert_eq!(options.interval, Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_cli_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("pulse.toml");
        InitCommand
            .create_config_file(&config_path, false)
            .await
            .unwrap();

        let config_arg = config_path.to_string_lossy().to_string();
        let args = parse(&[
            "service-pulse",
            "--config",
            &config_arg,
            "watch",
            "--interval",
            "50",
            "--path",
            "/ok",
        ]);

        let (endpoints, options) = resolve_probe_settings(&args, probe_args(&args))
            .await
            .unwrap();

        assert_eq!(endpoints.len(), 2);
        assert_eq!(options.interval, Duration::from_millis(50));
        assert_eq!(options.path.as_deref(), Some("/ok"));
    }

    #[tokio::test]
    async fn test_log_level_falls_back_to_config_file() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("pulse.toml");
        tokio::fs::write(
            &config_path,
            "endpoints = [\"tcp://localhost:8949\"]\n\n[monitor]\nlog_level = \"debug\"\n",
        )
        .await
        .unwrap();
        let config_arg = config_path.to_string_lossy().to_string();

        let args = parse(&["service-pulse", "--config", &config_arg, "check"]);
        assert_eq!(resolve_log_level(&args).await, LevelFilter::Debug);

        let args = parse(&["service-pulse", "-c", &config_arg, "-l", "warn", "check"]);
        assert_eq!(resolve_log_level(&args).await, LevelFilter::Warn);

        let args = parse(&["service-pulse", "-c", "/nonexistent/pulse.toml", "check"]);
        assert_eq!(resolve_log_level(&args).await, LevelFilter::Info);
    }

    #[tokio::test]
    async fn test_invalid_cli_endpoint_is_rejected() {
        let args = parse(&["service-pulse", "check", "tcp://localhost"]);
        let result = resolve_probe_settings(&args, probe_args(&args)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_check_reports_unhealthy_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let endpoint = format!("tcp://127.0.0.1:{port}");
        let args = parse(&["service-pulse", "check", &endpoint, "-f", "json"]);

        let all_healthy = CheckCommand
            .check(&args, probe_args(&args))
            .await
            .unwrap();
        assert!(!all_healthy);
        assert!(CheckCommand.execute(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_init_does_not_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("pulse.toml");
        tokio::fs::write(&config_path, "endpoints = []").await.unwrap();

        InitCommand
            .create_config_file(&config_path, false)
            .await
            .unwrap();
        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert_eq!(content, "endpoints = []");

        InitCommand
            .create_config_file(&config_path, true)
            .await
            .unwrap();
        let content = tokio::fs::read_to_string(&config_path).await.unwrap();
        assert_eq!(content, SAMPLE_CONFIG);
    }

    #[tokio::test]
    async fn test_validate_sample_config() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("pulse.toml");
        InitCommand
            .create_config_file(&config_path, false)
            .await
            .unwrap();

        assert!(ValidateCommand
            .validate_config_file(&config_path, true)
            .await
            .is_ok());
    }
}
