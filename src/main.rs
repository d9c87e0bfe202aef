//! Service Pulse 主程序入口
//!
//! 周期性探测HTTP/TCP端点的存活状态

use anyhow::{Context, Result};
use clap::Parser;
use service_pulse::cli::args::{Args, Commands};
use service_pulse::cli::commands::{
    resolve_log_level, CheckCommand, Command, InitCommand, ValidateCommand, WatchCommand,
};
use service_pulse::logging::{LogConfig, LoggingSystem};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // 解析命令行参数
    let args = Args::parse();

    // 初始化日志系统
    let log_config = LogConfig {
        level: resolve_log_level(&args).await,
        file_path: args.log_file.clone(),
        json_format: args.json_logs,
    };

    let logging_system = LoggingSystem::setup_logging(log_config).context("初始化日志系统失败")?;

    info!(
        "Service Pulse v{} 启动，日志级别: {}",
        service_pulse::VERSION,
        logging_system.config().level
    );

    // 执行命令
    if let Err(e) = execute_command(&args).await {
        error!("命令执行失败: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// 执行CLI命令
async fn execute_command(args: &Args) -> Result<()> {
    let command: Box<dyn Command> = match &args.command {
        Commands::Watch { .. } => Box::new(WatchCommand),
        Commands::Check { .. } => Box::new(CheckCommand),
        Commands::Init { .. } => Box::new(InitCommand),
        Commands::Validate { .. } => Box::new(ValidateCommand),
    };

    command.execute(args).await.map_err(|e| anyhow::anyhow!(e))
}
