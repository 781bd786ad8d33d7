//! # Helio CLI
//!
//! Command-line interface for the Helio solar tracker.
//!
//! ```bash
//! # 查看生效配置
//! helio-cli config show
//!
//! # 握手并打印初始角度
//! helio-cli handshake --port /dev/ttyACM0
//!
//! # 执行一步并打印 reward 和状态
//! helio-cli step forward
//!
//! # 每个控制周期执行一次，Ctrl-C 停止
//! helio-cli run --action forward --steps 10
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod settings;

use commands::{ConfigCommand, HandshakeCommand, PortsCommand, RunCommand, StepCommand};
use settings::SettingsArgs;

/// Helio CLI - 太阳能跟踪器命令行工具
#[derive(Parser, Debug)]
#[command(name = "helio-cli")]
#[command(about = "Command-line interface for the Helio solar tracker", long_about = None)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    settings: SettingsArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 配置管理
    #[command(subcommand)]
    Config(ConfigCommand),

    /// 与控制板握手，打印初始角度
    Handshake(HandshakeCommand),

    /// 执行一个动作并取回状态
    Step(StepCommand),

    /// 按控制周期重复执行动作
    Run(RunCommand),

    /// 列出可用串口
    Ports(PortsCommand),
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("helio_cli=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Config(cmd) => cmd.execute(&cli.settings),
        Commands::Handshake(cmd) => cmd.execute(&cli.settings),
        Commands::Step(cmd) => cmd.execute(&cli.settings),
        Commands::Run(cmd) => cmd.execute(&cli.settings),
        Commands::Ports(cmd) => cmd.execute(),
    }
}
