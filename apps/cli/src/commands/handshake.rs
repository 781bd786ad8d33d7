//! handshake 命令
//!
//! 打开串口、握手并打印控制板报告的初始角度。

use anyhow::{Context, Result};
use clap::Args;
use helio_driver::DeviceLinkBuilder;

use crate::settings::SettingsArgs;

/// 握手命令参数
#[derive(Args, Debug)]
pub struct HandshakeCommand {}

impl HandshakeCommand {
    pub fn execute(&self, settings: &SettingsArgs) -> Result<()> {
        let config = settings.load()?;

        println!("⏳ Connecting to {} @ {} baud", config.serial_port, config.baud_rate);
        let link = DeviceLinkBuilder::new()
            .port(config.serial_port.as_str())
            .baud_rate(config.baud_rate)
            .response_timeout(config.response_timeout())
            .build()
            .with_context(|| format!("Handshake with {} failed", config.serial_port))?;

        println!("✅ Initial angle: {}", link.initial_angle());
        Ok(())
    }
}
