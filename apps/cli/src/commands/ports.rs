//! ports 命令

use anyhow::{Context, Result};
use clap::Args;

/// 列出可用串口
#[derive(Args, Debug)]
pub struct PortsCommand {}

impl PortsCommand {
    pub fn execute(&self) -> Result<()> {
        let ports = helio_serial::list_ports().context("Failed to enumerate serial ports")?;
        if ports.is_empty() {
            println!("(no serial ports found)");
        }
        for port in ports {
            println!("{}", port);
        }
        Ok(())
    }
}
