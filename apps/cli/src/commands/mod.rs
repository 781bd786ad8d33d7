//! 命令定义和实现

pub mod config;
pub mod handshake;
pub mod ports;
pub mod run;
pub mod step;

pub use config::ConfigCommand;
pub use handshake::HandshakeCommand;
pub use ports::PortsCommand;
pub use run::RunCommand;
pub use step::StepCommand;

use anyhow::{Context, Result};
use helio_client::{SolarTracker, TrackerBuilder, WorldState};
use helio_tools::TrackerConfig;

/// 按配置打开跟踪器（握手 + 相机 + 初始状态）
pub(crate) fn open_tracker(config: TrackerConfig) -> Result<SolarTracker> {
    let port = config.serial_port.clone();
    TrackerBuilder::new(config)
        .build()
        .with_context(|| format!("Failed to open tracker on {}", port))
}

/// 单步结果的 JSON 摘要
pub(crate) fn step_summary(index: u64, reward: f64, state: &WorldState) -> serde_json::Value {
    serde_json::json!({
        "step": index,
        "reward": reward,
        "timestamp": state.timestamp().to_rfc3339(),
        "angleEw": state.panel().angle_ew,
        "angleNs": state.panel().angle_ns,
        "sunAzimuth": state.sun_azimuth(),
        "sunAltitude": state.sun_altitude(),
        "imageFeatures": state.image().map(|i| i.len()).unwrap_or(0),
    })
}
