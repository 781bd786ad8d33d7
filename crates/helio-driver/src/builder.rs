//! Builder 模式实现
//!
//! 提供链式构造 `DeviceLink` 实例的便捷方式。

use crate::error::DriverError;
use crate::link::{BoxedChannel, DeviceLink};
use helio_serial::SerialChannel;
use std::time::Duration;

pub use helio_protocol::{DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT};

/// 默认应答超时
pub const DEFAULT_RESPONSE_TIMEOUT: Duration =
    Duration::from_secs(helio_protocol::DEFAULT_RESPONSE_TIMEOUT_SECS);

/// DeviceLink Builder（链式构造）
///
/// # Example
///
/// ```no_run
/// use helio_driver::DeviceLinkBuilder;
/// use std::time::Duration;
///
/// let link = DeviceLinkBuilder::new()
///     .port("/dev/ttyACM0")
///     .baud_rate(9600)
///     .response_timeout(Duration::from_secs(30))
///     .build()
///     .unwrap();
/// println!("initial angle: {}", link.initial_angle());
/// ```
#[derive(Debug, Clone)]
pub struct DeviceLinkBuilder {
    /// 串口路径（可选，默认按平台选择）
    port: Option<String>,
    /// 波特率（可选，默认 9600）
    baud_rate: Option<u32>,
    /// 应答超时（可选，默认 120s）
    response_timeout: Option<Duration>,
}

impl DeviceLinkBuilder {
    /// 创建新的 Builder
    pub fn new() -> Self {
        Self {
            port: None,
            baud_rate: None,
            response_timeout: None,
        }
    }

    /// 设置串口路径
    pub fn port(mut self, port: impl Into<String>) -> Self {
        self.port = Some(port.into());
        self
    }

    /// 设置波特率
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = Some(baud_rate);
        self
    }

    /// 设置应答超时
    pub fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = Some(timeout);
        self
    }

    fn resolved_timeout(&self) -> Result<Duration, DriverError> {
        let timeout = self.response_timeout.unwrap_or(DEFAULT_RESPONSE_TIMEOUT);
        if timeout.is_zero() {
            return Err(DriverError::InvalidConfig(
                "response timeout must be greater than zero".to_string(),
            ));
        }
        Ok(timeout)
    }

    /// 在给定通道上握手（测试 / 自定义传输）
    pub fn build_with_channel<C: SerialChannel>(
        self,
        channel: C,
    ) -> Result<DeviceLink<C>, DriverError> {
        let timeout = self.resolved_timeout()?;
        DeviceLink::open(channel, timeout)
    }

    /// 打开真实串口并握手
    ///
    /// # Errors
    /// - `DriverError::Serial`: 串口打开失败
    /// - `DriverError::Protocol`: 握手失败或超时
    #[cfg(feature = "native")]
    pub fn build(self) -> Result<DeviceLink<BoxedChannel>, DriverError> {
        let port = self.port.as_deref().unwrap_or(DEFAULT_SERIAL_PORT);
        let baud_rate = self.baud_rate.unwrap_or(DEFAULT_BAUD_RATE);
        if baud_rate == 0 {
            return Err(DriverError::InvalidConfig(
                "baud rate must be greater than zero".to_string(),
            ));
        }
        let timeout = self.resolved_timeout()?;

        let channel = helio_serial::SerialPortChannel::open(port, baud_rate)?;
        DeviceLink::open(Box::new(channel) as BoxedChannel, timeout)
    }
}

impl Default for DeviceLinkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "native")]
impl DeviceLink<BoxedChannel> {
    /// 打开串口、丢弃缓冲并握手，返回链路（初始角度见 [`DeviceLink::initial_angle`]）
    pub fn open_port(port: &str, baud_rate: u32, timeout: Duration) -> Result<Self, DriverError> {
        DeviceLinkBuilder::new()
            .port(port)
            .baud_rate(baud_rate)
            .response_timeout(timeout)
            .build()
    }
}
