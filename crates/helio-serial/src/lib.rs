//! # Helio Serial Channel Layer
//!
//! 串口硬件抽象层，为控制板通讯提供统一的面向字符的通道接口。
//!
//! - `port`: 基于 `serialport` crate 的真实串口（feature `native`）
//! - `mock`: 脚本化的模拟通道（feature `mock`，用于测试）

use std::time::Duration;
use thiserror::Error;

#[cfg(feature = "native")]
pub mod port;

#[cfg(feature = "native")]
pub use port::{SerialPortChannel, list_ports};

#[cfg(any(test, feature = "mock"))]
pub mod mock;

#[cfg(any(test, feature = "mock"))]
pub use mock::{MockChannel, MockOp, MockReply};

/// 串口通道统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Device Error: {0}")]
    Device(#[from] SerialDeviceError),
    #[error("Read timeout")]
    Timeout,
    #[error("Channel closed")]
    Closed,
}

/// 设备/后端错误的结构化分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialDeviceErrorKind {
    Unknown,
    NotFound,
    AccessDenied,
    InvalidConfig,
    Backend,
}

/// 结构化设备错误
#[derive(Error, Debug, Clone)]
#[error("{kind:?}: {message}")]
pub struct SerialDeviceError {
    pub kind: SerialDeviceErrorKind,
    pub message: String,
}

impl SerialDeviceError {
    pub fn new(kind: SerialDeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<String> for SerialDeviceError {
    fn from(message: String) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

impl From<&str> for SerialDeviceError {
    fn from(message: &str) -> Self {
        Self::new(SerialDeviceErrorKind::Unknown, message)
    }
}

/// 面向字符的串口通道
///
/// 控制板协议是"一问一答"的文本行协议，因此通道只需要：
/// 写入原始字节、按行读取（带超时）、丢弃收发缓冲区。
pub trait SerialChannel {
    /// 写入全部字节
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError>;

    /// 阻塞直到已写入的字节全部发出
    fn flush(&mut self) -> Result<(), SerialError> {
        Ok(())
    }

    /// 读取一行（不含 `\n`），超时返回 [`SerialError::Timeout`]
    fn read_line(&mut self, timeout: Duration) -> Result<String, SerialError>;

    /// 丢弃接收缓冲区中尚未读取的字节
    fn clear_input(&mut self) -> Result<(), SerialError>;

    /// 丢弃发送缓冲区中尚未发出的字节
    fn clear_output(&mut self) -> Result<(), SerialError>;

    /// 同时丢弃收发缓冲区
    fn clear_all(&mut self) -> Result<(), SerialError> {
        self.clear_input()?;
        self.clear_output()
    }

    /// 通道描述（用于日志）
    fn describe(&self) -> String {
        String::from("serial")
    }
}

impl<T: SerialChannel + ?Sized> SerialChannel for Box<T> {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        (**self).write_all(data)
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        (**self).flush()
    }

    fn read_line(&mut self, timeout: Duration) -> Result<String, SerialError> {
        (**self).read_line(timeout)
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        (**self).clear_input()
    }

    fn clear_output(&mut self) -> Result<(), SerialError> {
        (**self).clear_output()
    }

    fn clear_all(&mut self) -> Result<(), SerialError> {
        (**self).clear_all()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_error_display() {
        assert_eq!(format!("{}", SerialError::Timeout), "Read timeout");
        assert_eq!(format!("{}", SerialError::Closed), "Channel closed");

        let err = SerialError::Device(SerialDeviceError::new(
            SerialDeviceErrorKind::NotFound,
            "/dev/ttyACM0",
        ));
        let msg = format!("{}", err);
        assert!(msg.contains("NotFound") && msg.contains("/dev/ttyACM0"));
    }

    #[test]
    fn test_device_error_from_message() {
        let err = SerialDeviceError::from("boom");
        assert_eq!(err.kind, SerialDeviceErrorKind::Unknown);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_boxed_channel_delegates() {
        let mock = MockChannel::new();
        mock.push_line("hello");
        let mut boxed: Box<dyn SerialChannel> = Box::new(mock.clone());
        boxed.write_all(b"INIT").unwrap();
        assert_eq!(boxed.read_line(Duration::from_millis(10)).unwrap(), "hello");
        assert_eq!(mock.written(), vec![b"INIT".to_vec()]);
    }
}
