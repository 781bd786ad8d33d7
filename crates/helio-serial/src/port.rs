//! 真实串口通道实现
//!
//! 基于 `serialport` crate，8N1、无流控。控制板（Arduino）上电默认 9600 baud。
//!
//! ## 行读取
//!
//! `serialport` 只提供字节流读取，这里自行维护一个行缓冲区：
//! 以较短的分片超时轮询读取，直到收到 `\n` 或总超时到期。

use crate::{SerialChannel, SerialDeviceError, SerialDeviceErrorKind, SerialError};
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::io::{Read, Write};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};

/// 单次底层读取的超时分片
const READ_SLICE: Duration = Duration::from_millis(100);

/// 串口通道
pub struct SerialPortChannel {
    port: Box<dyn SerialPort>,
    /// 串口路径（如 "/dev/ttyACM0"）
    path: String,
    baud_rate: u32,
    /// 已收到但尚未组成完整行的字节
    pending: Vec<u8>,
}

impl SerialPortChannel {
    /// 打开串口
    ///
    /// # Arguments
    /// * `path` - 串口路径（如 "/dev/ttyACM0" 或 "COM3"）
    /// * `baud_rate` - 波特率（如 9600）
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, SerialError> {
        let port = serialport::new(path, baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(READ_SLICE)
            .open()
            .map_err(|e| SerialError::Device(device_error(path, e)))?;

        info!("Opened serial port: {} at {} baud", path, baud_rate);

        Ok(Self {
            port,
            path: path.to_string(),
            baud_rate,
            pending: Vec::with_capacity(64),
        })
    }

    /// 串口路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 波特率
    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }

    /// 从行缓冲区取出一整行（去掉 `\r\n`）
    fn take_line(&mut self) -> Option<String> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

impl SerialChannel for SerialPortChannel {
    fn write_all(&mut self, data: &[u8]) -> Result<(), SerialError> {
        self.port.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), SerialError> {
        self.port.flush()?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<String, SerialError> {
        // 超出 Instant 表示范围的超时视为无限等待
        let deadline = Instant::now().checked_add(timeout);
        let mut buf = [0u8; 64];

        loop {
            if let Some(line) = self.take_line() {
                trace!("Read line from {}: {:?}", self.path, line);
                return Ok(line);
            }

            let now = Instant::now();
            let remaining = deadline.map_or(READ_SLICE, |d| d.saturating_duration_since(now));
            if remaining.is_zero() {
                debug!(
                    "Read timeout on {} ({} bytes buffered)",
                    self.path,
                    self.pending.len()
                );
                return Err(SerialError::Timeout);
            }

            self.port
                .set_timeout(remaining.min(READ_SLICE))
                .map_err(|e| SerialError::Io(e.into()))?;

            match self.port.read(&mut buf) {
                Ok(n) => self.pending.extend_from_slice(&buf[..n]),
                Err(e) if e.kind() == std::io::ErrorKind::TimedOut => {},
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn clear_input(&mut self) -> Result<(), SerialError> {
        if !self.pending.is_empty() {
            trace!("Discarding {} buffered bytes", self.pending.len());
        }
        self.pending.clear();
        self.port
            .clear(ClearBuffer::Input)
            .map_err(|e| SerialError::Io(e.into()))
    }

    fn clear_output(&mut self) -> Result<(), SerialError> {
        self.port
            .clear(ClearBuffer::Output)
            .map_err(|e| SerialError::Io(e.into()))
    }

    fn describe(&self) -> String {
        format!("{}@{}", self.path, self.baud_rate)
    }
}

/// 列出系统中可用的串口
pub fn list_ports() -> Result<Vec<String>, SerialError> {
    let ports = serialport::available_ports().map_err(|e| SerialError::Io(e.into()))?;
    Ok(ports.into_iter().map(|p| p.port_name).collect())
}

fn device_error(path: &str, err: serialport::Error) -> SerialDeviceError {
    let kind = match err.kind() {
        serialport::ErrorKind::NoDevice => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::InvalidInput => SerialDeviceErrorKind::InvalidConfig,
        serialport::ErrorKind::Io(std::io::ErrorKind::NotFound) => SerialDeviceErrorKind::NotFound,
        serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied) => {
            SerialDeviceErrorKind::AccessDenied
        },
        _ => SerialDeviceErrorKind::Backend,
    };
    SerialDeviceError::new(kind, format!("{}: {}", path, err.description))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_missing_port_is_not_found() {
        let result = SerialPortChannel::open("/dev/helio-does-not-exist", 9600);
        match result {
            Err(SerialError::Device(e)) => {
                assert!(e.message.contains("/dev/helio-does-not-exist"));
            },
            Err(other) => panic!("Expected Device error, got {:?}", other),
            Ok(_) => panic!("Opening a missing port should fail"),
        }
    }

    #[test]
    fn test_device_error_mapping() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        let mapped = device_error("/dev/ttyACM0", err);
        assert_eq!(mapped.kind, SerialDeviceErrorKind::NotFound);

        let err = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
            "denied",
        );
        assert_eq!(
            device_error("/dev/ttyACM0", err).kind,
            SerialDeviceErrorKind::AccessDenied
        );
    }
}
