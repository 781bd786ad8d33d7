//! 驱动层错误类型定义

use helio_protocol::ProtocolError;
use helio_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型（串口链路）
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口通道错误
    #[error("Serial channel error: {0}")]
    Serial(#[from] SerialError),

    /// 协议错误（握手失败、应答格式错误、读超时）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 无效配置
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// 相机采集错误
#[derive(Error, Debug)]
pub enum CaptureError {
    /// 相机未打开
    #[error("Camera not open: {0}")]
    NotOpen(String),

    /// 没有可用帧
    #[error("No frame available: {0}")]
    NoFrame(String),

    /// 图像解码错误
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// 目标尺寸无效
    #[error("Invalid target size {width}x{height}")]
    InvalidTarget { width: u32, height: u32 },

    /// 特征向量长度与尺寸不符
    #[error("Feature length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// 相机后端错误
    #[error("Camera backend error: {0}")]
    Backend(String),
}
