//! 驱动层模块
//!
//! 本模块提供太阳能跟踪器的设备驱动功能，包括：
//! - 串口链路（握手、命令交换、超时、失效标记）
//! - 相机图像管线（灰度化、降采样、展平）
//!
//! # 使用场景
//!
//! 适用于需要直接收发控制板命令的场景。
//! 大多数用户应该使用 `helio-client` 提供的 `SolarTracker`（包含状态机和状态合成）。

mod builder;
pub mod camera;
mod error;
pub mod link;

pub use builder::{
    DEFAULT_BAUD_RATE, DEFAULT_RESPONSE_TIMEOUT, DEFAULT_SERIAL_PORT, DeviceLinkBuilder,
};
pub use camera::{
    BoxedFrameSource, DEFAULT_DOWNSAMPLE, FrameSource, ImageFeatures, ImagePipeline,
    StillImageSource, downsample,
};
#[cfg(feature = "opencv")]
pub use camera::VideoCaptureSource;
pub use error::{CaptureError, DriverError};
pub use link::{BoxedChannel, DeviceLink};
