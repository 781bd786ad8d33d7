//! Client 层 Tracker Builder
//!
//! 由 [`TrackerConfig`] 创建 [`ControlStep`]：握手 → 打开相机 → 采集初始帧 → 合成初始状态。

use crate::error::ClientError;
use crate::state::{BoxedSunProvider, StateBuilder};
use crate::tracker::{BoxedClock, ControlStep};
use helio_driver::{CaptureError, DeviceLink, DeviceLinkBuilder, FrameSource, ImagePipeline};
use helio_serial::SerialChannel;
use helio_tools::{Clock, SolarCalculator, SunPositionProvider, SystemClock, TrackerConfig};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

#[cfg(feature = "native")]
use crate::tracker::SolarTracker;
#[cfg(feature = "native")]
use helio_driver::BoxedFrameSource;

/// Tracker Builder
///
/// # 示例
///
/// ```rust,no_run
/// use helio_client::TrackerBuilder;
/// use helio_tools::TrackerConfig;
///
/// # fn main() -> Result<(), helio_client::ClientError> {
/// let config = TrackerConfig::new(41.82, -71.4128);
/// let mut tracker = TrackerBuilder::new(config).build()?;
///
/// let reward = tracker.execute_action(&helio_protocol::ActionCommand::Forward)?;
/// let state = tracker.retrieve_state()?;
/// println!("reward {} at angle {}", reward, state.panel().angle_ns);
/// # Ok(())
/// # }
/// ```
pub struct TrackerBuilder {
    config: TrackerConfig,
    sun_provider: Option<BoxedSunProvider>,
    clock: Option<BoxedClock>,
    start_time: Option<DateTime<Utc>>,
    #[cfg(feature = "native")]
    frame_source: Option<BoxedFrameSource>,
}

impl TrackerBuilder {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            sun_provider: None,
            clock: None,
            start_time: None,
            #[cfg(feature = "native")]
            frame_source: None,
        }
    }

    /// 从 TOML 配置文件创建
    pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        Ok(Self::new(TrackerConfig::load_from_file(path)?))
    }

    /// 替换太阳位置计算器（默认 NOAA）
    pub fn sun_provider(mut self, provider: impl SunPositionProvider + Send + 'static) -> Self {
        self.sun_provider = Some(Box::new(provider));
        self
    }

    /// 替换时钟（默认系统时钟）
    pub fn clock(mut self, clock: impl Clock + Send + 'static) -> Self {
        self.clock = Some(Box::new(clock));
        self
    }

    /// 初始状态的时刻（默认取时钟当前时间）
    ///
    /// 只影响构建时合成的初始状态，之后每一步仍使用时钟时间。
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// 指定帧源（优先于配置中的 `imagePath` / `cameraIndex`）
    #[cfg(feature = "native")]
    pub fn frame_source(mut self, source: impl FrameSource + Send + 'static) -> Self {
        self.frame_source = Some(Box::new(source));
        self
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// 在给定通道和帧源上构建（测试 / 自定义传输）
    ///
    /// `useImage = false` 时忽略 `frame_source`。
    pub fn build_with<C: SerialChannel, S: FrameSource>(
        self,
        channel: C,
        frame_source: Option<S>,
    ) -> Result<ControlStep<C, S>, ClientError> {
        self.config.validate()?;
        let link = DeviceLinkBuilder::new()
            .response_timeout(self.config.response_timeout())
            .build_with_channel(channel)?;
        self.finish(link, frame_source)
    }

    /// 打开配置中的串口和相机并构建
    ///
    /// 帧源选择顺序：`frame_source()` → `imagePath` → 视频设备 `cameraIndex`（feature `opencv`）。
    #[cfg(feature = "native")]
    pub fn build(mut self) -> Result<SolarTracker, ClientError> {
        self.config.validate()?;
        let link = DeviceLinkBuilder::new()
            .port(self.config.serial_port.as_str())
            .baud_rate(self.config.baud_rate)
            .response_timeout(self.config.response_timeout())
            .build()?;

        let source = if self.config.use_image {
            match self.frame_source.take() {
                Some(source) => Some(source),
                None => Some(open_frame_source(&self.config)?),
            }
        } else {
            None
        };
        self.finish(link, source)
    }

    fn finish<C: SerialChannel, S: FrameSource>(
        self,
        link: DeviceLink<C>,
        frame_source: Option<S>,
    ) -> Result<ControlStep<C, S>, ClientError> {
        let config = self.config;
        let camera = if config.use_image {
            let source = frame_source.ok_or_else(|| {
                CaptureError::NotOpen("image capture enabled but no frame source".to_string())
            })?;
            info!(
                "Image capture enabled: {} -> {}x{}",
                source.describe(),
                config.downsample_width,
                config.downsample_height
            );
            Some(ImagePipeline::new(
                source,
                config.downsample_width,
                config.downsample_height,
            )?)
        } else {
            info!("Image capture disabled");
            None
        };

        let provider = self
            .sun_provider
            .unwrap_or_else(|| Box::new(SolarCalculator));
        let clock = self.clock.unwrap_or_else(|| Box::new(SystemClock));
        let start_time = self.start_time.unwrap_or_else(|| clock.now());
        let state_builder =
            StateBuilder::new(config.latitude_degrees, config.longitude_degrees, provider);

        ControlStep::new(
            link,
            camera,
            state_builder,
            clock,
            start_time,
            config.panel_step_radians,
        )
    }
}

/// 按配置打开帧源
#[cfg(feature = "native")]
fn open_frame_source(config: &TrackerConfig) -> Result<BoxedFrameSource, CaptureError> {
    if let Some(path) = &config.image_path {
        return Ok(Box::new(helio_driver::StillImageSource::open(path)?));
    }

    #[cfg(feature = "opencv")]
    {
        Ok(Box::new(helio_driver::VideoCaptureSource::open(
            config.camera_index,
            config.camera_warmup(),
        )?))
    }

    #[cfg(not(feature = "opencv"))]
    {
        Err(CaptureError::NotOpen(format!(
            "no backend for video device {}: set imagePath or enable the `opencv` feature",
            config.camera_index
        )))
    }
}
