//! OpenCV 视频设备帧源
//!
//! 打开默认视频设备（索引 0），等待短暂预热后即可采集。
//! 设备句柄在 `Drop` 时由 OpenCV 释放。

use super::FrameSource;
use crate::error::CaptureError;
use image::{DynamicImage, GrayImage, RgbImage, RgbaImage};
use opencv::core::Mat;
use opencv::prelude::*;
use opencv::videoio::{self, VideoCapture};
use std::time::Duration;
use tracing::info;

/// 视频设备帧源
pub struct VideoCaptureSource {
    capture: VideoCapture,
    index: i32,
}

impl VideoCaptureSource {
    /// 打开视频设备
    ///
    /// `warmup` 为打开后的等待时间，部分 USB 摄像头首帧曝光不稳定。
    pub fn open(index: i32, warmup: Duration) -> Result<Self, CaptureError> {
        let capture = VideoCapture::new(index, videoio::CAP_ANY).map_err(backend)?;
        if !capture.is_opened().map_err(backend)? {
            return Err(CaptureError::NotOpen(format!("video device {}", index)));
        }
        info!("Opened video device {}", index);

        if !warmup.is_zero() {
            std::thread::sleep(warmup);
        }

        Ok(Self { capture, index })
    }
}

impl FrameSource for VideoCaptureSource {
    fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        if !self.capture.is_opened().map_err(backend)? {
            return Err(CaptureError::NotOpen(format!("video device {}", self.index)));
        }

        let mut frame = Mat::default();
        let grabbed = self.capture.read(&mut frame).map_err(backend)?;
        if !grabbed || frame.empty() {
            return Err(CaptureError::NoFrame(format!(
                "video device {} returned no frame",
                self.index
            )));
        }

        mat_to_image(&frame)
    }

    fn describe(&self) -> String {
        format!("video{}", self.index)
    }
}

/// OpenCV `Mat`（8 位，BGR / BGRA / GRAY）→ `DynamicImage`
fn mat_to_image(frame: &Mat) -> Result<DynamicImage, CaptureError> {
    let owned;
    let frame = if frame.is_continuous() {
        frame
    } else {
        owned = frame.try_clone().map_err(backend)?;
        &owned
    };

    let width = frame.cols() as u32;
    let height = frame.rows() as u32;
    let data = frame.data_bytes().map_err(backend)?;

    let image = match frame.channels() {
        1 => GrayImage::from_raw(width, height, data.to_vec()).map(DynamicImage::ImageLuma8),
        3 => {
            let rgb = data
                .chunks_exact(3)
                .flat_map(|bgr| [bgr[2], bgr[1], bgr[0]])
                .collect();
            RgbImage::from_raw(width, height, rgb).map(DynamicImage::ImageRgb8)
        },
        4 => {
            let rgba = data
                .chunks_exact(4)
                .flat_map(|bgra| [bgra[2], bgra[1], bgra[0], bgra[3]])
                .collect();
            RgbaImage::from_raw(width, height, rgba).map(DynamicImage::ImageRgba8)
        },
        channels => {
            return Err(CaptureError::Backend(format!(
                "unsupported channel count {}",
                channels
            )));
        },
    };

    image.ok_or_else(|| CaptureError::Backend("frame buffer size mismatch".to_string()))
}

fn backend(err: opencv::Error) -> CaptureError {
    CaptureError::Backend(err.to_string())
}
