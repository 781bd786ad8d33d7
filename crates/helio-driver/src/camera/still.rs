//! 静态图像帧源
//!
//! 每次采集重新读取同一路径上的图像文件。适用于由外部进程
//! （如 `fswebcam`、`ffmpeg` 定时快照）维护相机画面的部署方式。

use super::FrameSource;
use crate::error::CaptureError;
use image::DynamicImage;
use std::path::{Path, PathBuf};

/// 图像文件帧源
#[derive(Debug, Clone)]
pub struct StillImageSource {
    path: PathBuf,
}

impl StillImageSource {
    /// 创建帧源，路径必须存在
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CaptureError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Err(CaptureError::NotOpen(format!(
                "image source {} does not exist",
                path.display()
            )));
        }
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl FrameSource for StillImageSource {
    fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        if !self.path.exists() {
            return Err(CaptureError::NoFrame(format!(
                "{} disappeared",
                self.path.display()
            )));
        }
        Ok(image::open(&self.path)?)
    }

    fn describe(&self) -> String {
        format!("file:{}", self.path.display())
    }
}
