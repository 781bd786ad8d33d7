//! 相机图像管线
//!
//! 从相机源读取一帧 → 转单通道灰度 → 最近邻缩放到目标尺寸 → 按行展平。
//! 输出长度恒为 `width * height`，与源分辨率无关。
//!
//! ## 帧源
//!
//! - [`StillImageSource`]: 每次采集读取一个图像文件（例如外部摄像头守护进程维护的快照）
//! - `VideoCaptureSource`: 默认视频设备（feature `opencv`）
//! - 自定义：实现 [`FrameSource`] trait

use crate::error::CaptureError;
use image::DynamicImage;
use image::imageops::{self, FilterType};
use tracing::debug;

mod still;
#[cfg(feature = "opencv")]
mod video;

pub use still::StillImageSource;
#[cfg(feature = "opencv")]
pub use video::VideoCaptureSource;

/// 默认降采样尺寸（16×16）
pub const DEFAULT_DOWNSAMPLE: (u32, u32) = (16, 16);

/// 相机帧源
pub trait FrameSource {
    /// 读取一帧
    fn read_frame(&mut self) -> Result<DynamicImage, CaptureError>;

    /// 帧源描述（用于日志）
    fn describe(&self) -> String {
        String::from("camera")
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        (**self).read_frame()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// 类型擦除后的帧源
pub type BoxedFrameSource = Box<dyn FrameSource + Send>;

/// 图像特征：定长、按行展平的灰度强度序列
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageFeatures {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl ImageFeatures {
    /// 由像素序列构造，长度必须等于 `width * height`
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, CaptureError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(CaptureError::LengthMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// 像素强度（按行展平）
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

/// 把一帧图像降采样为定长灰度特征
pub fn downsample(
    frame: &DynamicImage,
    width: u32,
    height: u32,
) -> Result<ImageFeatures, CaptureError> {
    if width == 0 || height == 0 {
        return Err(CaptureError::InvalidTarget { width, height });
    }
    if frame.width() == 0 || frame.height() == 0 {
        return Err(CaptureError::NoFrame("frame has zero size".to_string()));
    }

    let gray = frame.to_luma8();
    let resized = imageops::resize(&gray, width, height, FilterType::Nearest);
    ImageFeatures::new(width, height, resized.into_raw())
}

/// 图像管线：独占一个帧源，按配置尺寸输出特征
pub struct ImagePipeline<S: FrameSource = BoxedFrameSource> {
    source: S,
    width: u32,
    height: u32,
}

impl<S: FrameSource> ImagePipeline<S> {
    /// 创建管线，目标尺寸必须非零
    pub fn new(source: S, width: u32, height: u32) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 {
            return Err(CaptureError::InvalidTarget { width, height });
        }
        Ok(Self {
            source,
            width,
            height,
        })
    }

    /// 以配置尺寸采集一帧
    pub fn capture(&mut self) -> Result<ImageFeatures, CaptureError> {
        self.capture_at(self.width, self.height)
    }

    /// 以指定尺寸采集一帧
    pub fn capture_at(&mut self, width: u32, height: u32) -> Result<ImageFeatures, CaptureError> {
        let frame = self.source.read_frame()?;
        debug!(
            "Captured {}x{} frame from {}, downsampling to {}x{}",
            frame.width(),
            frame.height(),
            self.source.describe(),
            width,
            height
        );
        downsample(&frame, width, height)
    }

    /// 目标尺寸
    pub fn target_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// 帧源描述
    pub fn describe(&self) -> String {
        self.source.describe()
    }
}

impl<S: FrameSource> std::fmt::Debug for ImagePipeline<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePipeline")
            .field("source", &self.source.describe())
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgb, RgbImage};
    use proptest::prelude::*;

    /// 返回固定图像的帧源
    struct FixedSource(DynamicImage);

    impl FrameSource for FixedSource {
        fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
            Ok(self.0.clone())
        }
    }

    /// 永远没有帧的帧源
    struct EmptySource;

    impl FrameSource for EmptySource {
        fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
            Err(CaptureError::NoFrame("no frame".to_string()))
        }
    }

    #[test]
    fn test_capture_default_size() {
        let frame = DynamicImage::ImageRgb8(RgbImage::from_pixel(640, 480, Rgb([200, 200, 200])));
        let mut pipeline = ImagePipeline::new(FixedSource(frame), 16, 16).unwrap();
        let features = pipeline.capture().unwrap();
        assert_eq!(features.len(), 256);
        assert_eq!((features.width(), features.height()), (16, 16));
        // 灰色 RGB → 灰度后强度不变
        assert!(features.pixels().iter().all(|&p| p == 200));
    }

    #[test]
    fn test_capture_row_major_order() {
        // 左半黑、右半白
        let frame = GrayImage::from_fn(4, 2, |x, _| if x < 2 { Luma([0]) } else { Luma([255]) });
        let features = downsample(&DynamicImage::ImageLuma8(frame), 4, 2).unwrap();
        assert_eq!(features.pixels(), &[0, 0, 255, 255, 0, 0, 255, 255]);
    }

    #[test]
    fn test_capture_propagates_source_error() {
        let mut pipeline = ImagePipeline::new(EmptySource, 16, 16).unwrap();
        assert!(matches!(pipeline.capture(), Err(CaptureError::NoFrame(_))));
    }

    #[test]
    fn test_invalid_target_rejected() {
        let frame = DynamicImage::ImageLuma8(GrayImage::new(8, 8));
        assert!(matches!(
            ImagePipeline::new(FixedSource(frame.clone()), 0, 16),
            Err(CaptureError::InvalidTarget { .. })
        ));
        assert!(matches!(
            downsample(&frame, 16, 0),
            Err(CaptureError::InvalidTarget { .. })
        ));
    }

    #[test]
    fn test_zero_sized_frame_is_no_frame() {
        let frame = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        assert!(matches!(
            downsample(&frame, 16, 16),
            Err(CaptureError::NoFrame(_))
        ));
    }

    #[test]
    fn test_features_length_checked() {
        assert!(ImageFeatures::new(2, 2, vec![0; 4]).is_ok());
        assert!(matches!(
            ImageFeatures::new(2, 2, vec![0; 3]),
            Err(CaptureError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    proptest! {
        #[test]
        fn prop_output_length_independent_of_source(
            src_w in 1u32..200,
            src_h in 1u32..200,
            dst_w in 1u32..32,
            dst_h in 1u32..32,
        ) {
            let frame = DynamicImage::ImageRgb8(RgbImage::new(src_w, src_h));
            let mut pipeline = ImagePipeline::new(FixedSource(frame), dst_w, dst_h).unwrap();
            let features = pipeline.capture().unwrap();
            prop_assert_eq!(features.len(), (dst_w * dst_h) as usize);
        }
    }
}
