//! 测试辅助：模拟控制板 + 合成帧源

#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use helio_client::{ControlStep, TrackerBuilder};
use helio_driver::{CaptureError, FrameSource};
use helio_serial::MockChannel;
use helio_tools::{ManualClock, TrackerConfig};
use image::{DynamicImage, GrayImage, Luma};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub const LATITUDE: f64 = 41.82;
pub const LONGITUDE: f64 = -71.4128;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 21, 14, 0, 0).unwrap()
}

pub fn config(use_image: bool) -> TrackerConfig {
    let mut config = TrackerConfig::new(LATITUDE, LONGITUDE);
    config.use_image = use_image;
    config
}

/// 可控的合成帧源：渐变图像，可随时让其失效
#[derive(Clone, Default)]
pub struct SyntheticCamera {
    frames: Arc<AtomicU32>,
    broken: Arc<AtomicBool>,
}

impl SyntheticCamera {
    pub fn frames_read(&self) -> u32 {
        self.frames.load(Ordering::SeqCst)
    }

    pub fn unplug(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl FrameSource for SyntheticCamera {
    fn read_frame(&mut self) -> Result<DynamicImage, CaptureError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(CaptureError::NoFrame("camera unplugged".to_string()));
        }
        self.frames.fetch_add(1, Ordering::SeqCst);
        Ok(DynamicImage::ImageLuma8(GrayImage::from_fn(640, 480, |x, _| {
            Luma([(x % 256) as u8])
        })))
    }

    fn describe(&self) -> String {
        "synthetic camera".to_string()
    }
}

pub struct Rig {
    pub tracker: ControlStep<MockChannel, SyntheticCamera>,
    pub device: MockChannel,
    pub camera: SyntheticCamera,
    pub clock: ManualClock,
}

/// 握手应答 `RECV,<initial>`，之后依次应答 `replies`
pub fn rig(use_image: bool, initial: f64, replies: &[&str]) -> Rig {
    let device = MockChannel::with_lines([format!("RECV,{}", initial)]);
    for reply in replies {
        device.push_line(*reply);
    }
    let camera = SyntheticCamera::default();
    let clock = ManualClock::new(start_time());

    let tracker = TrackerBuilder::new(config(use_image))
        .clock(clock.clone())
        .build_with(device.clone(), Some(camera.clone()))
        .expect("tracker should open");

    Rig {
        tracker,
        device,
        camera,
        clock,
    }
}
