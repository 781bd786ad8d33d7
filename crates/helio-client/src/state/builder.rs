//! 状态合成
//!
//! 由面板角度、可选图像特征和时间戳合成 [`WorldState`]，不做任何 I/O。

use super::world::{PanelPose, SunObservation, WorldState};
use chrono::{DateTime, Utc};
use helio_driver::ImageFeatures;
use helio_tools::{SolarCalculator, SunPositionProvider};

/// 类型擦除后的太阳位置计算器
pub type BoxedSunProvider = Box<dyn SunPositionProvider + Send>;

/// 世界状态合成器（站点位置在构造时固定）
pub struct StateBuilder {
    latitude: f64,
    longitude: f64,
    provider: BoxedSunProvider,
}

impl StateBuilder {
    pub fn new(latitude: f64, longitude: f64, provider: BoxedSunProvider) -> Self {
        Self {
            latitude,
            longitude,
            provider,
        }
    }

    /// 使用默认的 NOAA 计算器
    pub fn with_solar_calculator(latitude: f64, longitude: f64) -> Self {
        Self::new(latitude, longitude, Box::new(SolarCalculator))
    }

    /// 合成世界状态
    ///
    /// 太阳位置按 `(latitude, longitude, timestamp)` 计算；
    /// 相同输入（含时间戳）得到相同结果。
    pub fn build(
        &self,
        panel: PanelPose,
        image: Option<ImageFeatures>,
        timestamp: DateTime<Utc>,
    ) -> WorldState {
        let position = self
            .provider
            .sun_position(self.latitude, self.longitude, timestamp);
        WorldState::new(
            panel,
            SunObservation { position, image },
            timestamp,
            self.latitude,
            self.longitude,
        )
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Debug for StateBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateBuilder")
            .field("latitude", &self.latitude)
            .field("longitude", &self.longitude)
            .finish_non_exhaustive()
    }
}
