//! # Helio Tools - 共享配置与算法
//!
//! **依赖原则**: 只依赖 `helio-protocol`，避免依赖 `helio-client`
//!
//! ## 包含模块
//!
//! - `config` - 跟踪器配置（TOML）
//! - `sun` - 太阳位置计算（纯函数）
//! - `timestamp` - 时钟与日期辅助

pub mod config;
pub mod sun;
pub mod timestamp;

// 重新导出常用类型
pub use config::{ConfigError, TrackerConfig};
pub use sun::{SolarCalculator, SunPosition, SunPositionProvider, compute_sun_position};
pub use timestamp::{Clock, ManualClock, SystemClock, day_of_year};
