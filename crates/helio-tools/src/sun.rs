//! # 太阳位置
//!
//! `(纬度, 经度, 时间) → (方位角, 高度角)` 的纯函数接口。
//!
//! 默认实现 [`SolarCalculator`] 使用 NOAA 低精度太阳位置公式：
//! - 精度约 ±0.5°（1900–2100 年），未做大气折射修正
//! - 方位角：从正北顺时针，范围 `[0, 360)`
//! - 高度角：地平线以上为正，范围 `[-90, 90]`
//!
//! 所有角度单位为度。

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

/// 太阳位置（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// 方位角（从正北顺时针）
    pub azimuth: f64,
    /// 高度角
    pub altitude: f64,
}

/// 太阳位置计算接口
pub trait SunPositionProvider {
    fn sun_position(&self, latitude_deg: f64, longitude_deg: f64, at: DateTime<Utc>)
    -> SunPosition;
}

impl<F> SunPositionProvider for F
where
    F: Fn(f64, f64, DateTime<Utc>) -> SunPosition,
{
    fn sun_position(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
        at: DateTime<Utc>,
    ) -> SunPosition {
        self(latitude_deg, longitude_deg, at)
    }
}

/// NOAA 太阳位置计算器
#[derive(Debug, Clone, Copy, Default)]
pub struct SolarCalculator;

impl SunPositionProvider for SolarCalculator {
    fn sun_position(
        &self,
        latitude_deg: f64,
        longitude_deg: f64,
        at: DateTime<Utc>,
    ) -> SunPosition {
        compute_sun_position(latitude_deg, longitude_deg, at)
    }
}

/// Unix 纪元的儒略日
const JULIAN_DAY_UNIX_EPOCH: f64 = 2_440_587.5;
/// J2000.0 的儒略日
const JULIAN_DAY_J2000: f64 = 2_451_545.0;

/// 计算太阳位置
pub fn compute_sun_position(latitude_deg: f64, longitude_deg: f64, at: DateTime<Utc>) -> SunPosition {
    let unix_seconds = at.timestamp() as f64 + f64::from(at.timestamp_subsec_nanos()) * 1e-9;
    let julian_day = unix_seconds / 86_400.0 + JULIAN_DAY_UNIX_EPOCH;
    let jc = (julian_day - JULIAN_DAY_J2000) / 36_525.0;

    // 太阳几何参数
    let mean_long = (280.46646 + jc * (36_000.76983 + jc * 0.0003032)).rem_euclid(360.0);
    let mean_anom = 357.52911 + jc * (35_999.05029 - 0.0001537 * jc);
    let eccentricity = 0.016708634 - jc * (0.000042037 + 0.0000001267 * jc);

    let m = mean_anom.to_radians();
    let center = m.sin() * (1.914602 - jc * (0.004817 + 0.000014 * jc))
        + (2.0 * m).sin() * (0.019993 - 0.000101 * jc)
        + (3.0 * m).sin() * 0.000289;
    let true_long = mean_long + center;
    let omega = (125.04 - 1934.136 * jc).to_radians();
    let apparent_long = true_long - 0.00569 - 0.00478 * omega.sin();

    let mean_obliquity =
        23.0 + (26.0 + (21.448 - jc * (46.815 + jc * (0.00059 - jc * 0.001813))) / 60.0) / 60.0;
    let obliquity = (mean_obliquity + 0.00256 * omega.cos()).to_radians();

    let declination = (obliquity.sin() * apparent_long.to_radians().sin()).asin();

    // 均时差（分钟）
    let y = (obliquity / 2.0).tan().powi(2);
    let l0 = mean_long.to_radians();
    let eq_time = 4.0
        * (y * (2.0 * l0).sin() - 2.0 * eccentricity * m.sin()
            + 4.0 * eccentricity * y * m.sin() * (2.0 * l0).cos()
            - 0.5 * y * y * (4.0 * l0).sin()
            - 1.25 * eccentricity * eccentricity * (2.0 * m).sin())
        .to_degrees();

    // 真太阳时与时角
    let minutes_utc = f64::from(at.hour()) * 60.0
        + f64::from(at.minute())
        + f64::from(at.second()) / 60.0
        + f64::from(at.nanosecond() % 1_000_000_000) / 60e9;
    let true_solar_time = (minutes_utc + eq_time + 4.0 * longitude_deg).rem_euclid(1440.0);
    let hour_angle_deg = true_solar_time / 4.0 - 180.0;

    let lat = latitude_deg.to_radians();
    let cos_zenith = (lat.sin() * declination.sin()
        + lat.cos() * declination.cos() * hour_angle_deg.to_radians().cos())
    .clamp(-1.0, 1.0);
    let zenith = cos_zenith.acos();
    let altitude = 90.0 - zenith.to_degrees();

    let denominator = lat.cos() * zenith.sin();
    let azimuth = if denominator.abs() < 1e-12 {
        // 极点或天顶：方位角无定义，取正南
        180.0
    } else {
        let cos_az =
            ((lat.sin() * zenith.cos() - declination.sin()) / denominator).clamp(-1.0, 1.0);
        let az = cos_az.acos().to_degrees();
        if hour_angle_deg > 0.0 {
            (az + 180.0).rem_euclid(360.0)
        } else {
            (540.0 - az).rem_euclid(360.0)
        }
    };

    SunPosition { azimuth, altitude }
}
