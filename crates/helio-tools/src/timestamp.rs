//! # 时间戳与时钟
//!
//! 状态合成时需要"当前时刻"。生产环境使用系统时钟，测试中使用可手动推进的时钟，
//! 使太阳位置计算可复现。

use chrono::{DateTime, Datelike, Duration, Utc};
use std::sync::{Arc, Mutex, PoisonError};

/// 时钟接口
pub trait Clock {
    /// 当前 UTC 时刻
    fn now(&self) -> DateTime<Utc>;
}

impl<T: Clock + ?Sized> Clock for Box<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

/// 系统时钟
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// 手动时钟
///
/// 克隆体共享同一时刻，测试中可以在交给跟踪器之后继续推进。
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    /// 设置当前时刻
    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// 向前推进
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// 年内第几天（1 月 1 日为 1）
pub fn day_of_year(at: DateTime<Utc>) -> u32 {
    at.ordinal()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_system_clock_is_monotonic_enough() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_shared_between_clones() {
        let start = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let clock = ManualClock::new(start);
        let handle = clock.clone();

        handle.advance(Duration::minutes(30));
        assert_eq!(clock.now(), start + Duration::minutes(30));

        let later = Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap();
        handle.set(later);
        assert_eq!(clock.now(), later);
    }

    #[test]
    fn test_boxed_clock() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let clock: Box<dyn Clock + Send> = Box::new(ManualClock::new(start));
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn test_day_of_year() {
        assert_eq!(
            day_of_year(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            1
        );
        // 闰年
        assert_eq!(
            day_of_year(Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap()),
            366
        );
        assert_eq!(
            day_of_year(Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap()),
            60
        );
    }
}
