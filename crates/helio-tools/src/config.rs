//! # 跟踪器配置
//!
//! 串口、相机、站点位置等运行参数，支持 TOML 文件加载/保存。
//!
//! ```toml
//! serialPort = "/dev/ttyACM0"
//! baudRate = 9600
//! responseTimeoutSeconds = 120
//! useImage = true
//! downsampleWidth = 16
//! downsampleHeight = 16
//! panelStepRadians = 0.1
//! controlTimestepMinutes = 30
//! latitudeDegrees = 41.82
//! longitudeDegrees = -71.4128
//! ```
//!
//! 除 `latitudeDegrees` / `longitudeDegrees` 外，所有字段都有默认值。

use helio_protocol::{
    DEFAULT_BAUD_RATE, DEFAULT_PANEL_STEP_RAD, DEFAULT_RESPONSE_TIMEOUT_SECS, DEFAULT_SERIAL_PORT,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// 应答超时上限（1 天）
pub const MAX_RESPONSE_TIMEOUT_SECONDS: u64 = 24 * 60 * 60;

/// 控制周期上限（1 周）
pub const MAX_CONTROL_TIMESTEP_MINUTES: u64 = 7 * 24 * 60;

/// 相机预热上限
pub const MAX_CAMERA_WARMUP_MILLIS: u64 = 60_000;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// 跟踪器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerConfig {
    /// 串口路径
    #[serde(default = "default_serial_port")]
    pub serial_port: String,

    /// 波特率
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    /// 等待控制板应答的超时（秒）
    #[serde(default = "default_response_timeout_seconds")]
    pub response_timeout_seconds: u64,

    /// 是否采集相机图像
    #[serde(default = "default_true")]
    pub use_image: bool,

    /// 图像降采样宽度
    #[serde(default = "default_downsample")]
    pub downsample_width: u32,

    /// 图像降采样高度
    #[serde(default = "default_downsample")]
    pub downsample_height: u32,

    /// 单步转动角度（弧度）
    #[serde(default = "default_panel_step")]
    pub panel_step_radians: f64,

    /// 控制周期（分钟），仅供外部控制循环参考，核心不强制
    #[serde(default = "default_control_timestep")]
    pub control_timestep_minutes: u64,

    /// 站点纬度（北半球为正）
    pub latitude_degrees: f64,

    /// 站点经度（格林尼治以西为负）
    pub longitude_degrees: f64,

    /// 视频设备索引
    #[serde(default)]
    pub camera_index: i32,

    /// 相机打开后的预热时间（毫秒）
    #[serde(default = "default_camera_warmup")]
    pub camera_warmup_millis: u64,

    /// 静态图像帧源路径（设置后替代视频设备）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,
}

fn default_serial_port() -> String {
    DEFAULT_SERIAL_PORT.to_string()
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_response_timeout_seconds() -> u64 {
    DEFAULT_RESPONSE_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_downsample() -> u32 {
    16
}

fn default_panel_step() -> f64 {
    DEFAULT_PANEL_STEP_RAD
}

fn default_control_timestep() -> u64 {
    30
}

fn default_camera_warmup() -> u64 {
    200
}

impl TrackerConfig {
    /// 以站点位置创建配置，其余字段取默认值
    pub fn new(latitude_degrees: f64, longitude_degrees: f64) -> Self {
        Self {
            serial_port: default_serial_port(),
            baud_rate: default_baud_rate(),
            response_timeout_seconds: default_response_timeout_seconds(),
            use_image: true,
            downsample_width: default_downsample(),
            downsample_height: default_downsample(),
            panel_step_radians: default_panel_step(),
            control_timestep_minutes: default_control_timestep(),
            latitude_degrees,
            longitude_degrees,
            camera_index: 0,
            camera_warmup_millis: default_camera_warmup(),
            image_path: None,
        }
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从文件加载配置
    ///
    /// 配置文件路径（CLI 默认）：
    /// - Linux: `~/.config/helio/config.toml`
    /// - macOS: `~/Library/Application Support/helio/config.toml`
    /// - Windows: `%APPDATA%\helio\config.toml`
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.serial_port.trim().is_empty() {
            return Err(invalid("serialPort", "must not be empty"));
        }
        if self.baud_rate == 0 {
            return Err(invalid("baudRate", "must be greater than zero"));
        }
        if !(1..=MAX_RESPONSE_TIMEOUT_SECONDS).contains(&self.response_timeout_seconds) {
            return Err(invalid(
                "responseTimeoutSeconds",
                format!(
                    "must be within [1, {}] (got {})",
                    MAX_RESPONSE_TIMEOUT_SECONDS, self.response_timeout_seconds
                ),
            ));
        }
        if self.control_timestep_minutes > MAX_CONTROL_TIMESTEP_MINUTES {
            return Err(invalid(
                "controlTimestepMinutes",
                format!(
                    "must be at most {} (got {})",
                    MAX_CONTROL_TIMESTEP_MINUTES, self.control_timestep_minutes
                ),
            ));
        }
        if self.camera_warmup_millis > MAX_CAMERA_WARMUP_MILLIS {
            return Err(invalid(
                "cameraWarmupMillis",
                format!(
                    "must be at most {} (got {})",
                    MAX_CAMERA_WARMUP_MILLIS, self.camera_warmup_millis
                ),
            ));
        }
        if self.downsample_width == 0 || self.downsample_height == 0 {
            return Err(invalid(
                "downsampleWidth/downsampleHeight",
                format!(
                    "must be non-zero (got {}x{})",
                    self.downsample_width, self.downsample_height
                ),
            ));
        }
        if !self.panel_step_radians.is_finite() || self.panel_step_radians <= 0.0 {
            return Err(invalid(
                "panelStepRadians",
                format!("must be a positive number (got {})", self.panel_step_radians),
            ));
        }
        if !(-90.0..=90.0).contains(&self.latitude_degrees) {
            return Err(invalid(
                "latitudeDegrees",
                format!("must be within [-90, 90] (got {})", self.latitude_degrees),
            ));
        }
        if !(-180.0..=180.0).contains(&self.longitude_degrees) {
            return Err(invalid(
                "longitudeDegrees",
                format!("must be within [-180, 180] (got {})", self.longitude_degrees),
            ));
        }
        Ok(())
    }

    /// 应答超时
    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_seconds)
    }

    /// 控制周期
    pub fn control_timestep(&self) -> Duration {
        Duration::from_secs(self.control_timestep_minutes.saturating_mul(60))
    }

    /// 相机预热时间
    pub fn camera_warmup(&self) -> Duration {
        Duration::from_millis(self.camera_warmup_millis)
    }

    /// 图像特征长度（未启用图像时为 0）
    pub fn image_feature_len(&self) -> usize {
        if self.use_image {
            self.downsample_width as usize * self.downsample_height as usize
        } else {
            0
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_defaults() {
        let config = TrackerConfig::new(41.82, -71.4128);
        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.response_timeout(), Duration::from_secs(120));
        assert!(config.use_image);
        assert_eq!((config.downsample_width, config.downsample_height), (16, 16));
        assert_eq!(config.panel_step_radians, 0.1);
        assert_eq!(config.control_timestep(), Duration::from_secs(30 * 60));
        assert_eq!(config.serial_port, DEFAULT_SERIAL_PORT);
        assert_eq!(config.image_feature_len(), 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let config = TrackerConfig::from_toml_str(
            r#"
latitudeDegrees = 41.82
longitudeDegrees = -71.4128
"#,
        )
        .unwrap();
        assert_eq!(config, TrackerConfig::new(41.82, -71.4128));
    }

    #[test]
    fn test_parse_full_toml() {
        let config = TrackerConfig::from_toml_str(
            r#"
serialPort = "/dev/ttyUSB3"
baudRate = 115200
responseTimeoutSeconds = 10
useImage = false
downsampleWidth = 8
downsampleHeight = 4
panelStepRadians = 0.05
controlTimestepMinutes = 15
latitudeDegrees = -33.9
longitudeDegrees = 151.2
cameraIndex = 1
cameraWarmupMillis = 0
imagePath = "/tmp/frame.png"
"#,
        )
        .unwrap();
        assert_eq!(config.serial_port, "/dev/ttyUSB3");
        assert_eq!(config.baud_rate, 115_200);
        assert!(!config.use_image);
        assert_eq!(config.image_feature_len(), 0);
        assert_eq!(config.panel_step_radians, 0.05);
        assert_eq!(config.camera_index, 1);
        assert_eq!(config.camera_warmup(), Duration::ZERO);
        assert_eq!(config.image_path, Some(PathBuf::from("/tmp/frame.png")));
    }

    #[test]
    fn test_missing_location_rejected() {
        let err = TrackerConfig::from_toml_str("baudRate = 9600\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_errors() {
        let mut config = TrackerConfig::new(41.82, -71.4128);
        config.downsample_width = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "downsampleWidth/downsampleHeight", .. })
        ));

        let mut config = TrackerConfig::new(41.82, -71.4128);
        config.panel_step_radians = -0.1;
        assert!(config.validate().is_err());

        let mut config = TrackerConfig::new(41.82, -71.4128);
        config.panel_step_radians = f64::NAN;
        assert!(config.validate().is_err());

        assert!(TrackerConfig::new(91.0, 0.0).validate().is_err());
        assert!(TrackerConfig::new(0.0, -181.0).validate().is_err());

        let mut config = TrackerConfig::new(0.0, 0.0);
        config.response_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_upper_bounds() {
        let toml = "latitudeDegrees = 0.0\nlongitudeDegrees = 0.0\nresponseTimeoutSeconds = 9223372036854775807\n";
        assert!(matches!(
            TrackerConfig::from_toml_str(toml),
            Err(ConfigError::Invalid { field: "responseTimeoutSeconds", .. })
        ));

        let mut config = TrackerConfig::new(0.0, 0.0);
        config.response_timeout_seconds = MAX_RESPONSE_TIMEOUT_SECONDS;
        assert!(config.validate().is_ok());

        config.control_timestep_minutes = u64::MAX;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Invalid { field: "controlTimestepMinutes", .. })
        ));
        // 未校验的配置也不会溢出
        assert_eq!(config.control_timestep(), Duration::from_secs(u64::MAX));

        let mut config = TrackerConfig::new(0.0, 0.0);
        config.camera_warmup_millis = MAX_CAMERA_WARMUP_MILLIS + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = TrackerConfig::new(10.0, 20.0);
        config.use_image = false;
        config.save_to_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("latitudeDegrees"));
        assert!(content.contains("useImage = false"));

        let loaded = TrackerConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TrackerConfig::load_from_file("/nonexistent/helio/config.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
